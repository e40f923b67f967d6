//! Print the delivery URL for a public id.
//!
//! Handy for checking what a page will request without opening the site:
//!
//! ```text
//! asset-url image product1 --width 800
//! asset-url video showvideo1 --set du=10
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use lumen_assets::delivery::{DeliveryUrlBuilder, TransformOptions, DEFAULT_DELIVERY_HOST};
use lumen_assets::models::AssetKind;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Image,
    Video,
}

impl From<Kind> for AssetKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Image => AssetKind::Image,
            Kind::Video => AssetKind::Video,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "asset-url")]
#[command(about = "Build a Cloudinary delivery URL")]
struct CliArgs {
    #[arg(value_enum)]
    kind: Kind,

    public_id: String,

    #[arg(long)]
    quality: Option<String>,

    #[arg(long)]
    format: Option<String>,

    #[arg(long)]
    width: Option<String>,

    #[arg(long)]
    crop: Option<String>,

    /// Extra directive as key=value; repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_pair)]
    extras: Vec<(String, String)>,

    /// Cloud name (defaults to CLOUDINARY_CLOUD_NAME).
    #[arg(long)]
    cloud: Option<String>,

    /// Delivery host (defaults to CLOUDINARY_DELIVERY_HOST, then Cloudinary's).
    #[arg(long)]
    host: Option<String>,
}

fn resolve_host(flag: Option<&str>, env: Option<String>) -> String {
    flag.map(str::to_string)
        .or(env.filter(|host| !host.is_empty()))
        .unwrap_or_else(|| DEFAULT_DELIVERY_HOST.to_string())
}

fn parse_pair(input: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("Invalid directive '{}'. Expected KEY=VALUE", input))?;
    if key.is_empty() {
        return Err(format!("Invalid directive '{}'. Key is empty", input));
    }
    Ok((key.to_string(), value.to_string()))
}

fn build_options(args: &CliArgs) -> TransformOptions {
    let mut options = TransformOptions::new();
    let recognized = [
        ("quality", &args.quality),
        ("format", &args.format),
        ("width", &args.width),
        ("crop", &args.crop),
    ];
    for (key, value) in recognized {
        if let Some(value) = value {
            options.insert(key, value);
        }
    }
    for (key, value) in &args.extras {
        options.insert(key.clone(), value);
    }
    options
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    let cloud = match &args.cloud {
        Some(cloud) => cloud.clone(),
        None => std::env::var("CLOUDINARY_CLOUD_NAME")
            .context("CLOUDINARY_CLOUD_NAME not set and --cloud not given")?,
    };
    if cloud.is_empty() {
        return Err(anyhow!("Cloud name is empty"));
    }

    let host = resolve_host(
        args.host.as_deref(),
        std::env::var("CLOUDINARY_DELIVERY_HOST").ok(),
    );
    let builder = DeliveryUrlBuilder::with_host(&host, &cloud);
    println!(
        "{}",
        builder.url(args.kind.into(), &args.public_id, &build_options(&args))
    );
    Ok(())
}
