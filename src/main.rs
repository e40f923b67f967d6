use anyhow::Result;
use clap::Parser;
use lumen_assets::app::App;
use lumen_assets::models::Config;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "lumen-assets")]
#[command(about = "Upload the site's images and videos to Cloudinary")]
struct CliArgs {
    /// Directory holding the local asset files (overrides ASSET_DIR).
    #[arg(long, value_name = "DIR")]
    asset_dir: Option<PathBuf>,

    /// Asset manifest JSON (overrides ASSET_MANIFEST).
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Walk the manifest without contacting Cloudinary.
    #[arg(long)]
    dry_run: bool,
}

impl CliArgs {
    fn apply(self, config: &mut Config) {
        if let Some(asset_dir) = self.asset_dir {
            config.asset_dir = asset_dir;
        }
        if let Some(manifest) = self.manifest {
            config.manifest_path = manifest;
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }
}

fn load_config(args: CliArgs) -> lumen_assets::Result<Config> {
    // --dry-run relaxes the credential check, so it has to reach the loader.
    let mut config = if args.dry_run {
        dotenvy::dotenv().ok();
        Config::from_lookup(|key| match key {
            "DRY_RUN" => Some("true".to_string()),
            _ => std::env::var(key).ok(),
        })?
    } else {
        Config::from_env()?
    };
    args.apply(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumen_assets=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting lumen-assets upload");

    let args = CliArgs::parse();

    let app = match load_config(args).and_then(|config| App::new(&config)) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match app.run().await {
        Ok(report) => {
            println!("{}", report.render_summary());
            info!("Upload run finished");
            Ok(())
        }
        Err(e) => {
            error!("Upload run failed: {}", e);
            std::process::exit(1);
        }
    }
}
