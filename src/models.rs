//! Data models and structures
//!
//! Defines asset kinds, upload outcomes and the environment-driven
//! configuration shared by the binaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

impl AssetKind {
    /// Classify a local file by its extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(AssetKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(AssetKind::Video)
        } else {
            None
        }
    }

    /// Path segment used by the CDN for this kind.
    pub fn resource_type(self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_type())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    FileNotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FileNotFound => f.write_str("file_not_found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { secure_url: String, bytes: u64 },
    Failure { message: String },
    Skipped { reason: SkipReason },
}

/// Fixed pause after each item, per asset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    pub image_delay: Duration,
    pub video_delay: Duration,
}

impl Throttle {
    pub fn none() -> Self {
        Self {
            image_delay: Duration::ZERO,
            video_delay: Duration::ZERO,
        }
    }

    pub fn delay_for(&self, kind: AssetKind) -> Duration {
        match kind {
            AssetKind::Image => self.image_delay,
            AssetKind::Video => self.video_delay,
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            image_delay: Duration::from_millis(500),
            video_delay: Duration::from_millis(1000),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub cloud_name: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base_url: String,
    pub delivery_host: String,
    pub asset_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub throttle: Throttle,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dry_run = lookup("DRY_RUN")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let cloud_name = lookup("CLOUDINARY_CLOUD_NAME")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| crate::Error::Config("CLOUDINARY_CLOUD_NAME not set".to_string()))?;

        let api_key = lookup("CLOUDINARY_API_KEY").filter(|v| !v.is_empty());
        let api_secret = lookup("CLOUDINARY_API_SECRET").filter(|v| !v.is_empty());
        if !dry_run {
            if api_key.is_none() {
                return Err(crate::Error::Config(
                    "CLOUDINARY_API_KEY not set".to_string(),
                ));
            }
            if api_secret.is_none() {
                return Err(crate::Error::Config(
                    "CLOUDINARY_API_SECRET not set".to_string(),
                ));
            }
        }

        Ok(Self {
            cloud_name,
            api_key,
            api_secret,
            api_base_url: lookup("CLOUDINARY_API_BASE")
                .unwrap_or_else(|| "https://api.cloudinary.com".to_string()),
            delivery_host: lookup("CLOUDINARY_DELIVERY_HOST")
                .unwrap_or_else(|| crate::delivery::DEFAULT_DELIVERY_HOST.to_string()),
            asset_dir: PathBuf::from(lookup("ASSET_DIR").unwrap_or_else(|| "public".to_string())),
            manifest_path: PathBuf::from(
                lookup("ASSET_MANIFEST").unwrap_or_else(|| "data/assets.json".to_string()),
            ),
            throttle: Throttle {
                image_delay: parse_millis(&lookup, "IMAGE_UPLOAD_DELAY_MS", 500)?,
                video_delay: parse_millis(&lookup, "VIDEO_UPLOAD_DELAY_MS", 1000)?,
            },
            dry_run,
        })
    }
}

fn parse_millis<F>(lookup: &F, key: &str, default: u64) -> crate::Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| crate::Error::Config(format!("{} must be milliseconds, got '{}'", key, raw))),
        None => Ok(Duration::from_millis(default)),
    }
}
