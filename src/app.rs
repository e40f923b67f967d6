//! Application orchestration for pushing the site's assets to the CDN.

use crate::cdn::{CdnService, CloudinaryClient, MockCdnClient, UploadParams};
use crate::manifest::{AssetEntry, AssetManifest};
use crate::models::{AssetKind, Config, SkipReason, Throttle, UploadOutcome};
use crate::report::{ItemReport, SyncReport};
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Walks the asset manifest and uploads every locally present file, one at a
/// time.
pub struct App {
    cdn: Box<dyn CdnService>,
    manifest: AssetManifest,
    asset_dir: PathBuf,
    throttle: Throttle,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub cdn: Box<dyn CdnService>,
    pub manifest: AssetManifest,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices, asset_dir: PathBuf, throttle: Throttle) -> Self {
        Self {
            cdn: services.cdn,
            manifest: services.manifest,
            asset_dir,
            throttle,
        }
    }

    /// Construct an app from a loaded [`Config`].
    pub fn new(config: &Config) -> Result<Self> {
        let manifest = AssetManifest::from_file(&config.manifest_path)?;
        info!(
            "Loaded {} manifest entries from {}",
            manifest.len(),
            config.manifest_path.display()
        );

        let cdn: Box<dyn CdnService> = if config.dry_run {
            info!("DRY_RUN enabled, nothing will be sent to Cloudinary");
            Box::new(MockCdnClient::new().with_base_url(format!(
                "{}/{}",
                config.delivery_host, config.cloud_name
            )))
        } else {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| Error::Config("CLOUDINARY_API_KEY not set".to_string()))?;
            let api_secret = config
                .api_secret
                .clone()
                .ok_or_else(|| Error::Config("CLOUDINARY_API_SECRET not set".to_string()))?;
            Box::new(
                CloudinaryClient::new(config.cloud_name.clone(), api_key, api_secret)?
                    .with_base_url(config.api_base_url.clone()),
            )
        };

        Ok(Self::with_services(
            AppServices { cdn, manifest },
            config.asset_dir.clone(),
            config.throttle,
        ))
    }

    /// Upload images first, then videos, recording one outcome per entry.
    ///
    /// Per-item failures, including a failed existence check, end up in the
    /// report.
    pub async fn run(&self) -> Result<SyncReport> {
        info!("Reading assets from {}", self.asset_dir.display());

        let (images, videos) = self.manifest.partition();
        let mut report = SyncReport::new();

        info!("Uploading {} images...", images.len());
        self.process_group(&images, AssetKind::Image, &mut report).await;

        info!("Uploading {} videos (these take longer)...", videos.len());
        self.process_group(&videos, AssetKind::Video, &mut report).await;

        info!(
            "Sync complete: {} succeeded, {} failed, {} skipped",
            report.succeeded.len(),
            report.failed.len(),
            report.skipped.len()
        );

        debug_assert_eq!(report.total(), self.manifest.len());

        Ok(report)
    }

    async fn process_group(
        &self,
        entries: &[&AssetEntry],
        kind: AssetKind,
        report: &mut SyncReport,
    ) {
        let delay = self.throttle.delay_for(kind);

        for entry in entries {
            let outcome = self.process_entry(entry, kind).await;
            report.record(ItemReport {
                file: entry.file.clone(),
                public_id: entry.public_id.clone(),
                kind,
                outcome,
            });

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    async fn process_entry(&self, entry: &AssetEntry, kind: AssetKind) -> UploadOutcome {
        let path = self.asset_dir.join(&entry.file);

        match tokio::fs::try_exists(&path).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Skipping {} - file not found", entry.file);
                return UploadOutcome::Skipped {
                    reason: SkipReason::FileNotFound,
                };
            }
            Err(e) => {
                error!("Failed to check {}: {}", path.display(), e);
                return UploadOutcome::Failure {
                    message: e.to_string(),
                };
            }
        }

        let params = UploadParams::for_asset(kind, &entry.public_id);
        info!("Uploading {} → {}...", entry.file, entry.public_id);

        match self.cdn.upload(&path, &params).await {
            Ok(response) => {
                info!(
                    "Uploaded {} ({:.2} KB) → {}",
                    entry.file,
                    response.bytes as f64 / 1024.0,
                    response.secure_url
                );
                UploadOutcome::Success {
                    secure_url: response.secure_url,
                    bytes: response.bytes,
                }
            }
            Err(e) => {
                error!("Failed to upload {}: {}", entry.file, e);
                UploadOutcome::Failure {
                    message: e.to_string(),
                }
            }
        }
    }
}
