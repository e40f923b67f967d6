//! CDN integration for pushing site assets
//!
//! Handles signed uploads of local image and video files to Cloudinary,
//! keyed by the public ids the delivery URLs later reference.

pub mod client;
pub mod mime;
pub mod mock;

pub use client::CloudinaryClient;
pub use mock::MockCdnClient;

use crate::models::AssetKind;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Per-upload parameters. Built fresh for every item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadParams {
    pub resource_type: AssetKind,
    pub public_id: String,
    pub overwrite: bool,
    pub invalidate: bool,
    pub quality: String,
    pub fetch_format: String,
}

impl UploadParams {
    /// Upload policy shared by images and videos: overwrite in place, purge
    /// edge caches, and let the CDN pick quality and format.
    pub fn for_asset(kind: AssetKind, public_id: &str) -> Self {
        Self {
            resource_type: kind,
            public_id: public_id.to_string(),
            overwrite: true,
            invalidate: true,
            quality: "auto:good".to_string(),
            fetch_format: "auto".to_string(),
        }
    }

    /// Incoming transformation string, directives sorted.
    pub fn transformation(&self) -> String {
        let mut directives = vec![
            format!("f_{}", self.fetch_format),
            format!("q_{}", self.quality),
        ];
        directives.sort();
        directives.join(",")
    }

    /// Fields covered by the request signature, keyed in sorted order.
    pub fn signed_fields(&self, timestamp: i64) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("invalidate", self.invalidate.to_string()),
            ("overwrite", self.overwrite.to_string()),
            ("public_id", self.public_id.clone()),
            ("timestamp", timestamp.to_string()),
            ("transformation", self.transformation()),
        ])
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub secure_url: String,
    pub bytes: u64,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

#[async_trait]
pub trait CdnService: Send + Sync {
    async fn upload(&self, path: &Path, params: &UploadParams) -> Result<UploadResponse>;
}
