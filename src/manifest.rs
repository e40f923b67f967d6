//! Static asset manifest
//!
//! The mapping from local file names to CDN public ids lives in a
//! version-controlled JSON file (`data/assets.json`) rather than in code, so
//! it can be validated on its own before anything is uploaded.

use crate::models::AssetKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetEntry {
    pub file: String,
    pub public_id: String,
}

impl AssetEntry {
    pub fn new(file: impl Into<String>, public_id: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            public_id: public_id.into(),
        }
    }

    pub fn kind(&self) -> Option<AssetKind> {
        AssetKind::from_path(&self.file)
    }
}

/// Validated manifest. Deserializing goes through [`AssetManifest::validate`],
/// so an invalid file never produces a value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawManifest")]
pub struct AssetManifest {
    assets: Vec<AssetEntry>,
}

#[derive(Deserialize)]
struct RawManifest {
    assets: Vec<AssetEntry>,
}

impl TryFrom<RawManifest> for AssetManifest {
    type Error = Error;

    fn try_from(raw: RawManifest) -> Result<Self> {
        Self::new(raw.assets)
    }
}

impl AssetManifest {
    /// Build a manifest from entries, validating it.
    pub fn new(assets: Vec<AssetEntry>) -> Result<Self> {
        let manifest = Self { assets };
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            Error::Manifest(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Reject empty names, duplicate public ids and unsupported extensions.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for entry in &self.assets {
            if entry.file.trim().is_empty() {
                return Err(Error::Manifest("Entry with empty file name".to_string()));
            }
            if entry.public_id.trim().is_empty() {
                return Err(Error::Manifest(format!(
                    "Entry '{}' has an empty public id",
                    entry.file
                )));
            }
            if entry.kind().is_none() {
                return Err(Error::Manifest(format!(
                    "Entry '{}' has an unsupported extension",
                    entry.file
                )));
            }
            if !seen.insert(entry.public_id.as_str()) {
                return Err(Error::Manifest(format!(
                    "Duplicate public id '{}' (file '{}')",
                    entry.public_id, entry.file
                )));
            }
        }

        Ok(())
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn images(&self) -> Vec<&AssetEntry> {
        self.of_kind(AssetKind::Image)
    }

    pub fn videos(&self) -> Vec<&AssetEntry> {
        self.of_kind(AssetKind::Video)
    }

    /// Images then videos, each in declaration order.
    pub fn partition(&self) -> (Vec<&AssetEntry>, Vec<&AssetEntry>) {
        (self.images(), self.videos())
    }

    fn of_kind(&self, kind: AssetKind) -> Vec<&AssetEntry> {
        self.assets
            .iter()
            .filter(|entry| entry.kind() == Some(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_keeps_declaration_order() {
        let manifest = AssetManifest::new(vec![
            AssetEntry::new("video2.mp4", "video2"),
            AssetEntry::new("logo.png", "logo"),
            AssetEntry::new("video1.mp4", "video1"),
            AssetEntry::new("banner.jpg", "banner"),
        ])
        .unwrap();

        let (images, videos) = manifest.partition();
        let image_ids: Vec<&str> = images.iter().map(|e| e.public_id.as_str()).collect();
        let video_ids: Vec<&str> = videos.iter().map(|e| e.public_id.as_str()).collect();

        assert_eq!(image_ids, vec!["logo", "banner"]);
        assert_eq!(video_ids, vec!["video2", "video1"]);
    }

    #[test]
    fn test_duplicate_public_id_rejected() {
        let err = AssetManifest::new(vec![
            AssetEntry::new("product1.webp", "product1"),
            AssetEntry::new("product1.png", "product1"),
        ])
        .unwrap_err();

        assert!(matches!(err, Error::Manifest(_)));
        assert!(err.to_string().contains("product1"));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = AssetManifest::new(vec![AssetEntry::new("readme.txt", "readme")]).unwrap_err();
        assert!(err.to_string().contains("unsupported extension"));
    }

    #[test]
    fn test_empty_public_id_rejected() {
        let err = AssetManifest::new(vec![AssetEntry::new("logo.png", " ")]).unwrap_err();
        assert!(err.to_string().contains("empty public id"));
    }

    #[test]
    fn test_from_json() {
        let manifest = AssetManifest::from_json(
            r#"{"assets": [{"file": "logo.png", "public_id": "logo"}]}"#,
        )
        .unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.entries()[0], AssetEntry::new("logo.png", "logo"));
    }

    #[test]
    fn test_deserialize_validates_entries() {
        let unsupported = serde_json::from_str::<AssetManifest>(
            r#"{"assets": [{"file": "logo.png", "public_id": "logo"}, {"file": "notes.txt", "public_id": "notes"}]}"#,
        )
        .unwrap_err();
        assert!(unsupported.to_string().contains("unsupported extension"));

        let duplicate = serde_json::from_str::<AssetManifest>(
            r#"{"assets": [{"file": "logo.png", "public_id": "logo"}, {"file": "logo.webp", "public_id": "logo"}]}"#,
        )
        .unwrap_err();
        assert!(duplicate.to_string().contains("Duplicate public id 'logo'"));

        let err = AssetManifest::from_json(
            r#"{"assets": [{"file": "logo.png", "public_id": "logo"}, {"file": "notes.txt", "public_id": "logo"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = AssetManifest::from_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }

    #[test]
    fn test_shipped_manifest_is_valid() {
        let manifest = AssetManifest::from_file(Path::new("data/assets.json")).unwrap();

        assert_eq!(manifest.len(), 32);
        assert_eq!(manifest.images().len(), 23);
        assert_eq!(manifest.videos().len(), 9);
        assert_eq!(manifest.images()[0].public_id, "heroimg");
        assert_eq!(manifest.videos()[0].public_id, "showvideo1");
    }
}
