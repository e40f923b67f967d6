use super::{CdnService, UploadParams, UploadResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockCdnClient {
    base_url: String,
    uploads: Arc<Mutex<Vec<UploadParams>>>,
    failing_ids: Arc<Mutex<HashSet<String>>>,
}

impl MockCdnClient {
    pub fn new() -> Self {
        Self {
            base_url: "https://mock-cdn.example.com".to_string(),
            uploads: Arc::new(Mutex::new(Vec::new())),
            failing_ids: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Make every upload for `public_id` fail.
    pub fn with_failure(self, public_id: &str) -> Self {
        self.failing_ids
            .lock()
            .unwrap()
            .insert(public_id.to_string());
        self
    }

    pub fn get_upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// Every upload attempt, in call order.
    pub fn get_uploads(&self) -> Vec<UploadParams> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Default for MockCdnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdnService for MockCdnClient {
    async fn upload(&self, path: &Path, params: &UploadParams) -> Result<UploadResponse> {
        self.uploads.lock().unwrap().push(params.clone());

        if self.failing_ids.lock().unwrap().contains(&params.public_id) {
            return Err(Error::Cdn(format!(
                "Mock upload failure for {}",
                params.public_id
            )));
        }

        let bytes = tokio::fs::metadata(path).await?.len();

        Ok(UploadResponse {
            secure_url: format!(
                "{}/{}/upload/{}",
                self.base_url,
                params.resource_type.resource_type(),
                params.public_id
            ),
            bytes,
            public_id: Some(params.public_id.clone()),
            format: None,
            resource_type: Some(params.resource_type.resource_type().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetKind;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_mock_cdn_upload_records_params() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("logo.png");
        fs::write(&file, vec![0u8; 2048]).unwrap();

        let client = MockCdnClient::new();
        let response = client
            .upload(&file, &UploadParams::for_asset(AssetKind::Image, "logo"))
            .await
            .unwrap();

        assert_eq!(
            response.secure_url,
            "https://mock-cdn.example.com/image/upload/logo"
        );
        assert_eq!(response.bytes, 2048);
        assert_eq!(client.get_upload_count(), 1);
        assert_eq!(client.get_uploads()[0].public_id, "logo");
    }

    #[tokio::test]
    async fn test_mock_cdn_with_failure() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("video1.mp4");
        fs::write(&file, b"frames").unwrap();

        let client = MockCdnClient::new().with_failure("video1");
        let result = client
            .upload(&file, &UploadParams::for_asset(AssetKind::Video, "video1"))
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Mock upload failure"));
        assert_eq!(client.get_upload_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_cdn_with_custom_base_url() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("clip.webm");
        fs::write(&file, b"data").unwrap();

        let client = MockCdnClient::new().with_base_url("https://custom-cdn.com".to_string());
        let response = client
            .upload(&file, &UploadParams::for_asset(AssetKind::Video, "clip"))
            .await
            .unwrap();

        assert_eq!(response.secure_url, "https://custom-cdn.com/video/upload/clip");
    }
}
