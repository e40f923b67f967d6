use super::{mime, CdnService, UploadParams, UploadResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

pub struct CloudinaryClient {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryClient {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Result<Self> {
        let client = Client::builder().timeout(UPLOAD_TIMEOUT).build()?;

        Ok(Self {
            client,
            cloud_name,
            api_key,
            api_secret,
            api_base_url: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.api_base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn upload_url(&self, params: &UploadParams) -> String {
        format!(
            "{}/v1_1/{}/{}/upload",
            self.api_base_url,
            self.cloud_name,
            params.resource_type.resource_type()
        )
    }

    /// Hex SHA-256 over `k=v` pairs joined by `&` with the secret appended.
    fn signature(&self, fields: &BTreeMap<&'static str, String>) -> String {
        let payload = fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn build_form(&self, file: Part, params: &UploadParams, timestamp: i64) -> Result<Form> {
        let fields = params.signed_fields(timestamp);
        let signature = self.signature(&fields);

        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file);

        Ok(form)
    }
}

#[async_trait]
impl CdnService for CloudinaryClient {
    async fn upload(&self, path: &Path, params: &UploadParams) -> Result<UploadResponse> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(params.public_id.as_str())
            .to_string();

        // Videos run to hundreds of megabytes; stream instead of buffering.
        let part = Part::stream_with_length(Body::from(file), length)
            .file_name(file_name)
            .mime_str(mime::mime_for_path(path))?;

        let form = self.build_form(part, params, Utc::now().timestamp())?;

        let response = self
            .client
            .post(self.upload_url(params))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send upload request to Cloudinary: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(Error::Cdn(format!(
                "Upload rejected (status {}): {}",
                status, message
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Cloudinary response: {}\nBody: {}", e, body);
            Error::Cdn(format!("Failed to parse upload response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetKind;
    use std::fs;
    use tempfile::tempdir;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String) -> CloudinaryClient {
        CloudinaryClient::new("lumen".to_string(), "key".to_string(), "secret".to_string())
            .unwrap()
            .with_base_url(base_url)
    }

    #[test]
    fn test_signature_known_vector() {
        let client = client("https://api.test".to_string());
        let params = UploadParams::for_asset(AssetKind::Image, "logo");
        let signature = client.signature(&params.signed_fields(1_700_000_000));

        assert_eq!(
            signature,
            "928fc0030de1e390ac7e4d53a5647f6123950819eba3456ef1c4297f870a4c6c"
        );
    }

    #[test]
    fn test_upload_url_per_kind() {
        let client = client("https://api.test/".to_string());
        assert_eq!(
            client.upload_url(&UploadParams::for_asset(AssetKind::Image, "logo")),
            "https://api.test/v1_1/lumen/image/upload"
        );
        assert_eq!(
            client.upload_url(&UploadParams::for_asset(AssetKind::Video, "video1")),
            "https://api.test/v1_1/lumen/video/upload"
        );
    }

    #[tokio::test]
    async fn test_upload_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1_1/lumen/image/upload"))
            .and(body_string_contains("f_auto,q_auto:good"))
            .and(body_string_contains("name=\"public_id\"\r\n\r\nlogo\r\n"))
            .and(body_string_contains("name=\"overwrite\"\r\n\r\ntrue\r\n"))
            .and(body_string_contains("name=\"invalidate\"\r\n\r\ntrue\r\n"))
            .and(body_string_contains("name=\"api_key\"\r\n\r\nkey\r\n"))
            .and(body_string_contains("name=\"signature\""))
            .and(body_string_contains("name=\"timestamp\""))
            .and(body_string_contains("name=\"signature_algorithm\"\r\n\r\nsha256\r\n"))
            .and(body_string_contains("not really a png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "secure_url": "https://cdn/x/logo.png",
                "bytes": 20480,
                "public_id": "logo",
                "resource_type": "image"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let file = dir.path().join("logo.png");
        fs::write(&file, b"not really a png").unwrap();

        let response = client(server.uri())
            .upload(&file, &UploadParams::for_asset(AssetKind::Image, "logo"))
            .await
            .unwrap();

        assert_eq!(response.secure_url, "https://cdn/x/logo.png");
        assert_eq!(response.bytes, 20480);
        assert_eq!(response.public_id.as_deref(), Some("logo"));
    }

    #[tokio::test]
    async fn test_upload_rejected_surfaces_cdn_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1_1/lumen/video/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Invalid Signature" }
            })))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let file = dir.path().join("video1.mp4");
        fs::write(&file, b"frames").unwrap();

        let err = client(server.uri())
            .upload(&file, &UploadParams::for_asset(AssetKind::Video, "video1"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cdn(_)));
        assert!(err.to_string().contains("Invalid Signature"));
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let client = client("http://127.0.0.1:9".to_string());
        let err = client
            .upload(
                Path::new("/definitely/not/here.png"),
                &UploadParams::for_asset(AssetKind::Image, "here"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }
}
