use std::time::Duration;

use reqwest::multipart;
use tracing::{error, info};

use crate::error::UploadError;
use crate::stage::AuthContext;

/// One upload attempt: endpoint, multipart field layout, and the repaired
/// payload. Constructed per attempt and discarded after.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Absolute URL of the per-stage endpoint.
    pub endpoint: String,
    /// Multipart field name the endpoint expects ("file", historically
    /// "video" on some backends).
    pub field_name: String,
    /// Filename attached to the part.
    pub file_name: String,
    /// Finalized container with corrected duration.
    pub payload: Vec<u8>,
}

/// Backend acknowledgement of a stored recording.
#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub status: u16,
    /// JSON success body, when the endpoint returns one.
    pub body: Option<serde_json::Value>,
}

/// Seam between the pipeline and the network, so tests can substitute a
/// recording double.
#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn submit(&self, request: UploadRequest) -> Result<UploadResponse, UploadError>;
}

/// Multipart uploader backed by reqwest.
pub struct HttpUploader {
    client: reqwest::Client,
    auth: AuthContext,
    timeout: Duration,
}

impl HttpUploader {
    pub fn new(auth: AuthContext, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl Uploader for HttpUploader {
    async fn submit(&self, request: UploadRequest) -> Result<UploadResponse, UploadError> {
        let size = request.payload.len();
        info!(
            "Uploading {} bytes to {} (field \"{}\")",
            size, request.endpoint, request.field_name
        );

        let part = multipart::Part::bytes(request.payload)
            .file_name(request.file_name)
            .mime_str("video/webm")?;
        let form = multipart::Form::new().part(request.field_name, part);

        let mut req = self
            .client
            .post(&request.endpoint)
            .multipart(form)
            .timeout(self.timeout);
        if let Some(token) = &self.auth.token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            error!("Upload to {} rejected: {}", request.endpoint, status);
            return Err(UploadError::Status(status.as_u16()));
        }

        let body = response.json::<serde_json::Value>().await.ok();
        info!("Upload accepted: {} ({} bytes)", status, size);

        Ok(UploadResponse {
            status: status.as_u16(),
            body,
        })
    }
}
