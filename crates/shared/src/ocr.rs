//! HTTP client for the external OCR service.

use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::config::OcrConfig;
use crate::error::AppError;

/// Upstream processing path, relative to the configured base URL.
const PROCESS_PATH: &str = "/api/v1/ocr/process";

/// OCR client errors.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The request could not be built or sent.
    #[error("OCR request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("OCR service responded with {status}: {body}")]
    Upstream {
        /// HTTP status returned by the service.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The service answered 2xx with a body that is not JSON.
    #[error("OCR service returned an unreadable body: {0}")]
    Decode(String),
}

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

/// A file to forward for recognition.
#[derive(Debug, Clone)]
pub struct OcrUpload {
    /// Original file name.
    pub file_name: String,
    /// MIME type reported by the client, if any.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Bytes,
    /// Whether the service should persist its result.
    pub save_result: bool,
}

/// Client for the OCR upstream.
#[derive(Debug, Clone)]
pub struct OcrClient {
    http: reqwest::Client,
    endpoint: String,
}

impl OcrClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OcrError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}{PROCESS_PATH}", config.base_url.trim_end_matches('/')),
        })
    }

    /// Returns the full processing URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Forwards a file and returns the service's JSON response.
    ///
    /// # Errors
    ///
    /// Returns `OcrError::Upstream` on a non-2xx status, `OcrError::Transport`
    /// on connection failure, and `OcrError::Decode` on a non-JSON body.
    pub async fn process(&self, upload: OcrUpload) -> Result<serde_json::Value, OcrError> {
        let mut part = Part::stream(upload.bytes).file_name(upload.file_name);
        if let Some(mime) = upload.content_type.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|e| OcrError::Transport(e.to_string()))?;
        }

        let form = Form::new()
            .part("file", part)
            .text("save_result", upload.save_result.to_string());

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| OcrError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "OCR upstream rejected upload");
            return Err(OcrError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| OcrError::Decode(e.to_string()))
    }
}
