//! Image hosting for café photos.
//!
//! Uploads go to Cloudinary's signed upload endpoint; the returned
//! `secure_url` is what gets stored on the café row.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use crate::config::CloudinaryConfig;

/// Cloudinary API base URL.
const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Upper bound on one upload, body included.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No image host credentials are configured.
    #[error("image uploads are not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The host rejected the upload.
    #[error("upload rejected ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the host.
        status: u16,
        /// Error message from the host.
        message: String,
    },

    /// The response did not contain a usable URL.
    #[error("invalid response: {0}")]
    Response(String),
}

/// A submitted image file.
#[derive(Clone)]
pub struct ImageUpload {
    /// Original filename from the browser.
    pub filename: String,
    /// MIME type, if the browser sent one.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Somewhere to put café photos.
#[async_trait]
pub trait ImageHost: Send + Sync + 'static {
    /// Store the image and return its public URL.
    async fn upload(&self, image: ImageUpload) -> Result<Url, UploadError>;
}

// =============================================================================
// Cloudinary
// =============================================================================

/// Cloudinary upload API client.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
}

impl std::fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: CloudinaryConfig) -> Result<Self, UploadError> {
        let client = super::http_client(UPLOAD_TIMEOUT)
            .map_err(|e| UploadError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!(
            "{CLOUDINARY_API_BASE}/{}/image/upload",
            self.config.cloud_name
        )
    }
}

/// Sign upload parameters: sorted `key=value` pairs joined by `&`, followed
/// by the API secret, hashed with SHA-256.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Unix time in seconds, as Cloudinary expects in signed parameters.
fn upload_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Pull `secure_url` out of a successful upload response.
fn parse_upload_response(body: &str) -> Result<Url, UploadError> {
    let response: UploadResponse =
        serde_json::from_str(body).map_err(|e| UploadError::Response(e.to_string()))?;

    let secure_url = response
        .secure_url
        .ok_or_else(|| UploadError::Response("missing secure_url".to_string()))?;

    Url::parse(&secure_url).map_err(|e| UploadError::Response(format!("bad secure_url: {e}")))
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    #[instrument(skip(self, image), fields(filename = %image.filename, bytes = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> Result<Url, UploadError> {
        let timestamp = upload_timestamp();

        let signature = sign_params(
            &[("timestamp", timestamp.as_str())],
            self.config.api_secret.expose_secret(),
        );

        let mut part = Part::bytes(image.bytes).file_name(image.filename);
        if let Some(content_type) = image.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| UploadError::Request(e.to_string()))?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.to_string());
            error!(status = %status, message = %message, "Cloudinary rejected upload");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let url = parse_upload_response(&body)?;
        debug!(url = %url, "Image uploaded");
        Ok(url)
    }
}

// =============================================================================
// Unconfigured
// =============================================================================

/// Stand-in used when no Cloudinary credentials are set. Every upload fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredImageHost;

#[async_trait]
impl ImageHost for UnconfiguredImageHost {
    async fn upload(&self, _image: ImageUpload) -> Result<Url, UploadError> {
        Err(UploadError::NotConfigured)
    }
}
