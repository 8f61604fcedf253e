//! Cloudinary-compatible image store client.
//!
//! # API Reference
//!
//! - Upload: `POST {api_base}/{cloud}/image/upload` (multipart)
//! - Destroy: `POST {api_base}/{cloud}/image/destroy` (form)
//! - Authentication: `api_key`, `timestamp` and a SHA-256 `signature` over
//!   the sorted, signed parameters followed by the API secret

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use super::{ImageStore, ImageStoreError, ImageUpload};
use crate::config::CloudinaryConfig;

/// Cloudinary API client.
#[derive(Clone)]
pub struct CloudinaryImageStore {
    inner: Arc<CloudinaryInner>,
}

struct CloudinaryInner {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryImageStore {
    /// Create a new image store client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: CloudinaryConfig) -> Result<Self, ImageStoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(CloudinaryInner { client, config }),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        let config = &self.inner.config;
        format!("{}/{}/image/{action}", config.api_base, config.cloud_name)
    }

    /// Check the response status and parse the JSON body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ImageStoreError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ImageStoreError::Parse(format!("Failed to parse response: {e}")));
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(ImageStoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    #[tracing::instrument(skip(self, image), fields(filename = %image.filename, size = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError> {
        let config = &self.inner.config;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", config.folder.as_str()), ("timestamp", timestamp.as_str())],
            &config.api_secret,
        );

        let mut file = Part::bytes(image.bytes).file_name(image.filename);
        if let Some(content_type) = image.content_type.as_deref() {
            file = file.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", file)
            .text("api_key", config.api_key.clone())
            .text("folder", config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .inner
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::handle_response(response).await?;

        tracing::debug!(url = %uploaded.secure_url, "Image uploaded");
        Ok(uploaded.secure_url)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, url: &str) -> Result<(), ImageStoreError> {
        let config = &self.inner.config;
        let public_id = public_id_from_url(url)
            .ok_or_else(|| ImageStoreError::UnrecognizedUrl(url.to_string()))?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())],
            &config.api_secret,
        );

        let params = [
            ("public_id", public_id.as_str()),
            ("api_key", config.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];
        let response = self
            .inner
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;
        let destroyed: DestroyResponse = Self::handle_response(response).await?;

        match destroyed.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(ImageStoreError::Api {
                status: 200,
                message: format!("destroy returned '{other}'"),
            }),
        }
    }
}

impl std::fmt::Debug for CloudinaryImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryImageStore")
            .field("cloud_name", &self.inner.config.cloud_name)
            .field("folder", &self.inner.config.folder)
            .finish_non_exhaustive()
    }
}

/// Signature over `params` (sorted by name) followed by the API secret.
fn sign(params: &[(&str, &str)], secret: &SecretString) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(name, _)| *name);
    let joined = sorted
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive the public id from a delivery URL.
///
/// `https://res.cloudinary.com/<cloud>/image/upload/v1712/cake_slips/abc.webp`
/// yields `cake_slips/abc`. Transformation segments before the version are
/// skipped. Returns `None` for URLs without an `upload` segment.
#[must_use]
pub fn public_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let upload = segments.iter().position(|s| *s == "upload")?;
    let mut rest = segments.get(upload + 1..)?;

    if let Some(version) = rest.iter().position(|s| is_version(s)) {
        rest = rest.get(version + 1..)?;
    }
    let (last, dirs) = rest.split_last()?;
    let stem = last.rsplit_once('.').map_or(*last, |(stem, _)| stem);
    if stem.is_empty() {
        return None;
    }

    let mut id = dirs.join("/");
    if !id.is_empty() {
        id.push('/');
    }
    id.push_str(stem);
    Some(id)
}

fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
