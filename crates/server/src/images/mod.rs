//! Remote image storage for slip photos.
//!
//! Slips only keep the public URL of their image. [`ImageStore`] uploads new
//! photos and deletes them again by that URL when the retention sweep
//! removes a slip.

mod cloudinary;

pub use cloudinary::{CloudinaryImageStore, public_id_from_url};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the remote image store.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the store's response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The URL does not point at an image this store manages.
    #[error("unrecognized image URL: {0}")]
    UnrecognizedUrl(String),
}

/// An uploaded image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

/// Remote image storage.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image and return its public URL.
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError>;

    /// Delete the image behind `url`. Deleting an image that is already gone
    /// succeeds.
    async fn delete(&self, url: &str) -> Result<(), ImageStoreError>;
}
