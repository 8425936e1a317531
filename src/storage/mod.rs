//! Object storage
//!
//! Uploads artwork and audio payloads and hands back the durable public URL
//! that ends up in the catalog rows. Two backends are provided:
//! - `cloudinary` - signed uploads against the Cloudinary upload API (default)
//! - `s3` - any S3-compatible bucket via `rust-s3`

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{StorageConfig, StorageProvider};
use crate::utils::datauri::{DataUri, DataUriError};

pub mod cloudinary;
pub mod s3_client;

pub use cloudinary::CloudinaryClient;
pub use s3_client::S3ObjectStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("S3 error: {0}")]
    S3(String),

    #[error("invalid payload: {0}")]
    Payload(#[from] DataUriError),

    #[error("storage misconfigured: {0}")]
    Config(String),
}

/// Kind of asset being stored. Audio goes up as `Video`, which is how
/// Cloudinary classifies audio files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Video,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: Option<String>,
    pub resource_type: ResourceType,
}

impl UploadOptions {
    pub fn album_artwork() -> Self {
        Self {
            folder: Some("albums".to_string()),
            resource_type: ResourceType::Image,
        }
    }

    pub fn song_audio() -> Self {
        Self {
            folder: Some("songs".to_string()),
            resource_type: ResourceType::Video,
        }
    }

    pub fn song_thumbnail() -> Self {
        Self {
            folder: None,
            resource_type: ResourceType::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedAsset {
    pub secure_url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        payload: &DataUri,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, StorageError>;

    fn provider(&self) -> &'static str;
}

/// Build the object store selected by `STORAGE_PROVIDER`.
pub fn build_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match config.provider {
        StorageProvider::Cloudinary => Arc::new(CloudinaryClient::from_config(config)?),
        StorageProvider::S3 => Arc::new(S3ObjectStore::from_config(config)?),
    };
    Ok(store)
}
