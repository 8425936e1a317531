// S3-compatible object store

use async_trait::async_trait;
use s3::{creds::Credentials, Bucket, Region};
use tracing::info;
use uuid::Uuid;

use super::{ObjectStore, StorageError, UploadOptions, UploadedAsset};
use crate::config::StorageConfig;
use crate::utils::datauri::DataUri;

pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_base: String,
}

impl S3ObjectStore {
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.s3_bucket.is_empty() {
            return Err(StorageError::Config("S3_BUCKET must be set".to_string()));
        }

        let region = match &config.s3_endpoint {
            Some(endpoint) => Region::Custom {
                region: config.s3_region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .s3_region
                .parse::<Region>()
                .map_err(|e| StorageError::Config(e.to_string()))?,
        };

        let credentials = Credentials::new(
            config.s3_access_key_id.as_deref(),
            config.s3_secret_access_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(e.to_string()))?;

        let mut bucket = Bucket::new(&config.s3_bucket, region, credentials)
            .map_err(|e| StorageError::S3(e.to_string()))?;
        if config.s3_endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket: Box::new(bucket),
            public_base: public_base_url(config),
        })
    }
}

/// Base URL objects are served from. `S3_PUBLIC_URL` wins, then the custom
/// endpoint (path style), then the AWS virtual-hosted style address.
pub fn public_base_url(config: &StorageConfig) -> String {
    let base = match (&config.s3_public_url, &config.s3_endpoint) {
        (Some(public), _) => public.clone(),
        (None, Some(endpoint)) => format!("{}/{}", endpoint.trim_end_matches('/'), config.s3_bucket),
        (None, None) => format!(
            "https://{}.s3.{}.amazonaws.com",
            config.s3_bucket, config.s3_region
        ),
    };
    base.trim_end_matches('/').to_string()
}

pub fn object_key(options: &UploadOptions) -> String {
    let id = Uuid::new_v4().simple().to_string();
    match &options.folder {
        Some(folder) => format!("{}/{}", folder, id),
        None => id,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        payload: &DataUri,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, StorageError> {
        let bytes = payload.decode()?;
        let key = object_key(options);

        let response = self
            .bucket
            .put_object_with_content_type(&key, &bytes, payload.mime())
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Rejected {
                status,
                message: String::from_utf8_lossy(response.as_slice()).to_string(),
            });
        }

        info!(key = %key, size = bytes.len(), "Uploaded object to S3");

        Ok(UploadedAsset {
            secure_url: format!("{}/{}", self.public_base, key),
            public_id: key,
        })
    }

    fn provider(&self) -> &'static str {
        "s3"
    }
}
