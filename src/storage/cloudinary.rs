// Cloudinary upload API client
//
// Uploads are signed: the request parameters (minus file and api_key) are
// sorted, joined as `k=v&k=v`, suffixed with the API secret and hashed with
// the account's signature algorithm (SHA-1 unless switched to SHA-256).

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{ObjectStore, StorageError, UploadOptions, UploadedAsset};
use crate::config::{SignatureAlgorithm, StorageConfig};
use crate::utils::datauri::DataUri;

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    algorithm: SignatureAlgorithm,
}

impl CloudinaryClient {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            algorithm: SignatureAlgorithm::default(),
        }
    }

    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Point the client at another API root (a proxy, or a mock server in tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.cloudinary_cloud_name.is_empty()
            || config.cloudinary_api_key.is_empty()
            || config.cloudinary_api_secret.is_empty()
        {
            return Err(StorageError::Config(
                "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set"
                    .to_string(),
            ));
        }

        Ok(Self::new(
            &config.cloudinary_cloud_name,
            &config.cloudinary_api_key,
            &config.cloudinary_api_secret,
        )
        .with_api_base(&config.cloudinary_api_base)
        .with_signature_algorithm(config.cloudinary_signature_algorithm))
    }

    fn upload_url(&self, options: &UploadOptions) -> String {
        format!(
            "{}/{}/{}/upload",
            self.api_base,
            self.cloud_name,
            options.resource_type.as_str()
        )
    }

    fn signed_params(&self, options: &UploadOptions, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("timestamp", timestamp.to_string())];
        if let Some(folder) = &options.folder {
            params.push(("folder", folder.clone()));
        }
        params
    }
}

/// Hex digest over the sorted `k=v` pairs followed by the secret.
pub fn sign_params(
    params: &[(&str, String)],
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let payload = format!("{}{}", to_sign, api_secret);
    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

#[async_trait]
impl ObjectStore for CloudinaryClient {
    async fn upload(
        &self,
        payload: &DataUri,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, StorageError> {
        let timestamp = chrono::Utc::now().timestamp();
        let params = self.signed_params(options, timestamp);
        let signature = sign_params(&params, &self.api_secret, self.algorithm);

        let mut form = Form::new()
            .text("file", payload.as_str().to_string())
            .text("api_key", self.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let url = self.upload_url(options);
        debug!(url = %url, mime = payload.mime(), folder = ?options.folder, "Uploading to Cloudinary");

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let asset: UploadedAsset = response.json().await?;
        info!(public_id = %asset.public_id, "Uploaded asset to Cloudinary");
        Ok(asset)
    }

    fn provider(&self) -> &'static str {
        "cloudinary"
    }
}
