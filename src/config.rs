use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Cloudinary,
    S3,
}

impl FromStr for StorageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloudinary" => Ok(StorageProvider::Cloudinary),
            "s3" => Ok(StorageProvider::S3),
            other => Err(anyhow!("Unsupported storage provider: {}", other)),
        }
    }
}

/// Digest Cloudinary uses to verify upload signatures. Accounts default to
/// SHA-1; SHA-256 must be switched on in the account settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl FromStr for SignatureAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(anyhow!("Unsupported signature algorithm: {}", other)),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub cloudinary_api_base: String,
    pub cloudinary_signature_algorithm: SignatureAlgorithm,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_public_url: Option<String>,
}

// Secrets stay out of the startup log.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("cloudinary_cloud_name", &self.cloudinary_cloud_name)
            .field("cloudinary_api_base", &self.cloudinary_api_base)
            .field(
                "cloudinary_signature_algorithm",
                &self.cloudinary_signature_algorithm,
            )
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_region", &self.s3_region)
            .field("s3_endpoint", &self.s3_endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub admin_role: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_role", &self.admin_role)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} must be set", key))
        };

        Ok(Self {
            server: ServerConfig {
                port: parse("PORT", &var("PORT", "5000"))?,
                host: var("HOST", "0.0.0.0"),
                cors_allowed_origins: var("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                max_upload_bytes: parse("MAX_UPLOAD_BYTES", &var("MAX_UPLOAD_BYTES", "52428800"))?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse("DB_MAX_CONNECTIONS", &var("DB_MAX_CONNECTIONS", "10"))?,
                min_connections: parse("DB_MIN_CONNECTIONS", &var("DB_MIN_CONNECTIONS", "1"))?,
            },
            redis: RedisConfig {
                url: var("REDIS_URL", "redis://localhost:6379"),
                enabled: parse("REDIS_ENABLED", &var("REDIS_ENABLED", "true"))?,
            },
            storage: StorageConfig {
                provider: parse("STORAGE_PROVIDER", &var("STORAGE_PROVIDER", "cloudinary"))?,
                cloudinary_cloud_name: var("CLOUDINARY_CLOUD_NAME", ""),
                cloudinary_api_key: var("CLOUDINARY_API_KEY", ""),
                cloudinary_api_secret: var("CLOUDINARY_API_SECRET", ""),
                cloudinary_api_base: var("CLOUDINARY_API_BASE", "https://api.cloudinary.com/v1_1"),
                cloudinary_signature_algorithm: parse(
                    "CLOUDINARY_SIGNATURE_ALGORITHM",
                    &var("CLOUDINARY_SIGNATURE_ALGORITHM", "sha1"),
                )?,
                s3_bucket: var("S3_BUCKET", ""),
                s3_region: var("S3_REGION", "us-east-1"),
                s3_access_key_id: lookup("AWS_ACCESS_KEY_ID"),
                s3_secret_access_key: lookup("AWS_SECRET_ACCESS_KEY"),
                s3_endpoint: lookup("S3_ENDPOINT"),
                s3_public_url: lookup("S3_PUBLIC_URL"),
            },
            auth: AuthConfig {
                jwt_secret: required("JWT_SECRET")?,
                admin_role: var("ADMIN_ROLE", "admin"),
            },
        })
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("Invalid value for {}: '{}'", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.cors_allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.server.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.redis.enabled);
        assert_eq!(config.storage.provider, StorageProvider::Cloudinary);
        assert_eq!(
            config.storage.cloudinary_signature_algorithm,
            SignatureAlgorithm::Sha1
        );
        assert_eq!(config.auth.admin_role, "admin");
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "secret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_missing_jwt_secret() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "secret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_s3_provider_and_origins() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "secret"),
            ("STORAGE_PROVIDER", "S3"),
            ("S3_BUCKET", "catalog-media"),
            ("ALLOWED_ORIGINS", "http://localhost:5173, https://admin.example.com"),
            ("REDIS_ENABLED", "false"),
        ]))
        .unwrap();

        assert_eq!(config.storage.provider, StorageProvider::S3);
        assert_eq!(config.storage.s3_bucket, "catalog-media");
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["http://localhost:5173", "https://admin.example.com"]
        );
        assert!(!config.redis.enabled);
    }

    #[test]
    fn test_signature_algorithm() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "secret"),
            ("CLOUDINARY_SIGNATURE_ALGORITHM", "SHA-256"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage.cloudinary_signature_algorithm,
            SignatureAlgorithm::Sha256
        );

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "secret"),
            ("CLOUDINARY_SIGNATURE_ALGORITHM", "md5"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CLOUDINARY_SIGNATURE_ALGORITHM"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "super-secret-value"),
            ("CLOUDINARY_API_SECRET", "cloud-secret-value"),
        ]))
        .unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-value"));
        assert!(!rendered.contains("cloud-secret-value"));
    }
}
