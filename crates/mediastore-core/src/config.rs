//! Configuration module
//!
//! Service configuration loaded from environment variables (and an optional `.env`
//! file): HTTP server, metadata store, staging store, object store and URL signing.

use std::env;
use std::time::Duration;

use crate::constants::{SIGNED_URL_TTL_SECS, STAGING_TTL_SECS};
use crate::storage_types::{MetadataBackend, StagingBackend, StorageBackend};

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_UPLOAD_SIZE_BYTES: usize = 100 * 1024 * 1024;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const KEY_GROUP: &str = "default";
const LOCAL_STORAGE_PATH: &str = "./storage";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:3000/objects";

/// Full service configuration.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub request_timeout_secs: u64,
    pub max_upload_size_bytes: usize,
    pub http_concurrency_limit: usize,
    // Metadata store (repositories, collections, file index)
    pub metadata_backend: MetadataBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Staging store
    pub staging_backend: StagingBackend,
    pub redis_url: Option<String>,
    pub key_group: String,
    pub staging_ttl_secs: u64,
    // Object store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub url_signing_secret: Option<String>,
    pub signed_url_ttl_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().jwt_secret
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().request_timeout_secs)
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    /// Maximum number of requests served at once.
    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().http_concurrency_limit
    }

    pub fn metadata_backend(&self) -> MetadataBackend {
        self.inner().metadata_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn staging_backend(&self) -> StagingBackend {
        self.inner().staging_backend
    }

    pub fn redis_url(&self) -> Option<&str> {
        self.inner().redis_url.as_deref()
    }

    pub fn key_group(&self) -> &str {
        &self.inner().key_group
    }

    pub fn staging_ttl(&self) -> Duration {
        Duration::from_secs(self.inner().staging_ttl_secs)
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.inner().local_storage_base_url
    }

    /// Secret for locally signed object URLs, falling back to the JWT secret.
    pub fn url_signing_secret(&self) -> &str {
        self.inner()
            .url_signing_secret
            .as_deref()
            .unwrap_or(&self.inner().jwt_secret)
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.inner().signed_url_ttl_secs)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let metadata_backend = env::var("METADATA_BACKEND")
            .unwrap_or_else(|_| MetadataBackend::Postgres.to_string())
            .parse::<MetadataBackend>()?;
        let staging_backend = env::var("STAGING_BACKEND")
            .unwrap_or_else(|_| StagingBackend::Redis.to_string())
            .parse::<StagingBackend>()?;
        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| StorageBackend::S3.to_string())
            .parse::<StorageBackend>()?;

        Ok(ServiceConfig {
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            cors_origins,
            environment,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECONDS", REQUEST_TIMEOUT_SECS),
            max_upload_size_bytes: env_or("MAX_UPLOAD_SIZE_BYTES", MAX_UPLOAD_SIZE_BYTES),
            http_concurrency_limit: env_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT),
            metadata_backend,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            staging_backend,
            redis_url: env::var("REDIS_URL").ok(),
            key_group: env::var("KEY_GROUP").unwrap_or_else(|_| KEY_GROUP.to_string()),
            staging_ttl_secs: env_or("STAGING_TTL_SECONDS", STAGING_TTL_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| LOCAL_STORAGE_BASE_URL.to_string()),
            url_signing_secret: env::var("URL_SIGNING_SECRET").ok(),
            signed_url_ttl_secs: env_or("SIGNED_URL_TTL_SECONDS", SIGNED_URL_TTL_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        let is_production = matches!(self.environment.to_lowercase().as_str(), "production" | "prod");
        if is_production && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.metadata_backend == MetadataBackend::Postgres {
            match self.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when METADATA_BACKEND=postgres"
                    ))
                }
            }
        }

        if self.staging_backend == StagingBackend::Redis && self.redis_url.is_none() {
            return Err(anyhow::anyhow!(
                "REDIS_URL must be set when STAGING_BACKEND=redis"
            ));
        }

        if self.storage_backend == StorageBackend::S3 && self.s3_bucket.is_none() {
            return Err(anyhow::anyhow!("S3_BUCKET must be set when STORAGE_BACKEND=s3"));
        }

        if self.staging_ttl_secs == 0 {
            return Err(anyhow::anyhow!("STAGING_TTL_SECONDS must be greater than 0"));
        }

        if self.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!(
                "HTTP_CONCURRENCY_LIMIT must be greater than 0"
            ));
        }

        if self.signed_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "SIGNED_URL_TTL_SECONDS must be greater than 0"
            ));
        }

        if self.key_group.contains(':') {
            return Err(anyhow::anyhow!("KEY_GROUP must not contain ':'"));
        }

        Ok(())
    }

    /// Configuration with in-memory stores and local storage, used by tests and local runs.
    pub fn in_memory(jwt_secret: impl Into<String>, local_storage_path: impl Into<String>) -> Self {
        ServiceConfig {
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            jwt_secret: jwt_secret.into(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            max_upload_size_bytes: MAX_UPLOAD_SIZE_BYTES,
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            metadata_backend: MetadataBackend::Memory,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            staging_backend: StagingBackend::Memory,
            redis_url: None,
            key_group: KEY_GROUP.to_string(),
            staging_ttl_secs: STAGING_TTL_SECS,
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: local_storage_path.into(),
            local_storage_base_url: LOCAL_STORAGE_BASE_URL.to_string(),
            url_signing_secret: None,
            signed_url_ttl_secs: SIGNED_URL_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_in_memory_config_is_valid() {
        let config = ServiceConfig::in_memory(SECRET, "/tmp/mediastore");
        assert!(config.validate().is_ok());
        let config = Config(Box::new(config));
        assert_eq!(config.staging_ttl(), Duration::from_secs(3600));
        assert_eq!(config.url_signing_secret(), SECRET);
        assert!(!config.is_production());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let config = ServiceConfig::in_memory("short", "/tmp/mediastore");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let mut config = ServiceConfig::in_memory(SECRET, "/tmp/mediastore");
        config.metadata_backend = MetadataBackend::Postgres;
        assert!(config.validate().is_err());
        config.database_url = Some("mysql://localhost/db".to_string());
        assert!(config.validate().is_err());
        config.database_url = Some("postgres://localhost/mediastore".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redis_and_s3_require_connection_info() {
        let mut config = ServiceConfig::in_memory(SECRET, "/tmp/mediastore");
        config.staging_backend = StagingBackend::Redis;
        assert!(config.validate().is_err());
        config.redis_url = Some("redis://127.0.0.1/".to_string());
        assert!(config.validate().is_ok());

        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());
        config.s3_bucket = Some("media".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut config = ServiceConfig::in_memory(SECRET, "/tmp/mediastore");
        config.environment = "production".to_string();
        assert!(config.validate().is_err());
        config.cors_origins = vec!["https://media.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_signing_secret_override() {
        let mut config = ServiceConfig::in_memory(SECRET, "/tmp/mediastore");
        config.url_signing_secret = Some("another-secret".to_string());
        let config = Config(Box::new(config));
        assert_eq!(config.url_signing_secret(), "another-secret");
    }

    #[test]
    fn test_concurrency_limit_is_configurable() {
        let mut config = ServiceConfig::in_memory(SECRET, "/tmp/mediastore");
        assert_eq!(config.http_concurrency_limit, 10_000);

        config.http_concurrency_limit = 0;
        assert!(config.validate().is_err());

        config.http_concurrency_limit = 64;
        assert!(config.validate().is_ok());
        assert_eq!(Config(Box::new(config)).http_concurrency_limit(), 64);
    }
}
