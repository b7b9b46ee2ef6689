//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use mediastore_core::{Config, MetadataBackend, StagingBackend};

/// Validate critical configuration values.
///
/// Hard errors come from `Config::validate`; combinations that work but lose data on
/// restart are only warned about.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() {
        if config.metadata_backend() == MetadataBackend::Memory {
            tracing::warn!("METADATA_BACKEND=memory in production - file records will not survive a restart");
        }
        if config.staging_backend() == StagingBackend::Memory {
            tracing::warn!(
                "STAGING_BACKEND=memory in production - reservations are not shared between instances"
            );
        }
    }

    if config.signed_url_ttl() > config.staging_ttl() {
        tracing::warn!(
            signed_url_ttl_secs = config.signed_url_ttl().as_secs(),
            staging_ttl_secs = config.staging_ttl().as_secs(),
            "Signed read URLs outlive upload reservations"
        );
    }

    if config.request_timeout().is_zero() {
        return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECONDS cannot be 0"));
    }

    if config.max_upload_size_bytes() == 0 {
        return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_BYTES cannot be 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediastore_core::ServiceConfig;

    fn config(mutate: impl FnOnce(&mut ServiceConfig)) -> Config {
        let mut inner = ServiceConfig::in_memory("0123456789abcdef0123456789abcdef", "/tmp/ms");
        mutate(&mut inner);
        Config(Box::new(inner))
    }

    #[test]
    fn test_in_memory_config_passes() {
        assert!(validate_config(&config(|_| {})).is_ok());
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        assert!(validate_config(&config(|c| c.request_timeout_secs = 0)).is_err());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        assert!(validate_config(&config(|c| c.jwt_secret = "short".to_string())).is_err());
    }
}
