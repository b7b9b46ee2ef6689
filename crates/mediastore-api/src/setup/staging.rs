//! Staging store setup

use crate::constants::STAGING_PURGE_INTERVAL_SECS;
use anyhow::{Context, Result};
use mediastore_core::{Config, StagingBackend};
use mediastore_services::{MemoryStagingStore, RedisStagingStore, StagingStore};
use std::sync::Arc;
use std::time::Duration;

pub async fn setup_staging(config: &Config) -> Result<Arc<dyn StagingStore>> {
    match config.staging_backend() {
        StagingBackend::Redis => {
            let url = config
                .redis_url()
                .context("REDIS_URL must be set when STAGING_BACKEND=redis")?;
            let store = RedisStagingStore::new(url, config.key_group())
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!(key_group = %config.key_group(), "Redis staging store connected");
            Ok(Arc::new(store))
        }
        StagingBackend::Memory => {
            let store = Arc::new(MemoryStagingStore::new(config.key_group()));

            // Expired entries are also dropped on read; the sweep bounds memory for abandoned ones.
            let sweeper = store.clone();
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(Duration::from_secs(STAGING_PURGE_INTERVAL_SECS));
                loop {
                    interval.tick().await;
                    let purged = sweeper.purge_expired().await;
                    if purged > 0 {
                        tracing::debug!(purged, "Purged expired staging entries");
                    }
                }
            });

            tracing::warn!(
                key_group = %config.key_group(),
                "Using in-memory staging store; reservations are lost on restart"
            );
            Ok(store)
        }
    }
}
