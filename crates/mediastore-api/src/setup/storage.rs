//! Storage setup and initialization

use anyhow::Result;
use mediastore_core::{Config, StorageBackend};
use mediastore_services::{create_storage, Storage, UrlSigner};
use std::sync::Arc;

/// Setup the object store; for the local backend also return the signer used to
/// verify signed object reads served by this process.
pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Option<UrlSigner>)> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config).await?;
    let backend_type = storage.backend_type();
    tracing::info!(
        backend = ?backend_type,
        "Storage abstraction initialized successfully"
    );

    let url_signer = match backend_type {
        StorageBackend::Local => Some(UrlSigner::new(
            config.url_signing_secret(),
            config.local_storage_base_url(),
        )),
        StorageBackend::S3 => None,
    };

    Ok((storage, url_signer))
}
