//! Service initialization and application state setup

use crate::state::AppState;
use anyhow::{Context, Result};
use mediastore_core::{Config, MetadataBackend};
use mediastore_services::{
    FileIndex, FileIndexStore, MemoryFileIndexStore, MemoryNamespaceStore, NamespaceRegistry,
    NamespaceStore, PgFileIndexStore, PgNamespaceStore, StagingStore, Storage, UploadCoordinator,
    UploadSettings, UrlSigner,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Build the metadata stores for the configured backend.
fn create_metadata_stores(
    config: &Config,
    pool: Option<PgPool>,
) -> Result<(Arc<dyn NamespaceStore>, Arc<dyn FileIndexStore>)> {
    match (config.metadata_backend(), pool) {
        (MetadataBackend::Postgres, Some(pool)) => Ok((
            Arc::new(PgNamespaceStore::new(pool.clone())),
            Arc::new(PgFileIndexStore::new(pool)),
        )),
        (MetadataBackend::Postgres, None) => Err(anyhow::anyhow!(
            "Postgres metadata backend selected but no database pool was created"
        )),
        (MetadataBackend::Memory, _) => Ok((
            Arc::new(MemoryNamespaceStore::new()),
            Arc::new(MemoryFileIndexStore::new()),
        )),
    }
}

/// Initialize all services, returning the application state.
///
/// The default repository and collection are created here; failing to do so aborts startup.
pub async fn initialize_services(
    config: &Config,
    pool: Option<PgPool>,
    staging: Arc<dyn StagingStore>,
    storage: Arc<dyn Storage>,
    url_signer: Option<UrlSigner>,
) -> Result<Arc<AppState>> {
    let (namespace_store, file_store) = create_metadata_stores(config, pool)?;

    let namespaces = NamespaceRegistry::new(namespace_store);
    namespaces
        .ensure_defaults()
        .await
        .context("Failed to ensure default repository and collection")?;
    tracing::info!("Default repository and collection available");

    let settings = UploadSettings::from_config(config);
    let uploads = UploadCoordinator::new(
        namespaces.clone(),
        staging,
        FileIndex::new(file_store),
        storage.clone(),
        settings,
    );

    tracing::info!(
        metadata_backend = %config.metadata_backend(),
        staging_backend = %config.staging_backend(),
        storage_backend = %config.storage_backend(),
        staging_ttl_secs = settings.staging_ttl.as_secs(),
        signed_url_ttl_secs = settings.signed_url_ttl.as_secs(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        namespaces,
        uploads,
        storage,
        url_signer,
    }))
}
