//! Application setup and initialization
//!
//! Startup order: validate configuration, telemetry, metadata stores (with migrations),
//! staging store, object store, services, default namespaces, routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod staging;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use mediastore_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    build_app(config).await
}

/// Build state and router without installing a global subscriber.
pub async fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let pool = database::setup_database(&config).await?;

    let staging = staging::setup_staging(&config).await?;

    let (storage, url_signer) = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, pool, staging, storage, url_signer).await?;

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
