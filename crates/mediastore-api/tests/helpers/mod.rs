//! Test helpers: build AppState and router for integration tests.
//!
//! Every test app runs on in-memory metadata and staging stores with local object
//! storage in a temporary directory, so no external services are needed.

#![allow(dead_code)]

pub mod auth;

use axum_test::TestServer;
use mediastore_api::constants::API_PREFIX;
use mediastore_api::setup;
use mediastore_api::state::AppState;
use mediastore_core::{Config, ServiceConfig};
use std::sync::Arc;
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/v1/media/files`).
pub fn api_path(path: &str) -> String {
    format!("{}/media{}", API_PREFIX, path)
}

/// Test application: server, state and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config(storage_path: &str) -> Config {
    Config(Box::new(ServiceConfig::in_memory(
        auth::TEST_JWT_SECRET,
        storage_path,
    )))
}

/// Setup test app with in-memory stores and local storage.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir.path().to_string_lossy());

    let (state, app) = setup::build_app(config)
        .await
        .expect("Failed to build application");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
