use crate::constants::SERVICE_NAME;
use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Answers without touching any store.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
