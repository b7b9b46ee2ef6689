//! Signed object reads for the local storage backend (no auth; the signature is the credential).

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use mediastore_core::AppError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SignedObjectQuery {
    pub expires: u64,
    pub signature: String,
}

#[tracing::instrument(skip(state, query), fields(operation = "get_signed_object"))]
pub async fn get_signed_object(
    Path(key): Path<String>,
    Query(query): Query<SignedObjectQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let signer = state
        .url_signer
        .as_ref()
        .ok_or_else(|| AppError::FileNotFound(key.clone()))?;

    signer.verify(&key, query.expires, &query.signature)?;

    let ctx = state.request_context();
    let data = ctx
        .run("read_object", async {
            state.storage.get(&key).await.map_err(AppError::from)
        })
        .await?;

    // The fid is the last key segment; its record carries the declared content type.
    let content_type = match key.rsplit('/').next() {
        Some(fid) => state
            .uploads
            .query_file(&ctx, fid)
            .await
            .map(|record| record.content_type)
            .unwrap_or_else(|_| "application/octet-stream".to_string()),
        None => "application/octet-stream".to_string(),
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, data.len())
        .header(header::CACHE_CONTROL, "private, max-age=300")
        .body(Body::from(data))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
