//! Upload protocol and file read endpoints.

use crate::auth::Uploader;
use crate::constants::UPLOAD_FILE_FIELD;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use futures::{StreamExt, TryStreamExt};
use mediastore_core::constants::DEFAULT_COLLECTION_ID;
use mediastore_core::{AppError, FileRecord, InitUpload, StagingRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub fid: String,
    pub init_info: StagingRecord,
}

#[derive(Debug, Default, Deserialize)]
pub struct SingleUploadQuery {
    #[serde(default, alias = "box_id")]
    pub collection_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SingleUploadResponse {
    pub fid: String,
    pub file: FileRecord,
}

#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub url: String,
    /// Seconds until the URL stops working.
    pub expires_in: u64,
}

/// Reserve a fid. The uploader is always the authenticated caller.
#[tracing::instrument(skip(state, uploader, init), fields(operation = "apply_upload", uploader = %uploader.id))]
pub async fn apply_upload(
    uploader: Uploader,
    State(state): State<Arc<AppState>>,
    ValidatedJson(init): ValidatedJson<InitUpload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let init = InitUpload {
        uploader: Some(uploader.id),
        ..init
    };

    let ctx = state.request_context();
    let record = state.uploads.apply(&ctx, init).await?;

    Ok(Json(ApplyResponse {
        fid: record.fid.clone(),
        init_info: record,
    }))
}

/// Stream the `file` part of a multipart body into a reserved fid.
#[tracing::instrument(skip(state, _uploader, query, multipart), fields(operation = "single_upload"))]
pub async fn single_upload(
    _uploader: Uploader,
    State(state): State<Arc<AppState>>,
    Path(fid): Path<String>,
    Query(query): Query<SingleUploadQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let collection_id = query
        .collection_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_COLLECTION_ID.to_string());

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FILE_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let body = field
            .map_err(|e| std::io::Error::other(e.body_text()))
            .boxed();

        let ctx = state.request_context();
        let record = state
            .uploads
            .single_upload(&ctx, &collection_id, &fid, body)
            .await?;

        return Ok(Json(SingleUploadResponse {
            fid: record.fid.clone(),
            file: record,
        }));
    }

    Err(AppError::MissingField(UPLOAD_FILE_FIELD).into())
}

#[tracing::instrument(skip(state, _uploader), fields(operation = "get_file_info"))]
pub async fn get_file_info(
    _uploader: Uploader,
    Path(fid): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ctx = state.request_context();
    let record = state.uploads.query_file(&ctx, &fid).await?;
    Ok(Json(record))
}

#[tracing::instrument(skip(state, _uploader), fields(operation = "get_file_url"))]
pub async fn get_file_url(
    _uploader: Uploader,
    Path(fid): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ctx = state.request_context();
    let record = state.uploads.query_file(&ctx, &fid).await?;
    let signed = state.uploads.sign_read_url(&ctx, &record).await?;

    Ok(Json(SignedUrlResponse {
        url: signed.url,
        expires_in: signed.expires_in.as_secs(),
    }))
}

/// Redirect to a freshly signed read URL.
#[tracing::instrument(skip(state, _uploader), fields(operation = "download_file"))]
pub async fn download_file(
    _uploader: Uploader,
    Path(fid): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ctx = state.request_context();
    let record = state.uploads.query_file(&ctx, &fid).await?;
    let signed = state.uploads.sign_read_url(&ctx, &record).await?;

    Ok(Redirect::temporary(&signed.url))
}
