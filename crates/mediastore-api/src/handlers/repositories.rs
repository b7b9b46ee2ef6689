//! Repository creation and lookup.

use crate::auth::Uploader;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use mediastore_core::{NewRepository, Repository};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct CreateRepositoryResponse {
    pub repository_id: String,
    pub repository: Repository,
}

#[tracing::instrument(skip(state, uploader, request), fields(operation = "create_repository", uploader = %uploader.id))]
pub async fn create_repository(
    uploader: Uploader,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<NewRepository>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ctx = state.request_context();
    let repository = state.namespaces.create_repository(&ctx, request).await?;

    Ok(Json(CreateRepositoryResponse {
        repository_id: repository.repository_id.clone(),
        repository,
    }))
}

#[tracing::instrument(skip(state, _uploader), fields(operation = "get_repository"))]
pub async fn get_repository(
    _uploader: Uploader,
    Path(repository_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ctx = state.request_context();
    let repository = state.namespaces.get_repository(&ctx, &repository_id).await?;
    Ok(Json(repository))
}
