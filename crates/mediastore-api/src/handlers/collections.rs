//! Collection creation and lookup.

use crate::auth::Uploader;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use mediastore_core::{Collection, NewCollection};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct CreateCollectionResponse {
    pub collection_id: String,
    pub collection: Collection,
}

#[tracing::instrument(skip(state, uploader, request), fields(operation = "create_collection", uploader = %uploader.id))]
pub async fn create_collection(
    uploader: Uploader,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<NewCollection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ctx = state.request_context();
    let collection = state.namespaces.create_collection(&ctx, request).await?;

    Ok(Json(CreateCollectionResponse {
        collection_id: collection.collection_id.clone(),
        collection,
    }))
}

#[tracing::instrument(skip(state, _uploader), fields(operation = "get_collection"))]
pub async fn get_collection(
    _uploader: Uploader,
    Path(collection_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ctx = state.request_context();
    let collection = state.namespaces.get_collection(&ctx, &collection_id).await?;
    Ok(Json(collection))
}
