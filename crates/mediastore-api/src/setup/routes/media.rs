use crate::handlers::{collections, files, repositories};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Authenticated routes, mounted under `/api/v1/media`.
pub(super) fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/repositories", post(repositories::create_repository))
        .route("/repositories/{id}", get(repositories::get_repository))
        .route("/collections", post(collections::create_collection))
        .route("/collections/{id}", get(collections::get_collection))
        .route("/upload/apply", post(files::apply_upload))
        .route("/upload/single/{fid}", post(files::single_upload))
        .route("/files/{fid}", get(files::download_file))
        .route("/files/{fid}/info", get(files::get_file_info))
        .route("/files/{fid}/url", get(files::get_file_url))
}
