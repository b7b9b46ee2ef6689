//! Route configuration and setup.
//!
//! Media routes live in [media](media); everything else is registered here.

mod media;

use crate::auth::JwtVerifier;
use crate::constants::{API_PREFIX, MEDIA_SCOPE, OBJECTS_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use mediastore_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let verifier = Arc::new(JwtVerifier::new(config.jwt_secret()));

    let public_routes = public_routes();
    let protected_routes = Router::new()
        .nest(&format!("{}{}", API_PREFIX, MEDIA_SCOPE), media::media_routes())
        .layer(axum::middleware::from_fn_with_state(
            verifier,
            crate::auth::middleware::auth_middleware,
        ));

    let http_concurrency_limit = config.http_concurrency_limit();

    tracing::info!(
        http_concurrency_limit,
        max_upload_size_bytes = config.max_upload_size_bytes(),
        request_timeout_secs = config.request_timeout().as_secs(),
        "HTTP limits configured"
    );

    let app = public_routes
        .merge(protected_routes)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            &format!("{}/{{*key}}", OBJECTS_PATH),
            get(handlers::objects::get_signed_object),
        )
}
