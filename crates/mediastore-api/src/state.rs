//! Application state shared by all handlers.

use mediastore_core::Config;
use mediastore_services::{
    NamespaceRegistry, RequestContext, Storage, UploadCoordinator, UrlSigner,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub namespaces: NamespaceRegistry,
    pub uploads: UploadCoordinator,
    pub storage: Arc<dyn Storage>,
    /// Present when objects are served by this process (local backend).
    pub url_signer: Option<UrlSigner>,
}

impl AppState {
    /// Context bounding the store and object calls of one request.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.config.request_timeout())
    }
}
