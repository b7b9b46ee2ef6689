//! Namespace registry: repositories and the collections inside them.

use std::sync::Arc;

use mediastore_core::{AppError, Collection, NewCollection, NewRepository, Repository};
use mediastore_db::NamespaceStore;

use crate::context::RequestContext;

/// Create and look up repositories and collections.
///
/// Creation is write-if-absent: creating an identifier that already exists succeeds and
/// returns the stored entity unchanged.
#[derive(Clone)]
pub struct NamespaceRegistry {
    store: Arc<dyn NamespaceStore>,
}

impl NamespaceRegistry {
    pub fn new(store: Arc<dyn NamespaceStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, ctx, request))]
    pub async fn create_repository(
        &self,
        ctx: &RequestContext,
        request: NewRepository,
    ) -> Result<Repository, AppError> {
        let repository = request.into_repository()?;

        ctx.run("create_repository", self.insert_repository(&repository))
            .await
    }

    pub async fn get_repository(
        &self,
        ctx: &RequestContext,
        repository_id: &str,
    ) -> Result<Repository, AppError> {
        if repository_id.is_empty() {
            return Err(AppError::RepositoryNotFound(repository_id.to_string()));
        }

        ctx.run("get_repository", self.find_repository(repository_id))
            .await
    }

    #[tracing::instrument(skip(self, ctx, request))]
    pub async fn create_collection(
        &self,
        ctx: &RequestContext,
        request: NewCollection,
    ) -> Result<Collection, AppError> {
        let collection = request.into_collection()?;

        ctx.run("create_collection", self.insert_collection(&collection))
            .await
    }

    pub async fn get_collection(
        &self,
        ctx: &RequestContext,
        collection_id: &str,
    ) -> Result<Collection, AppError> {
        ctx.run("get_collection", self.find_collection(collection_id))
            .await
    }

    /// Collection lookup for callers that already drive the request context themselves.
    pub(crate) async fn find_collection(&self, collection_id: &str) -> Result<Collection, AppError> {
        if collection_id.is_empty() {
            return Err(AppError::CollectionNotFound(collection_id.to_string()));
        }

        self.store
            .find_collection(collection_id)
            .await?
            .ok_or_else(|| AppError::CollectionNotFound(collection_id.to_string()))
    }

    async fn insert_repository(&self, repository: &Repository) -> Result<Repository, AppError> {
        if self.store.insert_repository(repository).await? {
            tracing::info!(
                repository_id = %repository.repository_id,
                permission = %repository.permission,
                "Repository created"
            );
            return Ok(repository.clone());
        }

        tracing::debug!(
            repository_id = %repository.repository_id,
            "Repository already exists, returning stored entity"
        );
        Ok(self
            .store
            .find_repository(&repository.repository_id)
            .await?
            .unwrap_or_else(|| repository.clone()))
    }

    async fn find_repository(&self, repository_id: &str) -> Result<Repository, AppError> {
        self.store
            .find_repository(repository_id)
            .await?
            .ok_or_else(|| AppError::RepositoryNotFound(repository_id.to_string()))
    }

    async fn insert_collection(&self, collection: &Collection) -> Result<Collection, AppError> {
        if self.store.insert_collection(collection).await? {
            tracing::info!(
                collection_id = %collection.collection_id,
                repository_id = %collection.repository_id,
                "Collection created"
            );
            return Ok(collection.clone());
        }

        tracing::debug!(
            collection_id = %collection.collection_id,
            "Collection already exists, returning stored entity"
        );
        Ok(self
            .store
            .find_collection(&collection.collection_id)
            .await?
            .unwrap_or_else(|| collection.clone()))
    }

    /// Make sure the `default` repository and the `default` collection inside it exist.
    ///
    /// Run once at startup; an error here must abort the process.
    pub async fn ensure_defaults(&self) -> Result<(), AppError> {
        let repository = Repository::default_repository();
        if self.store.insert_repository(&repository).await? {
            tracing::info!("Created default repository");
        }

        let collection = Collection::default_collection();
        if self.store.insert_collection(&collection).await? {
            tracing::info!("Created default collection");
        }

        Ok(())
    }
}
