use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mediastore_core::{AppError, Collection, MetaData, Permission, Repository};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tokio::sync::Mutex;

/// Persistence for repositories and collections.
///
/// Inserts are write-if-absent: they report whether a row was written and never modify
/// an existing entity.
#[async_trait]
pub trait NamespaceStore: Send + Sync {
    /// Insert unless the identifier exists. Returns `true` when the row was written.
    async fn insert_repository(&self, repository: &Repository) -> Result<bool, AppError>;

    async fn find_repository(&self, repository_id: &str) -> Result<Option<Repository>, AppError>;

    /// Insert unless the identifier exists. Returns `true` when the row was written.
    async fn insert_collection(&self, collection: &Collection) -> Result<bool, AppError>;

    async fn find_collection(&self, collection_id: &str) -> Result<Option<Collection>, AppError>;
}

/// Postgres-backed namespace store
#[derive(Clone)]
pub struct PgNamespaceStore {
    pool: PgPool,
}

impl PgNamespaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repository_from_row(row: &PgRow) -> Result<Repository, AppError> {
        let permission: String = row.try_get("permission")?;
        let meta_data: Json<MetaData> = row.try_get("meta_data")?;

        Ok(Repository {
            repository_id: row.try_get("repository_id")?,
            name: row.try_get("name")?,
            permission: permission.parse::<Permission>()?,
            permission_hook: row.try_get("permission_hook")?,
            meta_data: meta_data.0,
        })
    }

    fn collection_from_row(row: &PgRow) -> Result<Collection, AppError> {
        let meta_data: Json<MetaData> = row.try_get("meta_data")?;

        Ok(Collection {
            collection_id: row.try_get("collection_id")?,
            name: row.try_get("name")?,
            file_count: row.try_get("file_count")?,
            space_used: row.try_get("space_used")?,
            meta_data: meta_data.0,
            repository_id: row.try_get("repository_id")?,
        })
    }
}

#[async_trait]
impl NamespaceStore for PgNamespaceStore {
    #[tracing::instrument(skip(self, repository), fields(db.table = "repositories", db.operation = "insert", db.record_id = %repository.repository_id))]
    async fn insert_repository(&self, repository: &Repository) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO repositories (repository_id, name, permission, permission_hook, meta_data)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (repository_id) DO NOTHING
            "#,
        )
        .bind(&repository.repository_id)
        .bind(&repository.name)
        .bind(repository.permission.as_str())
        .bind(&repository.permission_hook)
        .bind(Json(&repository.meta_data))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self), fields(db.table = "repositories", db.operation = "select"))]
    async fn find_repository(&self, repository_id: &str) -> Result<Option<Repository>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT repository_id, name, permission, permission_hook, meta_data
            FROM repositories
            WHERE repository_id = $1
            "#,
        )
        .bind(repository_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::repository_from_row).transpose()
    }

    #[tracing::instrument(skip(self, collection), fields(db.table = "collections", db.operation = "insert", db.record_id = %collection.collection_id))]
    async fn insert_collection(&self, collection: &Collection) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO collections (collection_id, name, file_count, space_used, meta_data, repository_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (collection_id) DO NOTHING
            "#,
        )
        .bind(&collection.collection_id)
        .bind(&collection.name)
        .bind(collection.file_count)
        .bind(collection.space_used)
        .bind(Json(&collection.meta_data))
        .bind(&collection.repository_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self), fields(db.table = "collections", db.operation = "select"))]
    async fn find_collection(&self, collection_id: &str) -> Result<Option<Collection>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT collection_id, name, file_count, space_used, meta_data, repository_id
            FROM collections
            WHERE collection_id = $1
            "#,
        )
        .bind(collection_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::collection_from_row).transpose()
    }
}

/// In-memory namespace store
#[derive(Clone, Default)]
pub struct MemoryNamespaceStore {
    repositories: Arc<Mutex<HashMap<String, Repository>>>,
    collections: Arc<Mutex<HashMap<String, Collection>>>,
}

impl MemoryNamespaceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NamespaceStore for MemoryNamespaceStore {
    async fn insert_repository(&self, repository: &Repository) -> Result<bool, AppError> {
        let mut repositories = self.repositories.lock().await;
        if repositories.contains_key(&repository.repository_id) {
            return Ok(false);
        }
        repositories.insert(repository.repository_id.clone(), repository.clone());
        Ok(true)
    }

    async fn find_repository(&self, repository_id: &str) -> Result<Option<Repository>, AppError> {
        Ok(self.repositories.lock().await.get(repository_id).cloned())
    }

    async fn insert_collection(&self, collection: &Collection) -> Result<bool, AppError> {
        let mut collections = self.collections.lock().await;
        if collections.contains_key(&collection.collection_id) {
            return Ok(false);
        }
        collections.insert(collection.collection_id.clone(), collection.clone());
        Ok(true)
    }

    async fn find_collection(&self, collection_id: &str) -> Result<Option<Collection>, AppError> {
        Ok(self.collections.lock().await.get(collection_id).cloned())
    }
}
