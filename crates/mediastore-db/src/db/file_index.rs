use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mediastore_core::{AppError, Collection, FileRecord, MetaData};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tokio::sync::Mutex;

/// Durable storage of finalized file records, keyed by fid.
#[async_trait]
pub trait FileIndexStore: Send + Sync {
    /// Insert unless a record with the same fid exists. Returns `true` when written.
    async fn insert(&self, record: &FileRecord) -> Result<bool, AppError>;

    async fn find(&self, fid: &str) -> Result<Option<FileRecord>, AppError>;
}

/// Postgres-backed file index
#[derive(Clone)]
pub struct PgFileIndexStore {
    pool: PgPool,
}

impl PgFileIndexStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &PgRow) -> Result<FileRecord, AppError> {
        let meta_data: Json<MetaData> = row.try_get("meta_data")?;
        let collection: Json<Collection> = row.try_get("collection")?;

        Ok(FileRecord {
            fid: row.try_get("fid")?,
            file_name: row.try_get("file_name")?,
            content_md5: row.try_get("content_md5")?,
            content_type: row.try_get("content_type")?,
            content_length: row.try_get("content_length")?,
            created_ts: row.try_get("created_ts")?,
            uploader: row.try_get("uploader")?,
            meta_data: meta_data.0,
            collection: collection.0,
        })
    }
}

#[async_trait]
impl FileIndexStore for PgFileIndexStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "files", db.operation = "insert", db.record_id = %record.fid))]
    async fn insert(&self, record: &FileRecord) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO files (
                fid, file_name, content_md5, content_type, content_length,
                created_ts, uploader, meta_data, repository_id, collection_id, collection
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (fid) DO NOTHING
            "#,
        )
        .bind(&record.fid)
        .bind(&record.file_name)
        .bind(&record.content_md5)
        .bind(&record.content_type)
        .bind(record.content_length)
        .bind(record.created_ts)
        .bind(&record.uploader)
        .bind(Json(&record.meta_data))
        .bind(record.repository_id())
        .bind(record.collection_id())
        .bind(Json(&record.collection))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn find(&self, fid: &str) -> Result<Option<FileRecord>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT fid, file_name, content_md5, content_type, content_length,
                   created_ts, uploader, meta_data, collection
            FROM files
            WHERE fid = $1
            "#,
        )
        .bind(fid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::record_from_row).transpose()
    }
}

/// In-memory file index
#[derive(Clone, Default)]
pub struct MemoryFileIndexStore {
    records: Arc<Mutex<HashMap<String, FileRecord>>>,
}

impl MemoryFileIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl FileIndexStore for MemoryFileIndexStore {
    async fn insert(&self, record: &FileRecord) -> Result<bool, AppError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.fid) {
            return Ok(false);
        }
        records.insert(record.fid.clone(), record.clone());
        Ok(true)
    }

    async fn find(&self, fid: &str) -> Result<Option<FileRecord>, AppError> {
        Ok(self.records.lock().await.get(fid).cloned())
    }
}
