//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object store backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use mediastore_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Body of an object being written, consumed chunk by chunk.
pub type ByteStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

/// Storage abstraction trait
///
/// Keys are produced by [`crate::object_key`]. Backends never invent keys of their own.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write an object from a stream and return the number of bytes stored.
    ///
    /// A failing stream or backend aborts the write; no partial object is left behind.
    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        body: ByteStream<'_>,
    ) -> StorageResult<u64>;

    /// Write an object held in memory.
    async fn put_bytes(&self, key: &str, content_type: &str, data: Bytes) -> StorageResult<u64> {
        let body = futures::stream::once(async move { Ok(data) }).boxed();
        self.put_stream(key, content_type, body).await
    }

    /// Read a whole object.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Time-limited URL granting read access to an object without credentials.
    async fn signed_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::FileNotFound(key),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::SigningFailed(msg) => AppError::SigningError(msg),
            StorageError::InvalidSignature(msg) => AppError::Unauthorized(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        assert!(matches!(
            AppError::from(StorageError::SigningFailed("no credentials".into())),
            AppError::SigningError(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::NotFound("a/b/c".into())),
            AppError::FileNotFound(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::UploadFailed("broken pipe".into())),
            AppError::Storage(_)
        ));
    }
}
