//! mediastore data layer
//!
//! Stores behind the namespace registry, the upload staging area and the file index.
//! Each store is a trait with a durable backend (Postgres or Redis) and a process-local
//! in-memory backend for development and tests.

pub mod db;

pub use db::file_index::{FileIndexStore, MemoryFileIndexStore, PgFileIndexStore};
pub use db::namespace::{MemoryNamespaceStore, NamespaceStore, PgNamespaceStore};
pub use db::staging::{
    staging_key, MemoryStagingStore, RedisStagingStore, StagingKey, StagingStore,
};
