//! Upload staging store
//!
//! Holds reserved-but-not-finalized uploads. Every entry is created with an atomic
//! set-if-absent and carries a time-to-live; expired entries are indistinguishable
//! from entries that never existed.

mod memory;
mod redis_store;

pub use memory::MemoryStagingStore;
pub use redis_store::RedisStagingStore;

use std::time::Duration;

use async_trait::async_trait;
use mediastore_core::constants::STAGING_KEY_ROOT;
use mediastore_core::{AppError, StagingRecord};

/// Composite identity of a staging entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StagingKey {
    pub repository_id: String,
    pub collection_id: String,
    pub fid: String,
}

impl StagingKey {
    pub fn new(
        repository_id: impl Into<String>,
        collection_id: impl Into<String>,
        fid: impl Into<String>,
    ) -> Self {
        StagingKey {
            repository_id: repository_id.into(),
            collection_id: collection_id.into(),
            fid: fid.into(),
        }
    }

    pub fn for_record(record: &StagingRecord) -> Self {
        StagingKey::new(record.repository_id(), record.collection_id(), &record.fid)
    }
}

/// Store key: `media_storage:{group}:file:{repository}:{collection}:{fid}:prepare`.
pub fn staging_key(group: &str, key: &StagingKey) -> String {
    format!(
        "{}:{}:file:{}:{}:{}:prepare",
        STAGING_KEY_ROOT, group, key.repository_id, key.collection_id, key.fid
    )
}

#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Reserve `record` for `ttl`. Fails with `FileAlreadyReserved` when the key exists.
    async fn create(&self, record: &StagingRecord, ttl: Duration) -> Result<(), AppError>;

    /// Fails with `NoStagingRecord` when the entry is absent or expired.
    async fn get(&self, key: &StagingKey) -> Result<StagingRecord, AppError>;

    /// Remove an entry. Removing a missing entry succeeds.
    async fn delete(&self, key: &StagingKey) -> Result<(), AppError>;
}
