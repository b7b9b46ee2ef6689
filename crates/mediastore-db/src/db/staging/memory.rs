use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mediastore_core::{AppError, StagingRecord};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{staging_key, StagingKey, StagingStore};

struct Entry {
    record: StagingRecord,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory staging store
///
/// Deadlines are measured on the tokio clock. Expired entries are dropped when next
/// touched or by [`MemoryStagingStore::purge_expired`].
#[derive(Clone)]
pub struct MemoryStagingStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    group: String,
}

impl MemoryStagingStore {
    pub fn new(group: &str) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            group: group.to_string(),
        }
    }

    /// Drop every expired entry and return how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl StagingStore for MemoryStagingStore {
    async fn create(&self, record: &StagingRecord, ttl: Duration) -> Result<(), AppError> {
        let key = staging_key(&self.group, &StagingKey::for_record(record));
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        if let Some(existing) = entries.get(&key) {
            if !existing.is_expired(now) {
                return Err(AppError::FileAlreadyReserved(key));
            }
        }

        entries.insert(
            key,
            Entry {
                record: record.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &StagingKey) -> Result<StagingRecord, AppError> {
        let store_key = staging_key(&self.group, key);
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get(&store_key) {
            Some(entry) if !entry.is_expired(now) => Ok(entry.record.clone()),
            Some(_) => {
                entries.remove(&store_key);
                Err(AppError::NoStagingRecord(key.fid.clone()))
            }
            None => Err(AppError::NoStagingRecord(key.fid.clone())),
        }
    }

    async fn delete(&self, key: &StagingKey) -> Result<(), AppError> {
        let store_key = staging_key(&self.group, key);
        self.entries.lock().await.remove(&store_key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediastore_core::{Collection, MetaData};

    const TTL: Duration = Duration::from_secs(3600);

    fn record(fid: &str) -> StagingRecord {
        StagingRecord {
            fid: fid.to_string(),
            file_name: "a.jpg".to_string(),
            content_md5: None,
            content_type: "image/jpeg".to_string(),
            content_length: 100,
            uploader: Some("alice".to_string()),
            meta_data: MetaData::new(),
            collection: Collection::default_collection(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryStagingStore::new("default");
        let rec = record("v1-a");
        store.create(&rec, TTL).await.unwrap();

        let fetched = store.get(&StagingKey::for_record(&rec)).await.unwrap();
        assert_eq!(fetched, rec);
    }

    #[tokio::test]
    async fn test_duplicate_reservation_rejected() {
        let store = MemoryStagingStore::new("default");
        let rec = record("v1-a");
        store.create(&rec, TTL).await.unwrap();

        let second = store.create(&rec, TTL).await;
        match second {
            Err(AppError::FileAlreadyReserved(key)) => {
                assert_eq!(key, "media_storage:default:file:default:default:v1-a:prepare")
            }
            other => panic!("expected FileAlreadyReserved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_same_fid_in_other_collection_is_independent() {
        let store = MemoryStagingStore::new("default");
        let rec = record("v1-a");
        let mut other = record("v1-a");
        other.collection.collection_id = "bi_other".to_string();

        store.create(&rec, TTL).await.unwrap();
        store.create(&other, TTL).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let store = MemoryStagingStore::new("default");
        let rec = record("v1-a");
        let key = StagingKey::for_record(&rec);
        store.create(&rec, TTL).await.unwrap();

        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert!(store.get(&key).await.is_ok());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(matches!(
            store.get(&key).await,
            Err(AppError::NoStagingRecord(_))
        ));

        // An expired reservation does not block a new one.
        store.create(&rec, TTL).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = MemoryStagingStore::new("default");
        store.create(&record("v1-a"), Duration::from_secs(10)).await.unwrap();
        store.create(&record("v1-b"), TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = MemoryStagingStore::new("default");
        let key = StagingKey::new("default", "default", "v1-none");
        assert!(store.delete(&key).await.is_ok());
        assert!(store.is_empty().await);
    }
}
