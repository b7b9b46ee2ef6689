use std::time::Duration;

use async_trait::async_trait;
use mediastore_core::{AppError, StagingRecord};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};

use super::{staging_key, StagingKey, StagingStore};

/// Redis-backed staging store
///
/// Reservations are `SET key value NX EX ttl`, so expiry is handled by Redis itself.
#[derive(Clone)]
pub struct RedisStagingStore {
    manager: ConnectionManager,
    group: String,
}

impl RedisStagingStore {
    /// Connect to Redis at `url`; keys are namespaced by `group`.
    pub async fn new(url: &str, group: &str) -> Result<Self, AppError> {
        let client = Client::open(url)
            .map_err(|e| AppError::StoreUnavailable(format!("Invalid Redis URL: {}", e)))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Redis connection failed: {}", e)))?;

        Ok(Self {
            manager,
            group: group.to_string(),
        })
    }
}

#[async_trait]
impl StagingStore for RedisStagingStore {
    #[tracing::instrument(skip(self, record), fields(fid = %record.fid, ttl_secs = ttl.as_secs()))]
    async fn create(&self, record: &StagingRecord, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let key = staging_key(&self.group, &StagingKey::for_record(record));
        let value = serde_json::to_string(record)?;

        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Redis SET NX failed: {}", e)))?;

        match reply {
            Some(_) => Ok(()),
            None => Err(AppError::FileAlreadyReserved(key)),
        }
    }

    #[tracing::instrument(skip(self), fields(fid = %key.fid))]
    async fn get(&self, key: &StagingKey) -> Result<StagingRecord, AppError> {
        let mut conn = self.manager.clone();
        let redis_key = staging_key(&self.group, key);

        let result: RedisResult<Option<String>> = conn.get(&redis_key).await;
        let value = result
            .map_err(|e| AppError::StoreUnavailable(format!("Redis GET failed: {}", e)))?
            .ok_or_else(|| AppError::NoStagingRecord(key.fid.clone()))?;

        serde_json::from_str(&value).map_err(|e| {
            AppError::Internal(format!("Corrupt staging record {}: {}", redis_key, e))
        })
    }

    #[tracing::instrument(skip(self), fields(fid = %key.fid))]
    async fn delete(&self, key: &StagingKey) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let redis_key = staging_key(&self.group, key);

        conn.del::<_, ()>(&redis_key)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Redis DEL failed: {}", e)))
    }
}
