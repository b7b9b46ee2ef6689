//! File index: durable records of completed uploads.

use std::sync::Arc;

use chrono::Utc;
use mediastore_core::{AppError, FileRecord, FinalizeOverrides, StagingRecord};
use mediastore_db::FileIndexStore;

/// Result of promoting a staging record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The record was written by this call.
    Created(FileRecord),
    /// A record with the same fid already existed and is returned untouched.
    AlreadyFinalized(FileRecord),
}

impl FinalizeOutcome {
    pub fn record(&self) -> &FileRecord {
        match self {
            FinalizeOutcome::Created(record) | FinalizeOutcome::AlreadyFinalized(record) => {
                record
            }
        }
    }

    pub fn into_record(self) -> FileRecord {
        match self {
            FinalizeOutcome::Created(record) | FinalizeOutcome::AlreadyFinalized(record) => {
                record
            }
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, FinalizeOutcome::Created(_))
    }
}

#[derive(Clone)]
pub struct FileIndex {
    store: Arc<dyn FileIndexStore>,
}

impl FileIndex {
    pub fn new(store: Arc<dyn FileIndexStore>) -> Self {
        Self { store }
    }

    /// Promote `staging` into a permanent record stamped with the current time.
    ///
    /// Records are never overwritten. Finalizing a fid twice yields
    /// [`FinalizeOutcome::AlreadyFinalized`] with the first record.
    pub async fn finalize(
        &self,
        staging: StagingRecord,
        overrides: FinalizeOverrides,
    ) -> Result<FinalizeOutcome, AppError> {
        let record = FileRecord::promote(staging, Utc::now().timestamp(), overrides);

        if self.store.insert(&record).await? {
            tracing::info!(
                fid = %record.fid,
                collection_id = %record.collection_id(),
                content_length = record.content_length,
                "File record written"
            );
            return Ok(FinalizeOutcome::Created(record));
        }

        tracing::warn!(fid = %record.fid, "File already finalized, keeping existing record");
        let existing = self
            .store
            .find(&record.fid)
            .await?
            .unwrap_or(record);
        Ok(FinalizeOutcome::AlreadyFinalized(existing))
    }

    pub async fn get_file(&self, fid: &str) -> Result<FileRecord, AppError> {
        if fid.is_empty() {
            return Err(AppError::FileNotFound(fid.to_string()));
        }

        self.store
            .find(fid)
            .await?
            .ok_or_else(|| AppError::FileNotFound(fid.to_string()))
    }
}
