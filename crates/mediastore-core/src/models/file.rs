use serde::{Deserialize, Serialize};

use super::{Collection, MetaData};
use crate::constants::DEFAULT_COLLECTION_ID;
use crate::error::AppError;
use crate::ids::validate_identifier;

/// Upload reservation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitUpload {
    /// Client-supplied identifier. A fresh one is generated when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fid: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_length: Option<i64>,
    #[serde(default)]
    pub content_md5: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub header: MetaData,
    #[serde(default)]
    pub uploader: Option<String>,
    /// Target collection, `default` when unset.
    #[serde(default, alias = "box_id")]
    pub collection_id: Option<String>,
}

/// An [`InitUpload`] whose required fields are known to be present.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub fid: Option<String>,
    pub file_name: String,
    pub content_length: i64,
    pub content_md5: Option<String>,
    pub content_type: String,
    pub header: MetaData,
    pub uploader: Option<String>,
    pub collection_id: String,
}

impl InitUpload {
    /// Check that file name, size and content type are present and that any supplied
    /// fid or collection identifier is well formed.
    pub fn validate(self) -> Result<ValidatedUpload, AppError> {
        let fid = self.fid.filter(|fid| !fid.is_empty());
        if let Some(fid) = &fid {
            validate_identifier("fid", fid)?;
        }

        let file_name = self
            .file_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(AppError::MissingField("file_name"))?;

        let content_length = match self.content_length {
            None | Some(0) => return Err(AppError::MissingField("content_length")),
            Some(len) if len < 0 => {
                return Err(AppError::InvalidInput(format!(
                    "content_length must be positive, got {}",
                    len
                )))
            }
            Some(len) => len,
        };

        let content_type = self
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .ok_or(AppError::MissingField("content_type"))?;

        let collection_id = match self.collection_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                validate_identifier("collection_id", &id)?;
                id
            }
            None => DEFAULT_COLLECTION_ID.to_string(),
        };

        Ok(ValidatedUpload {
            fid,
            file_name,
            content_length,
            content_md5: self.content_md5,
            content_type,
            header: self.header,
            uploader: self.uploader,
            collection_id,
        })
    }
}

impl ValidatedUpload {
    pub fn into_staging_record(self, fid: String, collection: Collection) -> StagingRecord {
        StagingRecord {
            fid,
            file_name: self.file_name,
            content_md5: self.content_md5,
            content_type: self.content_type,
            content_length: self.content_length,
            uploader: self.uploader,
            meta_data: self.header,
            collection,
        }
    }
}

/// In-flight upload held by the staging store until finalize or expiry.
///
/// The target collection is embedded so finalize needs no second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingRecord {
    pub fid: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_md5: Option<String>,
    pub content_type: String,
    pub content_length: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(default)]
    pub meta_data: MetaData,
    pub collection: Collection,
}

impl StagingRecord {
    pub fn repository_id(&self) -> &str {
        &self.collection.repository_id
    }

    pub fn collection_id(&self) -> &str {
        &self.collection.collection_id
    }
}

/// Late-bound values applied when a staging record is promoted.
#[derive(Debug, Clone, Default)]
pub struct FinalizeOverrides {
    pub collection: Option<Collection>,
    pub meta_data: Option<MetaData>,
}

/// Durable record of a completed upload. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub fid: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_md5: Option<String>,
    pub content_type: String,
    pub content_length: i64,
    /// Unix seconds at which the upload was finalized.
    pub created_ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(default)]
    pub meta_data: MetaData,
    pub collection: Collection,
}

impl FileRecord {
    /// Copy a staging record, stamp `created_ts` and apply `overrides`.
    pub fn promote(staging: StagingRecord, created_ts: i64, overrides: FinalizeOverrides) -> Self {
        FileRecord {
            fid: staging.fid,
            file_name: staging.file_name,
            content_md5: staging.content_md5,
            content_type: staging.content_type,
            content_length: staging.content_length,
            created_ts,
            uploader: staging.uploader,
            meta_data: overrides.meta_data.unwrap_or(staging.meta_data),
            collection: overrides.collection.unwrap_or(staging.collection),
        }
    }

    pub fn repository_id(&self) -> &str {
        &self.collection.repository_id
    }

    pub fn collection_id(&self) -> &str {
        &self.collection.collection_id
    }
}
