use serde::{Deserialize, Serialize};

use super::MetaData;
use crate::constants::{DEFAULT_COLLECTION_ID, DEFAULT_NAMESPACE_NAME, DEFAULT_REPOSITORY_ID};
use crate::error::AppError;
use crate::ids::{new_collection_id, validate_identifier};

/// Named subdivision of a repository.
///
/// `file_count` and `space_used` are carried as data. No operation maintains them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub collection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_used: Option<i64>,
    #[serde(default)]
    pub meta_data: MetaData,
    pub repository_id: String,
}

impl Collection {
    /// The collection created by the startup self-check, bound to the default repository.
    pub fn default_collection() -> Self {
        Collection {
            collection_id: DEFAULT_COLLECTION_ID.to_string(),
            name: Some(DEFAULT_NAMESPACE_NAME.to_string()),
            file_count: None,
            space_used: None,
            meta_data: MetaData::new(),
            repository_id: DEFAULT_REPOSITORY_ID.to_string(),
        }
    }
}

/// Collection creation request. Every attribute may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCollection {
    #[serde(default, alias = "box_id")]
    pub collection_id: Option<String>,
    #[serde(default, alias = "box_name")]
    pub name: Option<String>,
    #[serde(default, alias = "file_number")]
    pub file_count: Option<i64>,
    #[serde(default)]
    pub space_used: Option<i64>,
    #[serde(default)]
    pub meta_data: Option<MetaData>,
    #[serde(default, alias = "depot_id")]
    pub repository_id: Option<String>,
}

impl NewCollection {
    /// Fill defaults: a fresh `bi_` identifier when absent or empty and the `default`
    /// repository when no repository is named. Supplied identifiers must pass
    /// [`validate_identifier`].
    pub fn into_collection(self) -> Result<Collection, AppError> {
        let collection_id = match self.collection_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                validate_identifier("collection_id", &id)?;
                id
            }
            None => new_collection_id(),
        };
        let repository_id = match self.repository_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                validate_identifier("repository_id", &id)?;
                id
            }
            None => DEFAULT_REPOSITORY_ID.to_string(),
        };

        Ok(Collection {
            collection_id,
            name: self.name,
            file_count: self.file_count,
            space_used: self.space_used,
            meta_data: self.meta_data.unwrap_or_default(),
            repository_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_collection_defaults_to_default_repository() {
        let col = NewCollection::default().into_collection().unwrap();
        assert!(col.collection_id.starts_with("bi_"));
        assert_eq!(col.repository_id, "default");
        assert!(col.file_count.is_none());
    }

    #[test]
    fn test_nested_collection_identifier_rejected() {
        let result = NewCollection {
            collection_id: Some("a/b".to_string()),
            ..Default::default()
        }
        .into_collection();
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let result = NewCollection {
            collection_id: Some("bi_ok".to_string()),
            repository_id: Some("media:prod".to_string()),
            ..Default::default()
        }
        .into_collection();
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_default_collection_binding() {
        let col = Collection::default_collection();
        assert_eq!(col.collection_id, "default");
        assert_eq!(col.repository_id, "default");
        assert_eq!(col.name.as_deref(), Some("default"));
    }

    #[test]
    fn test_absent_counters_are_not_serialized() {
        let json = serde_json::to_value(Collection::default_collection()).unwrap();
        assert!(json.get("file_count").is_none());
        assert!(json.get("space_used").is_none());
        assert_eq!(json["repository_id"], "default");
    }
}
