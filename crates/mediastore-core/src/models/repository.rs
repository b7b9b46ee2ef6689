use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MetaData;
use crate::constants::{DEFAULT_NAMESPACE_NAME, DEFAULT_REPOSITORY_ID};
use crate::error::AppError;
use crate::ids::{new_repository_id, validate_identifier};

/// Access tag of a repository. Stored with the repository, not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    #[default]
    Public,
    PublicRead,
    Private,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Public => "public",
            Permission::PublicRead => "public_read",
            Permission::Private => "private",
        }
    }
}

impl FromStr for Permission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Permission::Public),
            "public_read" => Ok(Permission::PublicRead),
            "private" => Ok(Permission::Private),
            _ => Err(anyhow::anyhow!("Invalid permission: {}", s)),
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Top-level namespace partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub repository_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub permission: Permission,
    /// Permission delegation hook (webhook URL or key-value reference). Stored only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_hook: Option<String>,
    #[serde(default)]
    pub meta_data: MetaData,
}

impl Repository {
    /// The repository created by the startup self-check.
    pub fn default_repository() -> Self {
        Repository {
            repository_id: DEFAULT_REPOSITORY_ID.to_string(),
            name: Some(DEFAULT_NAMESPACE_NAME.to_string()),
            permission: Permission::Public,
            permission_hook: None,
            meta_data: MetaData::new(),
        }
    }
}

/// Repository creation request. Every attribute may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRepository {
    #[serde(default, alias = "depot_id")]
    pub repository_id: Option<String>,
    #[serde(default, alias = "depot_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub permission: Option<Permission>,
    #[serde(default)]
    pub permission_hook: Option<String>,
    #[serde(default)]
    pub meta_data: Option<MetaData>,
}

impl NewRepository {
    /// Fill defaults: a fresh `di_` identifier when absent or empty, `public` permission
    /// when unset and empty metadata. A supplied identifier must pass
    /// [`validate_identifier`].
    pub fn into_repository(self) -> Result<Repository, AppError> {
        let repository_id = match self.repository_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                validate_identifier("repository_id", &id)?;
                id
            }
            None => new_repository_id(),
        };

        Ok(Repository {
            repository_id,
            name: self.name,
            permission: self.permission.unwrap_or_default(),
            permission_hook: self.permission_hook,
            meta_data: self.meta_data.unwrap_or_default(),
        })
    }
}
