pub mod collection;
pub mod file;
pub mod repository;
pub mod upload_state;

use std::collections::BTreeMap;

/// Free-form, multi-valued metadata attached to namespaces and files.
pub type MetaData = BTreeMap<String, Vec<String>>;

pub use collection::{Collection, NewCollection};
pub use file::{FileRecord, FinalizeOverrides, InitUpload, StagingRecord};
pub use repository::{NewRepository, Permission, Repository};
pub use upload_state::UploadState;
