//! mediastore core library
//!
//! Domain models, identifier generation, error types and configuration shared by
//! every mediastore crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    Collection, FileRecord, FinalizeOverrides, InitUpload, MetaData, NewCollection,
    NewRepository, Permission, Repository, StagingRecord, UploadState,
};
pub use storage_types::{MetadataBackend, StagingBackend, StorageBackend};
