//! Mediastore Services Layer
//!
//! Business services sitting between the HTTP surface and the stores: the namespace
//! registry, the file index and the upload coordinator. The API crate depends on this
//! facade only; store and storage types are re-exported for wiring.

pub mod context;
pub mod file_index;
pub mod namespace;
pub mod upload;

pub use context::RequestContext;
pub use file_index::{FileIndex, FinalizeOutcome};
pub use namespace::NamespaceRegistry;
pub use upload::{SignedUrl, UploadCoordinator, UploadSettings, UploadStep};

pub use mediastore_db::{
    FileIndexStore, MemoryFileIndexStore, MemoryNamespaceStore, MemoryStagingStore,
    NamespaceStore, PgFileIndexStore, PgNamespaceStore, RedisStagingStore, StagingKey,
    StagingStore,
};
pub use mediastore_storage::{
    create_storage, object_key, ByteStream, Storage, StorageBackend, StorageError, StorageResult,
    UrlSigner,
};
#[cfg(feature = "storage-local")]
pub use mediastore_storage::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use mediastore_storage::S3Storage;
