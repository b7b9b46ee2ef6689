//! mediastore storage library
//!
//! Object store adapter: the `Storage` trait with S3 and local filesystem backends.
//!
//! # Object key format
//!
//! Every object lives under `{repository_id}/{collection_id}/{fid}`. The key is derived
//! from the file record alone and is the only addressing scheme, so all backends use
//! [`object_key`] to build it.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::object_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mediastore_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signing::UrlSigner;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
