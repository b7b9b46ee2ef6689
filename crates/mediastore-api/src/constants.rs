//! API constants

/// Versioned API prefix.
pub const API_PREFIX: &str = "/api/v1";

/// Media routes live under `{API_PREFIX}{MEDIA_SCOPE}`.
pub const MEDIA_SCOPE: &str = "/media";

/// Public prefix for signed local object reads. Must match `LOCAL_STORAGE_BASE_URL`'s path.
pub const OBJECTS_PATH: &str = "/objects";

/// Multipart field carrying the object body in single uploads.
pub const UPLOAD_FILE_FIELD: &str = "file";

/// Interval between sweeps of expired in-memory staging entries.
pub const STAGING_PURGE_INTERVAL_SECS: u64 = 60;

pub const SERVICE_NAME: &str = "mediastore";
