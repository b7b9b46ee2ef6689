//! Error types module
//!
//! All mediastore errors are unified under the `AppError` enum. Each variant describes
//! how it is presented to clients through the `ErrorMetadata` trait.
//!
//! The `Database` variant wraps `sqlx::Error` when the `sqlx` feature is enabled and a
//! plain message otherwise.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FILE_NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Numeric sub code understood by existing media clients
    fn sub_code(&self) -> u32;

    /// Whether this error is recoverable (can be retried or corrected by the caller)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Sub codes shared with media clients.
pub mod sub_codes {
    pub const BAD_REQUEST: u32 = 400;
    pub const PERMISSION_DENY: u32 = 403;
    pub const INTERNAL_ERROR: u32 = 500;
    pub const FILE_EXIST: u32 = 20001;
    pub const NO_PREPARE_FILE_INFO: u32 = 20002;
    pub const FILE_NOT_EXIST: u32 = 20404;
    pub const BOX_NOT_EXIST: u32 = 30404;
    pub const DEPOT_NOT_EXIST: u32 = 40404;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No staging record: {0}")]
    NoStagingRecord(String),

    #[error("Staging key already reserved: {0}")]
    FileAlreadyReserved(String),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Operation cancelled during {0}")]
    Cancelled(String),

    #[error("Deadline exceeded during {0}")]
    DeadlineExceeded(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, sub_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    u32,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    use sub_codes::*;

    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            INTERNAL_ERROR,
            false,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::StoreUnavailable(_) => (
            500,
            "STORE_UNAVAILABLE",
            INTERNAL_ERROR,
            false,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            INTERNAL_ERROR,
            false,
            Some("Retry the data transfer; the reservation is still valid"),
            true,
            LogLevel::Error,
        ),
        AppError::SigningError(_) => (
            500,
            "SIGNING_ERROR",
            INTERNAL_ERROR,
            false,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            BAD_REQUEST,
            true,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            BAD_REQUEST,
            true,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingField(_) => (
            400,
            "MISSING_FIELD",
            BAD_REQUEST,
            true,
            Some("Provide the named field and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::RepositoryNotFound(_) => (
            404,
            "REPOSITORY_NOT_FOUND",
            DEPOT_NOT_EXIST,
            true,
            Some("Verify the repository ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::CollectionNotFound(_) => (
            404,
            "COLLECTION_NOT_FOUND",
            BOX_NOT_EXIST,
            true,
            Some("Verify the collection ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::FileNotFound(_) => (
            404,
            "FILE_NOT_FOUND",
            FILE_NOT_EXIST,
            true,
            Some("Verify the file ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::NoStagingRecord(_) => (
            404,
            "NO_STAGING_RECORD",
            NO_PREPARE_FILE_INFO,
            true,
            Some("Upload reservation expired or unknown, apply again"),
            false,
            LogLevel::Debug,
        ),
        AppError::FileAlreadyReserved(_) | AppError::FileExists(_) => (
            409,
            "FILE_EXISTS",
            FILE_EXIST,
            true,
            Some("Apply again with a new file identifier"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            BAD_REQUEST,
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Cancelled(_) => (
            499,
            "CANCELLED",
            INTERNAL_ERROR,
            true,
            None,
            false,
            LogLevel::Warn,
        ),
        AppError::DeadlineExceeded(_) => (
            504,
            "DEADLINE_EXCEEDED",
            INTERNAL_ERROR,
            true,
            Some("Retry with a smaller payload or a longer timeout"),
            false,
            LogLevel::Warn,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            PERMISSION_DENY,
            false,
            Some("Check authentication token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            INTERNAL_ERROR,
            false,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::StoreUnavailable(_) => "StoreUnavailable",
            AppError::Storage(_) => "Storage",
            AppError::SigningError(_) => "SigningError",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::MissingField(_) => "MissingField",
            AppError::RepositoryNotFound(_) => "RepositoryNotFound",
            AppError::CollectionNotFound(_) => "CollectionNotFound",
            AppError::FileNotFound(_) => "FileNotFound",
            AppError::NoStagingRecord(_) => "NoStagingRecord",
            AppError::FileAlreadyReserved(_) => "FileAlreadyReserved",
            AppError::FileExists(_) => "FileExists",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Cancelled(_) => "Cancelled",
            AppError::DeadlineExceeded(_) => "DeadlineExceeded",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Whether this error reports that something does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::RepositoryNotFound(_)
                | AppError::CollectionNotFound(_)
                | AppError::FileNotFound(_)
                | AppError::NoStagingRecord(_)
        )
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn sub_code(&self) -> u32 {
        app_error_static_metadata(self).2
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).4
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).5
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).6
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::StoreUnavailable(_) => "Failed to access metadata store".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::SigningError(_) => "Failed to sign read URL".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::MissingField(field) => format!("Missing required field: {}", field),
            AppError::RepositoryNotFound(id) => format!("Repository not found: {}", id),
            AppError::CollectionNotFound(id) => format!("Collection not found: {}", id),
            AppError::FileNotFound(fid) => format!("File not found: {}", fid),
            AppError::NoStagingRecord(fid) => {
                format!("No upload reservation for {}, it may have expired", fid)
            }
            AppError::FileAlreadyReserved(fid) | AppError::FileExists(fid) => {
                format!("File already exists: {}", fid)
            }
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Cancelled(_) => "Request cancelled".to_string(),
            AppError::DeadlineExceeded(_) => "Request deadline exceeded".to_string(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
