//! Error types for hoard.

use thiserror::Error;

/// Common error type for hoard.
#[derive(Error, Debug)]
pub enum HoardError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The resource is in a state that forbids the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Object storage error.
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Metadata stripping failed.
    #[error("metadata stripping failed: {0}")]
    Exif(#[from] crate::exif::ExifError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for HoardError {
    fn from(e: sqlx::Error) -> Self {
        HoardError::Database(e.to_string())
    }
}

/// Result type alias for hoard operations.
pub type Result<T> = std::result::Result<T, HoardError>;
