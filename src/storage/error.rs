//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File or directory not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Path already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Path exists but cannot be removed as a plain file.
    #[error("not a file: {path}")]
    NotAFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Path would resolve outside the base directory.
    #[error("path is outside the base directory: {0}")]
    PathTraversal(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether a stat or open failure means nothing exists at the path.
///
/// Besides a plain missing entry this covers a parent that is a regular file
/// and a name the filesystem cannot hold.
pub(crate) fn is_missing(err: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    matches!(
        err.kind(),
        ErrorKind::NotFound | ErrorKind::NotADirectory | ErrorKind::InvalidFilename
    )
}

impl StorageError {
    /// Map an IO error, classifying a missing entry as `NotFound`.
    pub(crate) fn from_io(path: &str, err: std::io::Error) -> Self {
        if is_missing(&err) {
            StorageError::NotFound(path.to_string())
        } else {
            StorageError::Io(err)
        }
    }
}
