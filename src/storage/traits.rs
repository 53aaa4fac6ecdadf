//! Storage trait definitions.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::StorageResult;

/// Readable handle over a stored file's contents.
pub type FileReader = Pin<Box<dyn AsyncRead + Send>>;

/// Metadata about a stored entry.
#[derive(Debug, Clone)]
pub struct EntryMetadata {
    /// Size in bytes.
    pub size: u64,
    /// Whether this is a directory.
    pub is_dir: bool,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            name: name.into(),
            size,
            modified,
        }
    }
}

/// Storage trait for file operations.
///
/// All paths are relative to the base directory the implementation was
/// built with. Not-found conditions are reported as
/// [`StorageError::NotFound`](super::StorageError::NotFound) so callers
/// can tell them apart from other OS failures.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Base directory every relative path resolves against.
    fn root(&self) -> &Path;

    /// Resolve a relative path to an absolute one under the root.
    fn resolve(&self, path: &str) -> StorageResult<PathBuf>;

    /// Get metadata for a path.
    async fn metadata(&self, path: &str) -> StorageResult<EntryMetadata>;

    /// List the immediate children of a directory.
    async fn list(&self, path: &str) -> StorageResult<Vec<DirEntry>>;

    /// Open a file for streaming reads.
    async fn open(&self, path: &str) -> StorageResult<FileReader>;

    /// Write a new file, creating missing parent directories.
    ///
    /// Fails with `AlreadyExists` if anything occupies the path.
    /// Returns the number of bytes written.
    async fn create(&self, path: &str, payload: &mut (dyn AsyncRead + Send + Unpin)) -> StorageResult<u64>;

    /// Overwrite an existing entry. Fails with `NotFound` if nothing is there.
    async fn update(&self, path: &str, payload: &mut (dyn AsyncRead + Send + Unpin)) -> StorageResult<u64>;

    /// Remove a plain file.
    ///
    /// A missing path is `NotFound`; any other refusal is `NotAFile`.
    async fn remove_file(&self, path: &str) -> StorageResult<()>;
}
