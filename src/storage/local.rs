//! Local filesystem storage implementation.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};

use super::error::is_missing;
use super::{DirEntry, EntryMetadata, FileReader, Storage, StorageError, StorageResult, copy_chunked};

const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Local filesystem storage implementation.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Base directory for storage.
    base_path: PathBuf,
    /// Buffer size used when copying uploads to disk.
    chunk_size: usize,
}

impl LocalStorage {
    /// Create a new local storage instance.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the copy buffer size for uploads.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// Join `relative` onto `root`.
///
/// A single leading `/` is dropped so the path stays relative. Whatever is
/// left must consist of plain names: `..`, a second root separator or a
/// drive prefix would leave `root`, so those are rejected.
fn resolve_path(root: &Path, relative: &str) -> StorageResult<PathBuf> {
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    let mut result = root.to_path_buf();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(name) => result.push(name),
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                warn!("Rejected path escaping base directory: {:?}", relative);
                return Err(StorageError::PathTraversal(relative.to_string()));
            }
        }
    }

    Ok(result)
}

#[async_trait]
impl Storage for LocalStorage {
    fn root(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        resolve_path(&self.base_path, path)
    }

    async fn metadata(&self, path: &str) -> StorageResult<EntryMetadata> {
        let full_path = self.resolve(path)?;
        let meta = fs::metadata(&full_path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;

        Ok(EntryMetadata {
            size: meta.len(),
            is_dir: meta.is_dir(),
        })
    }

    async fn list(&self, path: &str) -> StorageResult<Vec<DirEntry>> {
        let full_path = self.resolve(path)?;
        let mut read_dir = fs::read_dir(&full_path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            // Follow symlinks so size and mtime describe the target.
            let meta = fs::metadata(entry.path()).await?;
            entries.push(DirEntry::new(
                entry.file_name().to_string_lossy(),
                meta.len(),
                meta.modified().ok(),
            ));
        }

        debug!("Listed {} entries in {}", entries.len(), full_path.display());
        Ok(entries)
    }

    async fn open(&self, path: &str) -> StorageResult<FileReader> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        Ok(Box::pin(file))
    }

    async fn create(
        &self,
        path: &str,
        payload: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<u64> {
        let full_path = self.resolve(path)?;

        match fs::metadata(&full_path).await {
            Ok(_) => return Err(StorageError::AlreadyExists(path.to_string())),
            Err(e) if is_missing(&e) => {}
            Err(e) => return Err(StorageError::Io(e)),
        }

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(path.to_string())
                } else {
                    StorageError::Io(e)
                }
            })?;

        let written = copy_chunked(payload, &mut file, self.chunk_size).await?;
        file.flush().await?;

        debug!("Created {} ({} bytes)", full_path.display(), written);
        Ok(written)
    }

    async fn update(
        &self,
        path: &str,
        payload: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<u64> {
        let full_path = self.resolve(path)?;

        fs::metadata(&full_path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&full_path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;

        let written = copy_chunked(payload, &mut file, self.chunk_size).await?;
        file.flush().await?;

        debug!("Updated {} ({} bytes)", full_path.display(), written);
        Ok(written)
    }

    async fn remove_file(&self, path: &str) -> StorageResult<()> {
        let full_path = self.resolve(path)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!("Deleted {}", full_path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(StorageError::NotAFile {
                path: path.to_string(),
                source: e,
            }),
        }
    }
}
