//! Minimal HTTP file manager.
//!
//! Exposes one directory tree over HTTP: list directories, read files,
//! upload, overwrite and delete files, all addressed by a path relative to
//! a base directory fixed at construction.

pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod routes;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

pub use config::Config;
pub use error::GatewayError;
pub use routes::router;
pub use storage::{LocalStorage, Storage, StorageError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Filesystem rooted at the base directory
    pub storage: Arc<dyn Storage>,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState with the given base directory and default config.
    pub fn new(root_dir: PathBuf) -> Self {
        Self::with_config(root_dir, Config::default())
    }

    /// Create a new AppState with the given base directory and config.
    pub fn with_config(root_dir: PathBuf, config: Config) -> Self {
        let storage = LocalStorage::new(root_dir).with_chunk_size(config.chunk_size);
        Self {
            storage: Arc::new(storage),
            config: Arc::new(config),
        }
    }
}
