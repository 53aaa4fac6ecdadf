//! Filesystem access for the gateway.
//!
//! Handlers only talk to the [`Storage`] trait; [`LocalStorage`] is the
//! implementation backed by the host filesystem.

mod copy;
mod error;
mod local;
mod traits;

pub use copy::copy_chunked;
pub use error::{StorageError, StorageResult};
pub use local::LocalStorage;
pub use traits::{DirEntry, EntryMetadata, FileReader, Storage};
