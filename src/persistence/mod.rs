//! Key-value persistence backends and the ordered write queue.
//!
//! The store only ever talks to a backend through [`KeyValueStore`]:
//! read a serialized value by key, write one back.

mod file;
mod memory;
mod queue;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::cart::CodecError;
use crate::config::{StorageBackend, StorageConfig};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use queue::{PersistQueue, RetryPolicy, WriteAck};

/// Errors raised by persistence backends.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Persistence backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Async key-value store holding serialized text.
///
/// Implementations must apply writes for one key in the order they are
/// awaited; the store never issues two concurrent writes for the same key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the name of this backend for logging.
    fn name(&self) -> &'static str;

    /// Previously stored value, or `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Durably store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError>;
}

/// Build the backend selected in the storage config.
pub fn open_backend(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    match config.backend {
        StorageBackend::File => {
            let dir = config.data_dir();
            tracing::debug!(dir = %dir.display(), "Using file cart storage");
            Arc::new(FileStore::new(dir))
        }
        StorageBackend::Memory => {
            tracing::debug!("Using in-memory cart storage");
            Arc::new(MemoryStore::new())
        }
    }
}
