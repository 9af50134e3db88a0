use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{KeyValueStore, PersistenceError};

/// In-process backend. Contents live as long as the last clone.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. with a collection from a previous session.
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.write().insert(key.into(), value.into());
        self
    }

    /// Synchronous peek at a stored value.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.inner.read().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.inner.write().insert(key.to_string(), value);
        Ok(())
    }
}
