//! Shared test utilities and mock backends.

#![allow(dead_code, unused_imports)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cartstore::persistence::{KeyValueStore, MemoryStore, PersistenceError, RetryPolicy};
use cartstore::{CartStore, NewItem};
use parking_lot::Mutex;

pub const KEY: &str = "@GoBarber:products";

pub fn shirt() -> NewItem {
    NewItem::new("p1", "Shirt", "u", 10.0)
}

pub fn product(id: &str) -> NewItem {
    NewItem::new(id, format!("Product {id}"), format!("https://img/{id}.png"), 5.0)
}

/// Backend that records every successful write in order.
///
/// Writes whose payload contains `slow_marker` sleep first, to give an
/// unserialized writer the chance to reorder them.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    writes: Arc<Mutex<Vec<String>>>,
    slow_marker: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.inner = self.inner.with_value(KEY, value);
        self
    }

    pub fn slow_when_contains(mut self, marker: &str) -> Self {
        self.slow_marker = Some(marker.to_string());
        self
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    pub fn stored(&self) -> Option<String> {
        self.inner.snapshot(KEY)
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        if let Some(marker) = &self.slow_marker {
            if value.contains(marker.as_str()) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
        self.writes.lock().push(value.clone());
        self.inner.set(key, value).await
    }
}

/// Backend whose reads fail and whose first `failing_writes` writes fail.
#[derive(Clone)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_writes: Arc<AtomicU32>,
}

impl FlakyStore {
    pub fn new(failing_writes: u32) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing_writes: Arc::new(AtomicU32::new(failing_writes)),
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.inner.snapshot(KEY)
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
        Err(PersistenceError::Unavailable {
            reason: "read refused".to_string(),
        })
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        let refused = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(PersistenceError::Unavailable {
                reason: "write refused".to_string(),
            });
        }
        self.inner.set(key, value).await
    }
}

pub fn fast_retries(retries: u32) -> RetryPolicy {
    RetryPolicy {
        retries,
        backoff: Duration::from_millis(1),
    }
}

/// A store over `backend` that has already restored.
pub async fn ready_store(backend: Arc<dyn KeyValueStore>) -> CartStore {
    let store = CartStore::new(backend, KEY, RetryPolicy::none()).unwrap();
    store.initialize().await;
    store
}

/// Ids and quantities, in collection order.
pub fn lines(items: &[cartstore::CartItem]) -> Vec<(String, u32)> {
    items
        .iter()
        .map(|item| (item.id.clone(), item.quantity))
        .collect()
}
