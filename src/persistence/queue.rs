//! Ordered write queue for one storage key.
//!
//! A single background task owns all writes for the key, so two rapid
//! mutations can never commit out of order at the backend. Callers get a
//! [`WriteAck`] per write and may await it or drop it.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use super::{KeyValueStore, PersistenceError};

/// Retry behaviour for failed writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Sleep before attempt `n` is `backoff * n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            retries: 0,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(50),
        }
    }
}

enum QueueCommand {
    Write {
        payload: String,
        ack: oneshot::Sender<Result<(), PersistenceError>>,
    },
    Flush {
        respond_to: oneshot::Sender<()>,
    },
}

/// Handle to the write task for one key. Cheap to clone.
///
/// The task exits once every handle is dropped and the queue drained.
#[derive(Clone)]
pub struct PersistQueue {
    sender: mpsc::UnboundedSender<QueueCommand>,
    key: Arc<str>,
}

impl PersistQueue {
    /// Spawn the write task on the current tokio runtime.
    ///
    /// # Errors
    /// Returns `Unavailable` when called outside a runtime.
    pub fn spawn(
        backend: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        policy: RetryPolicy,
    ) -> Result<Self, PersistenceError> {
        let handle = Handle::try_current().map_err(|e| PersistenceError::Unavailable {
            reason: format!("write queue needs a tokio runtime: {e}"),
        })?;
        let key: Arc<str> = Arc::from(key.into());
        let (sender, receiver) = mpsc::unbounded_channel();
        handle.spawn(run(receiver, backend, key.clone(), policy));
        Ok(Self { sender, key })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue `payload` behind every write already queued.
    pub fn enqueue(&self, payload: String) -> Result<WriteAck, PersistenceError> {
        let (ack, receiver) = oneshot::channel();
        self.sender
            .send(QueueCommand::Write { payload, ack })
            .map_err(|_| closed())?;
        Ok(WriteAck { receiver })
    }

    /// Resolves once every write queued before this call has finished,
    /// successfully or not.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(QueueCommand::Flush { respond_to })
            .map_err(|_| closed())?;
        receiver.await.map_err(|_| closed())
    }
}

/// Completion of a single queued write.
#[derive(Debug)]
pub struct WriteAck {
    receiver: oneshot::Receiver<Result<(), PersistenceError>>,
}

impl WriteAck {
    /// Wait for the backend to confirm (or finally reject) the write.
    pub async fn wait(self) -> Result<(), PersistenceError> {
        self.receiver.await.map_err(|_| closed())?
    }
}

fn closed() -> PersistenceError {
    PersistenceError::Unavailable {
        reason: "write queue closed".to_string(),
    }
}

async fn run(
    mut receiver: mpsc::UnboundedReceiver<QueueCommand>,
    backend: Arc<dyn KeyValueStore>,
    key: Arc<str>,
    policy: RetryPolicy,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            QueueCommand::Write { payload, ack } => {
                let result = write_with_retry(backend.as_ref(), &key, payload, policy).await;
                if let Err(e) = &result {
                    tracing::error!(
                        key = %key,
                        backend = backend.name(),
                        error = %e,
                        "Cart write failed; in-memory state kept"
                    );
                }
                if ack.send(result).is_err() {
                    tracing::trace!(key = %key, "Write ack dropped (receiver gone)");
                }
            }
            QueueCommand::Flush { respond_to } => {
                if respond_to.send(()).is_err() {
                    tracing::trace!(key = %key, "Flush response dropped (receiver gone)");
                }
            }
        }
    }
    tracing::debug!(key = %key, "Write queue closed");
}

async fn write_with_retry(
    backend: &dyn KeyValueStore,
    key: &str,
    payload: String,
    policy: RetryPolicy,
) -> Result<(), PersistenceError> {
    let mut attempt = 0;
    loop {
        match backend.set(key, payload.clone()).await {
            Ok(()) => {
                tracing::debug!(key, bytes = payload.len(), attempt, "Cart persisted");
                return Ok(());
            }
            Err(e) if attempt < policy.retries => {
                attempt += 1;
                tracing::warn!(key, attempt, error = %e, "Cart write failed, retrying");
                tokio::time::sleep(policy.backoff * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }
}
