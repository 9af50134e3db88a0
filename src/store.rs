//! The cart store: single writer over the cart collection.
//!
//! Every mutation runs the pure [`CartReducer`] against the latest state
//! under a short dispatch guard, publishes the result to subscribers, and
//! queues the serialized collection on the [`PersistQueue`] for its key.
//! Readers see a new state before it is durable; [`Commit::durable`] and
//! [`CartStore::flush`] wait for the backend when that matters.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::cart::{codec, CartIntent, CartItem, CartReducer, CartState, NewItem};
use crate::config::Config;
use crate::error::CartError;
use crate::mvi::Reducer;
use crate::persistence::{KeyValueStore, PersistQueue, PersistenceError, RetryPolicy, WriteAck};

pub struct CartStore {
    backend: Arc<dyn KeyValueStore>,
    queue: PersistQueue,
    state: watch::Sender<CartState>,
    /// Serializes reduce + publish + enqueue so queue order is publish order.
    dispatch: Mutex<()>,
}

impl CartStore {
    /// Create an uninitialized store writing to `key` on `backend`.
    ///
    /// Must be called from within a tokio runtime: the write queue task
    /// is spawned here.
    pub fn new(
        backend: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        policy: RetryPolicy,
    ) -> Result<Self, CartError> {
        let queue = PersistQueue::spawn(backend.clone(), key, policy)?;
        let (state, _) = watch::channel(CartState::Uninitialized);
        Ok(Self {
            backend,
            queue,
            state,
            dispatch: Mutex::new(()),
        })
    }

    pub fn from_config(
        backend: Arc<dyn KeyValueStore>,
        config: &Config,
    ) -> Result<Self, CartError> {
        Self::new(
            backend,
            config.storage.key.clone(),
            config.persistence.retry_policy(),
        )
    }

    /// The storage key this store reads and writes.
    pub fn key(&self) -> &str {
        self.queue.key()
    }

    /// Load the stored collection and move to `Ready`.
    ///
    /// A missing value, a backend failure and malformed data all restore
    /// an empty cart; failures are logged, never returned. Calling this
    /// again once ready does nothing.
    pub async fn initialize(&self) {
        if self.is_ready() {
            tracing::debug!(key = self.key(), "Cart already initialized");
            return;
        }

        let items = match self.backend.get(self.key()).await {
            Ok(Some(raw)) => match codec::decode(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(
                        key = self.key(),
                        error = %e,
                        "Stored cart is malformed, starting empty"
                    );
                    Vec::new()
                }
            },
            Ok(None) => {
                tracing::debug!(key = self.key(), "No stored cart, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    key = self.key(),
                    backend = self.backend.name(),
                    error = %e,
                    "Failed to read stored cart, starting empty"
                );
                Vec::new()
            }
        };

        let count = items.len();
        if self.apply(CartIntent::Restore { items }) {
            tracing::info!(key = self.key(), items = count, "Cart restored");
        }
    }

    /// Upsert a product. A known id gains one and takes the new fields.
    ///
    /// A NaN or infinite price is rejected before anything is dispatched.
    pub fn add_to_cart(&self, item: NewItem) -> Result<Commit, CartError> {
        if !item.price.is_finite() {
            tracing::warn!(id = %item.id, price = item.price, "Rejecting non-finite price");
            return Err(CartError::InvalidPrice {
                id: item.id,
                price: item.price,
            });
        }
        self.mutate(CartIntent::AddToCart { item })
    }

    /// Add one to an existing line. Unknown ids commit nothing.
    pub fn increment(&self, id: &str) -> Result<Commit, CartError> {
        self.mutate(CartIntent::Increment { id: id.to_string() })
    }

    /// Remove one from an existing line; the line is dropped at zero.
    /// Unknown ids commit nothing.
    pub fn decrement(&self, id: &str) -> Result<Commit, CartError> {
        self.mutate(CartIntent::Decrement { id: id.to_string() })
    }

    /// Latest committed line items.
    pub fn products(&self) -> Vec<CartItem> {
        self.state.borrow().items().to_vec()
    }

    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    pub fn subscribe(&self) -> CartSubscription {
        CartSubscription {
            receiver: self.state.subscribe(),
        }
    }

    /// Resolves once the restore has completed.
    pub async fn ready(&self) -> Result<(), CartError> {
        self.subscribe().ready().await
    }

    /// Wait for every write queued so far to finish.
    pub async fn flush(&self) -> Result<(), CartError> {
        self.queue.flush().await?;
        Ok(())
    }

    fn mutate(&self, intent: CartIntent) -> Result<Commit, CartError> {
        let _guard = self.dispatch.lock();
        let current = self.state.borrow().clone();
        if !current.is_ready() {
            return Err(CartError::NotInitialized);
        }

        if let Some(id) = intent.line_id() {
            if current.get(id).is_none() {
                tracing::debug!(key = self.key(), id, "Item not in cart, skipping write");
                return Ok(Commit::unchanged());
            }
        }

        tracing::trace!(?intent, "Dispatching cart intent");
        let next = CartReducer::reduce(current.clone(), intent);
        // Only a saturated increment gets here unchanged.
        if next == current {
            tracing::debug!(key = self.key(), "Cart intent changed nothing, skipping write");
            return Ok(Commit::unchanged());
        }

        let payload = codec::encode(next.items()).map_err(PersistenceError::from)?;
        self.state.send_replace(next);

        match self.queue.enqueue(payload) {
            Ok(ack) => Ok(Commit::queued(ack)),
            Err(e) => {
                tracing::error!(key = self.key(), error = %e, "Cart write could not be queued");
                Ok(Commit::dropped(self.key()))
            }
        }
    }

    /// Reduce and publish without persisting. Returns whether anything changed.
    fn apply(&self, intent: CartIntent) -> bool {
        let _guard = self.dispatch.lock();
        let current = self.state.borrow().clone();
        let next = CartReducer::reduce(current.clone(), intent);
        if next == current {
            return false;
        }
        self.state.send_replace(next);
        true
    }
}

/// Outcome of a mutation.
///
/// Dropping it leaves the write to complete in the background.
#[derive(Debug)]
pub struct Commit {
    changed: bool,
    write: CommitWrite,
}

#[derive(Debug)]
enum CommitWrite {
    Skipped,
    Queued(WriteAck),
    Dropped { key: String },
}

impl Commit {
    fn unchanged() -> Self {
        Self {
            changed: false,
            write: CommitWrite::Skipped,
        }
    }

    fn queued(ack: WriteAck) -> Self {
        Self {
            changed: true,
            write: CommitWrite::Queued(ack),
        }
    }

    fn dropped(key: &str) -> Self {
        Self {
            changed: true,
            write: CommitWrite::Dropped {
                key: key.to_string(),
            },
        }
    }

    /// Whether the collection changed (and a write was issued).
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Wait until the backend holds the state this mutation produced.
    ///
    /// Resolves immediately for a mutation that changed nothing.
    pub async fn durable(self) -> Result<(), CartError> {
        match self.write {
            CommitWrite::Skipped => Ok(()),
            CommitWrite::Queued(ack) => Ok(ack.wait().await?),
            CommitWrite::Dropped { key } => Err(CartError::QueueClosed { key }),
        }
    }
}

/// Live, read-only view of the cart.
#[derive(Clone)]
pub struct CartSubscription {
    receiver: watch::Receiver<CartState>,
}

impl CartSubscription {
    pub fn products(&self) -> Vec<CartItem> {
        self.receiver.borrow().items().to_vec()
    }

    pub fn state(&self) -> CartState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publish and return the new line items.
    pub async fn changed(&mut self) -> Result<Vec<CartItem>, CartError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| CartError::StoreDropped)?;
        Ok(self.receiver.borrow_and_update().items().to_vec())
    }

    /// Resolves once the store has restored its collection.
    pub async fn ready(&mut self) -> Result<(), CartError> {
        self.receiver
            .wait_for(CartState::is_ready)
            .await
            .map_err(|_| CartError::StoreDropped)?;
        Ok(())
    }
}
