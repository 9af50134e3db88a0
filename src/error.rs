use thiserror::Error;

use crate::persistence::PersistenceError;

/// Errors surfaced by the cart contract.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was requested outside an active provider scope.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    /// A mutation was issued before the stored cart finished loading.
    #[error("Cart is not initialized yet")]
    NotInitialized,

    /// The stored form has no representation for NaN or infinity.
    #[error("Price for '{id}' must be a finite number, got {price}")]
    InvalidPrice { id: String, price: f64 },

    /// The write queue task is gone, so the mutation cannot be persisted.
    #[error("Cart write queue for '{key}' is closed")]
    QueueClosed { key: String },

    /// The store behind a subscription was dropped.
    #[error("Cart store was dropped")]
    StoreDropped,

    #[error("Cart persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}
