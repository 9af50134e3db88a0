//! Session scope for the cart contract.
//!
//! [`CartProvider::run`] activates a store (restoring it in the background)
//! and runs a future inside a task-local scope. Inside that scope
//! [`use_cart`] hands out a [`Cart`]; outside it the call fails with
//! [`CartError::OutsideProvider`].
//!
//! The scope is task-local: work spawned with `tokio::spawn` from inside
//! it must be wrapped with [`Cart::scope`] to see the cart.

use std::future::Future;
use std::sync::Arc;

use crate::cart::{CartItem, NewItem};
use crate::error::CartError;
use crate::store::{CartStore, CartSubscription, Commit};

tokio::task_local! {
    static CURRENT_CART: Cart;
}

/// Consumer-facing handle: `products` plus the three mutations.
#[derive(Clone)]
pub struct Cart {
    store: Arc<CartStore>,
}

impl Cart {
    pub fn products(&self) -> Vec<CartItem> {
        self.store.products()
    }

    pub fn add_to_cart(&self, item: NewItem) -> Result<Commit, CartError> {
        self.store.add_to_cart(item)
    }

    pub fn increment(&self, id: &str) -> Result<Commit, CartError> {
        self.store.increment(id)
    }

    pub fn decrement(&self, id: &str) -> Result<Commit, CartError> {
        self.store.decrement(id)
    }

    pub fn subscribe(&self) -> CartSubscription {
        self.store.subscribe()
    }

    pub async fn ready(&self) -> Result<(), CartError> {
        self.store.ready().await
    }

    pub async fn flush(&self) -> Result<(), CartError> {
        self.store.flush().await
    }

    /// Run `future` inside this cart's provider scope.
    pub async fn scope<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_CART.scope(self.clone(), future).await
    }
}

/// Owns the store for one session.
pub struct CartProvider {
    store: Arc<CartStore>,
}

impl CartProvider {
    pub fn new(store: CartStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &Arc<CartStore> {
        &self.store
    }

    /// Start the restore and run `future` with the cart in scope.
    ///
    /// The restore runs concurrently; consumers call [`Cart::ready`]
    /// before mutating.
    pub async fn run<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        let store = self.store.clone();
        tokio::spawn(async move { store.initialize().await });

        let cart = Cart {
            store: self.store.clone(),
        };
        cart.scope(future).await
    }
}

/// The cart of the enclosing provider scope.
pub fn use_cart() -> Result<Cart, CartError> {
    CURRENT_CART
        .try_with(Cart::clone)
        .map_err(|_| CartError::OutsideProvider)
}
