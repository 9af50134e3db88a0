//! Session shopping cart with ordered, durable key-value persistence.
//!
//! [`CartStore`] owns the collection and applies every mutation through a
//! pure reducer; [`CartProvider`] scopes a store to a session and exposes
//! it to consumers through [`use_cart`].

pub mod cart;
pub mod config;
pub mod error;
pub mod logging;
pub mod mvi;
pub mod persistence;
pub mod provider;
pub mod store;

pub use cart::{CartItem, CartState, NewItem};
pub use error::CartError;
pub use provider::{use_cart, Cart, CartProvider};
pub use store::{CartStore, CartSubscription, Commit};
