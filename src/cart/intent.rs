//! Intents for the cart reducer.

use super::item::{CartItem, NewItem};

/// Intents that can be dispatched to [`CartReducer`](super::CartReducer).
#[derive(Debug, Clone)]
pub enum CartIntent {
    /// Restore finished (possibly with an empty collection).
    Restore { items: Vec<CartItem> },

    /// Upsert a product: new ids start at 1, known ids gain one and take
    /// the descriptor's fields.
    AddToCart { item: NewItem },

    /// Add one to an existing line. Unknown ids are a no-op.
    Increment { id: String },

    /// Remove one from an existing line, dropping it at zero.
    /// Unknown ids are a no-op.
    Decrement { id: String },
}

impl CartIntent {
    /// The existing line this intent operates on, if it needs one.
    pub fn line_id(&self) -> Option<&str> {
        match self {
            Self::Increment { id } | Self::Decrement { id } => Some(id.as_str()),
            Self::Restore { .. } | Self::AddToCart { .. } => None,
        }
    }
}
