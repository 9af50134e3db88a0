//! Cart state machine: line items, intents and the pure reducer.

pub mod codec;
mod intent;
mod item;
mod reducer;
mod state;

pub use codec::CodecError;
pub use intent::CartIntent;
pub use item::{CartItem, NewItem};
pub use reducer::CartReducer;
pub use state::CartState;
