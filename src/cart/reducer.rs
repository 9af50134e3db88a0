//! Reducer for the cart collection.

use crate::mvi::Reducer;

use super::intent::CartIntent;
use super::item::CartItem;
use super::state::CartState;

/// Reducer for cart state transitions.
///
/// Pure function: publishing the new state and persisting it are handled
/// by [`CartStore`](crate::store::CartStore) around the dispatch call.
/// Mutations against `Uninitialized` leave the state untouched.
pub struct CartReducer;

impl Reducer for CartReducer {
    type State = CartState;
    type Intent = CartIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            CartIntent::Restore { items } => match state {
                CartState::Uninitialized => CartState::Ready { items },
                // Restore happens once per session
                ready => ready,
            },

            CartIntent::AddToCart { item } => match state {
                CartState::Ready { mut items } => {
                    match position(&items, &item.id) {
                        Some(index) => {
                            let quantity = items[index].quantity.saturating_add(1);
                            items[index] = item.with_quantity(quantity);
                        }
                        None => items.push(item.with_quantity(1)),
                    }
                    CartState::Ready { items }
                }
                other => other,
            },

            CartIntent::Increment { id } => match state {
                CartState::Ready { mut items } => {
                    if let Some(index) = position(&items, &id) {
                        items[index].quantity = items[index].quantity.saturating_add(1);
                    }
                    CartState::Ready { items }
                }
                other => other,
            },

            CartIntent::Decrement { id } => match state {
                CartState::Ready { mut items } => {
                    if let Some(index) = position(&items, &id) {
                        let quantity = items[index].quantity.saturating_sub(1);
                        if quantity == 0 {
                            items.remove(index);
                        } else {
                            items[index].quantity = quantity;
                        }
                    }
                    CartState::Ready { items }
                }
                other => other,
            },
        }
    }
}

fn position(items: &[CartItem], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id == id)
}
