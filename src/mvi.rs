//! The reducer contract behind [`CartStore`](crate::store::CartStore).
//!
//! ```text
//! intent ──→ reduce(state, intent) ──→ state ──→ subscribers
//! ```

/// A pure `(State, Intent) -> State` transition.
///
/// Publishing and persistence belong to the caller.
pub trait Reducer {
    type State: Clone + PartialEq + Send + Sync + 'static;
    type Intent: Send + 'static;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;

    /// Apply `intents` in order.
    fn reduce_all<I>(state: Self::State, intents: I) -> Self::State
    where
        I: IntoIterator<Item = Self::Intent>,
    {
        intents.into_iter().fold(state, Self::reduce)
    }
}
