use cartstore::cart::{CartIntent, CartItem, CartReducer, CartState, NewItem};
use cartstore::mvi::Reducer;

fn item(id: &str) -> NewItem {
    NewItem::new(id, id.to_uppercase(), "u", 1.5)
}

fn dispatch(state: CartState, intents: Vec<CartIntent>) -> CartState {
    CartReducer::reduce_all(state, intents)
}

fn ready() -> CartState {
    CartReducer::reduce(CartState::Uninitialized, CartIntent::Restore { items: vec![] })
}

fn add(id: &str) -> CartIntent {
    CartIntent::AddToCart { item: item(id) }
}

fn inc(id: &str) -> CartIntent {
    CartIntent::Increment { id: id.to_string() }
}

fn dec(id: &str) -> CartIntent {
    CartIntent::Decrement { id: id.to_string() }
}

#[test]
fn restore_keeps_stored_order() {
    let items: Vec<CartItem> = ["c", "a", "b"]
        .iter()
        .map(|id| item(id).with_quantity(1))
        .collect();
    let state = CartReducer::reduce(
        CartState::Uninitialized,
        CartIntent::Restore {
            items: items.clone(),
        },
    );
    assert_eq!(state.items(), items.as_slice());
}

#[test]
fn repeated_adds_accumulate_per_id() {
    let state = dispatch(ready(), vec![add("a"), add("b"), add("a"), add("a")]);
    assert_eq!(state.get("a").unwrap().quantity, 3);
    assert_eq!(state.get("b").unwrap().quantity, 1);
    assert_eq!(state.total_quantity(), 4);
    assert_eq!(state.items().len(), 2);
}

#[test]
fn quantity_never_stored_at_zero() {
    let state = dispatch(
        ready(),
        vec![add("a"), inc("a"), dec("a"), dec("a"), dec("a")],
    );
    assert!(state.get("a").is_none());
    assert!(state.items().iter().all(|line| line.quantity >= 1));
}

#[test]
fn removal_keeps_remaining_order() {
    let state = dispatch(ready(), vec![add("a"), add("b"), add("c"), dec("b")]);
    let ids: Vec<&str> = state.items().iter().map(|line| line.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn re_added_item_goes_to_the_end() {
    let state = dispatch(ready(), vec![add("a"), add("b"), dec("a"), add("a")]);
    let ids: Vec<&str> = state.items().iter().map(|line| line.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(state.get("a").unwrap().quantity, 1);
}

#[test]
fn uninitialized_ignores_mutations() {
    let state = dispatch(
        CartState::Uninitialized,
        vec![add("a"), inc("a"), dec("a")],
    );
    assert_eq!(state, CartState::Uninitialized);
    assert!(state.items().is_empty());
}
