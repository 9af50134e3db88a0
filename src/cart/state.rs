use super::item::CartItem;

/// Cart lifecycle: nothing is known until the restore read completes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CartState {
    #[default]
    Uninitialized,
    Ready {
        /// Insertion order of first appearance; at most one entry per id.
        items: Vec<CartItem>,
    },
}

impl CartState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Current line items. Empty before the restore completes.
    pub fn items(&self) -> &[CartItem] {
        match self {
            Self::Uninitialized => &[],
            Self::Ready { items } => items,
        }
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items().iter().find(|item| item.id == id)
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items().iter().map(|item| u64::from(item.quantity)).sum()
    }
}
