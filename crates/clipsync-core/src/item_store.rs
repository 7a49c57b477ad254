//! Newest-first store of the items shared in a session.

use std::collections::VecDeque;

use crate::model::{ItemKind, TransferItem};

/// Ordered collection of transfer items, newest first.
///
/// Items are only ever prepended. There is no editing, deletion or
/// deduplication; the store is cleared wholesale when a session starts or ends.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: VecDeque<TransferItem>,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `items` in the given (newest-first) order.
    #[must_use]
    pub fn seeded(items: impl IntoIterator<Item = TransferItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Add an item at the front.
    pub fn prepend(&mut self, item: TransferItem) {
        self.items.push_front(item);
    }

    /// Items, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &TransferItem> {
        self.items.iter()
    }

    /// Snapshot of the items, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<TransferItem> {
        self.items.iter().cloned().collect()
    }

    /// Most recently added item.
    #[must_use]
    pub fn first(&self) -> Option<&TransferItem> {
        self.items.front()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TransferItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items of one kind, or all items when `kind` is `None`.
    #[must_use]
    pub fn filtered(&self, kind: Option<ItemKind>) -> Vec<TransferItem> {
        self.items
            .iter()
            .filter(|item| kind.is_none_or(|k| item.kind() == k))
            .cloned()
            .collect()
    }

    /// Newline-joined summary lines, as sent to the assistant for search.
    #[must_use]
    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(TransferItem::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
