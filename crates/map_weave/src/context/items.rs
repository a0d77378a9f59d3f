//! Ordered item lists with per-item provenance.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One recorded item plus the name of the step that produced it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct ItemEntry<T> {
    pub item: T,
    pub source: String,
}

/// An ordered list of generated items (rooms, areas, door positions) that
/// remembers which named step added each one, so tools can show provenance
/// or selectively remove a step's output without re-running anything.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct ItemList<T> {
    entries: Vec<ItemEntry<T>>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemList<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, item: T, source: &str) {
        self.entries.push(ItemEntry {
            item,
            source: source.to_owned(),
        });
    }

    pub fn extend_from(&mut self, items: impl IntoIterator<Item = T>, source: &str) {
        for item in items {
            self.add(item, source);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &e.item)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|e| &mut e.item)
    }

    /// The items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.item)
    }

    /// The items plus their producing step names.
    pub fn entries(&self) -> &[ItemEntry<T>] {
        &self.entries
    }

    /// Items produced by the step named `source`.
    pub fn added_by<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a T> {
        self.entries
            .iter()
            .filter(move |e| e.source == source)
            .map(|e| &e.item)
    }

    /// Remove every item matching `predicate`; returns how many were removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !predicate(&e.item));
        before - self.entries.len()
    }
}
