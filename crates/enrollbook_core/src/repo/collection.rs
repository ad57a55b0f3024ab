//! Generic id-keyed collection shared by every repository.
//!
//! # Responsibility
//! - Assign identifiers and store values keyed by them.
//!
//! # Invariants
//! - Ids start at 1 and strictly increase; `last_id` never decreases.
//! - A deleted id is never handed out again.
//! - Iteration order is insertion order (ids are monotone, so id order).
//!
//! The collection is not synchronized; repositories wrap it in their own lock.

use crate::model::RecordId;
use std::collections::BTreeMap;

/// Error returned when an id does not name a live value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("record not found: {0}")]
pub struct CollectionNotFound(pub RecordId);

pub type CollectionResult<T> = Result<T, CollectionNotFound>;

#[derive(Debug, Clone)]
pub struct IndexedCollection<V> {
    items: BTreeMap<RecordId, V>,
    last_id: RecordId,
}

impl<V> Default for IndexedCollection<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IndexedCollection<V> {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            last_id: 0,
        }
    }

    /// Stores `value` under the next id.
    pub fn add(&mut self, value: V) -> (RecordId, &V) {
        self.add_with(|_| value)
    }

    /// Stores the value produced by `build` for the next id.
    ///
    /// Lets records embed their own id without a second write.
    pub fn add_with(&mut self, build: impl FnOnce(RecordId) -> V) -> (RecordId, &V) {
        let id = self.last_id + 1;
        self.last_id = id;
        let stored = self.items.entry(id).or_insert(build(id));
        (id, stored)
    }

    pub fn get(&self, id: RecordId) -> CollectionResult<&V> {
        self.items.get(&id).ok_or(CollectionNotFound(id))
    }

    pub fn get_mut(&mut self, id: RecordId) -> CollectionResult<&mut V> {
        self.items.get_mut(&id).ok_or(CollectionNotFound(id))
    }

    /// Replaces the value stored under `id`, keeping the id.
    pub fn update(&mut self, id: RecordId, value: V) -> CollectionResult<&V> {
        let slot = self.get_mut(id)?;
        *slot = value;
        Ok(slot)
    }

    /// Removes and returns the value stored under `id`.
    pub fn delete(&mut self, id: RecordId) -> CollectionResult<V> {
        self.items.remove(&id).ok_or(CollectionNotFound(id))
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Last id handed out, or 0 when nothing was ever added.
    pub fn last_id(&self) -> RecordId {
        self.last_id
    }
}

impl<V: Clone> IndexedCollection<V> {
    /// Snapshot of all live values in insertion order.
    pub fn list(&self) -> Vec<V> {
        self.items.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionNotFound, IndexedCollection};

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut collection = IndexedCollection::new();
        let (first, _) = collection.add("a");
        let (second, _) = collection.add("b");

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(collection.last_id(), 2);
    }

    #[test]
    fn add_with_passes_assigned_id() {
        let mut collection = IndexedCollection::new();
        let (id, stored) = collection.add_with(|id| format!("item-{id}"));
        assert_eq!(stored, "item-1");
        assert_eq!(collection.get(id).unwrap(), "item-1");
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let mut collection = IndexedCollection::new();
        collection.add('a');
        let (second, _) = collection.add('b');
        collection.delete(second).unwrap();

        let (third, _) = collection.add('c');
        assert_eq!(third, 3);
        assert_eq!(collection.get(second), Err(CollectionNotFound(2)));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn missing_ids_fail_with_not_found() {
        let mut collection: IndexedCollection<u8> = IndexedCollection::new();

        assert_eq!(collection.get(0), Err(CollectionNotFound(0)));
        assert_eq!(collection.get(10), Err(CollectionNotFound(10)));
        assert_eq!(collection.update(1, 5), Err(CollectionNotFound(1)));
        assert_eq!(collection.delete(1), Err(CollectionNotFound(1)));
    }

    #[test]
    fn update_replaces_in_place() {
        let mut collection = IndexedCollection::new();
        let (id, _) = collection.add(10);
        assert_eq!(collection.update(id, 20), Ok(&20));
        assert_eq!(collection.get(id), Ok(&20));
        assert_eq!(collection.last_id(), 1);
    }

    #[test]
    fn list_keeps_insertion_order_after_delete() {
        let mut collection = IndexedCollection::new();
        for value in ["a", "b", "c", "d"] {
            collection.add(value);
        }
        collection.delete(2).unwrap();

        assert_eq!(collection.list(), vec!["a", "c", "d"]);
    }
}
