//! Ordered object storage with id → slot lookup.
//!
//! Items stay in registration order (removal shifts, never swaps) because the
//! Gauss-Seidel solve iterates constraints in that order.

use std::collections::HashMap;
use std::ops::Index;

use super::handle::ObjectId;

pub trait Identified {
    fn object_id(&self) -> ObjectId;
}

#[derive(Clone, Debug)]
pub struct Store<T> {
    items: Vec<T>,
    slots: HashMap<ObjectId, usize>,
}

impl<T: Identified> Store<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            slots: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item; returns its slot.
    pub fn insert(&mut self, item: T) -> usize {
        let slot = self.items.len();
        self.slots.insert(item.object_id(), slot);
        self.items.push(item);
        slot
    }

    #[inline]
    pub fn slot(&self, id: ObjectId) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.slot(id).map(|slot| &self.items[slot])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        let slot = self.slot(id)?;
        Some(&mut self.items[slot])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Remove one item, keeping the order of the rest.
    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        let slot = self.slots.remove(&id)?;
        let item = self.items.remove(slot);
        for (offset, moved) in self.items[slot..].iter().enumerate() {
            self.slots.insert(moved.object_id(), slot + offset);
        }
        Some(item)
    }

    /// Ids of every item matching `pred`, in order.
    pub fn ids_where(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<ObjectId> {
        self.items
            .iter()
            .filter(|item| pred(item))
            .map(|item| item.object_id())
            .collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.slots.clear();
    }
}

impl<T: Identified> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Store<T> {
    type Output = T;

    #[inline]
    fn index(&self, slot: usize) -> &T {
        &self.items[slot]
    }
}

impl<'a, T: Identified> IntoIterator for &'a Store<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item(u32);

    impl Identified for Item {
        fn object_id(&self) -> ObjectId {
            ObjectId(self.0)
        }
    }

    #[test]
    fn remove_keeps_order_and_reindexes() {
        let mut store = Store::new();
        for id in [10, 20, 30, 40] {
            store.insert(Item(id));
        }
        assert_eq!(store.remove(ObjectId(20)), Some(Item(20)));
        let order: Vec<u32> = store.iter().map(|i| i.0).collect();
        assert_eq!(order, vec![10, 30, 40]);
        assert_eq!(store.slot(ObjectId(30)), Some(1));
        assert_eq!(store.slot(ObjectId(40)), Some(2));
        assert_eq!(store.slot(ObjectId(20)), None);
        assert_eq!(store.get(ObjectId(40)), Some(&Item(40)));
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut store: Store<Item> = Store::new();
        store.insert(Item(1));
        assert!(store.remove(ObjectId(2)).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_where_filters_in_order() {
        let mut store = Store::new();
        for id in 1..=6 {
            store.insert(Item(id));
        }
        let even = store.ids_where(|i| i.0 % 2 == 0);
        assert_eq!(even, vec![ObjectId(2), ObjectId(4), ObjectId(6)]);
    }
}
