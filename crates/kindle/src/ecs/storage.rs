//! # Storage — Sparse Sets Behind a Type-Erased Map
//!
//! Every component type gets its own [`SparseSet`]. The store keeps them in a
//! `HashMap<TypeId, Box<dyn ErasedStorage>>` and downcasts back to the typed
//! set whenever a typed call (`get::<T>`, `attach::<T>`) arrives.
//!
//! ## Layout
//!
//! ```text
//! sparse: [None, Some(1), None, Some(0)]   ← indexed by Entity::index
//! dense:  [e3,   e1]                        ← packed, iteration order
//! data:   [t3,   t1]                        ← parallel to dense
//! ```
//!
//! Lookups are two array reads. Iteration walks `dense`/`data` front to back,
//! so reordering those two arrays (see [`SparseSet::sort_by`]) changes the
//! order every later pass observes.
//!
//! ## Why sparse sets and not archetype tables?
//!
//! Render order is imposed per component type (sort `Renderable` by depth),
//! and components come and go often (anchors, layouts, effects). A per-type
//! sparse set gives each type its own ordering and O(1) attach/detach without
//! moving an entity's other components around.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::entity::Entity;

/// Object-safe view over a [`SparseSet<T>`] of unknown `T`.
///
/// Only the operations that make sense without knowing `T` live here: the
/// store uses them to destroy entities and answer presence checks.
pub trait ErasedStorage: Any + Send + Sync {
    fn contains(&self, entity: Entity) -> bool;
    /// Drop the entity's component, if any.
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    /// Entities in storage order.
    fn dense(&self) -> &[Entity];
    fn clear(&mut self);
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Packed storage for one component type.
pub struct SparseSet<T> {
    sparse: Vec<Option<usize>>,
    dense: Vec<Entity>,
    data: Vec<T>,
}

impl<T: 'static + Send + Sync> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            data: Vec::new(),
        }
    }

    fn row(&self, entity: Entity) -> Option<usize> {
        let row = (*self.sparse.get(entity.index as usize)?)?;
        // The sparse slot may belong to an older generation of this index.
        (self.dense[row] == entity).then_some(row)
    }

    /// Insert or overwrite. Returns the previous value if there was one.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(row) = self.row(entity) {
            return Some(std::mem::replace(&mut self.data[row], value));
        }
        let index = entity.index as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, None);
        }
        self.sparse[index] = Some(self.dense.len());
        self.dense.push(entity);
        self.data.push(value);
        None
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.row(entity).map(|row| &self.data[row])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.row(entity).map(|row| &mut self.data[row])
    }

    /// Swap-remove the entity's component and return it.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let row = self.row(entity)?;
        self.sparse[entity.index as usize] = None;
        self.dense.swap_remove(row);
        let value = self.data.swap_remove(row);
        if let Some(&moved) = self.dense.get(row) {
            self.sparse[moved.index as usize] = Some(row);
        }
        Some(value)
    }

    /// Entities in storage order.
    pub fn entities(&self) -> &[Entity] {
        &self.dense
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.dense.iter().copied().zip(self.data.iter())
    }

    /// Stable sort of the packed arrays. Entities comparing equal keep their
    /// current relative order.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&T, &T) -> Ordering) {
        let mut order: Vec<usize> = (0..self.data.len()).collect();
        order.sort_by(|&a, &b| compare(&self.data[a], &self.data[b]));

        let mut slots: Vec<Option<T>> = self.data.drain(..).map(Some).collect();
        let dense = std::mem::take(&mut self.dense);
        for (row, &from) in order.iter().enumerate() {
            let entity = dense[from];
            self.sparse[entity.index as usize] = Some(row);
            self.dense.push(entity);
            if let Some(value) = slots[from].take() {
                self.data.push(value);
            }
        }
    }
}

impl<T: 'static + Send + Sync> ErasedStorage for SparseSet<T> {
    fn contains(&self, entity: Entity) -> bool {
        self.row(entity).is_some()
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn dense(&self) -> &[Entity] {
        &self.dense
    }

    fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.data.clear();
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Every storage the store owns, keyed by component type.
pub type StorageMap = HashMap<TypeId, Box<dyn ErasedStorage>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32, generation: u32) -> Entity {
        Entity { index, generation }
    }

    #[test]
    fn insert_get_overwrite() {
        let mut set = SparseSet::new();
        let e = entity(3, 0);
        assert_eq!(set.insert(e, 10u32), None);
        assert_eq!(set.insert(e, 20u32), Some(10));
        assert_eq!(set.get(e), Some(&20));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn stale_generation_is_not_found() {
        let mut set = SparseSet::new();
        set.insert(entity(0, 0), 1u8);
        assert!(set.get(entity(0, 1)).is_none());
        assert!(!set.contains(entity(0, 1)));
    }

    #[test]
    fn remove_keeps_sparse_index_consistent() {
        let mut set = SparseSet::new();
        let (a, b, c) = (entity(0, 0), entity(1, 0), entity(2, 0));
        set.insert(a, 'a');
        set.insert(b, 'b');
        set.insert(c, 'c');

        assert_eq!(set.remove(a), Some('a'));
        assert_eq!(set.remove(a), None);
        // `c` was swapped into row 0.
        assert_eq!(set.entities(), &[c, b]);
        assert_eq!(set.get(c), Some(&'c'));
        assert_eq!(set.get(b), Some(&'b'));
    }

    #[test]
    fn sort_is_stable_and_reindexes() {
        let mut set = SparseSet::new();
        let ids: Vec<Entity> = (0..5).map(|i| entity(i, 0)).collect();
        for (id, depth) in ids.iter().zip([3, 1, 2, 1, 0]) {
            set.insert(*id, depth);
        }
        set.sort_by(|a: &i32, b: &i32| a.cmp(b));

        let order: Vec<u32> = set.entities().iter().map(|e| e.index).collect();
        assert_eq!(order, vec![4, 1, 3, 2, 0]);
        for id in &ids {
            assert!(set.get(*id).is_some());
        }
        assert_eq!(set.get(ids[0]), Some(&3));
    }

    #[test]
    fn erased_roundtrip_through_any() {
        let mut set: Box<dyn ErasedStorage> = Box::new(SparseSet::<f32>::new());
        set.as_any_mut()
            .downcast_mut::<SparseSet<f32>>()
            .map(|typed| typed.insert(entity(0, 0), 1.5));
        assert_eq!(set.type_name(), "f32");
        let typed = set.into_any().downcast::<SparseSet<f32>>().ok();
        assert_eq!(typed.and_then(|t| t.get(entity(0, 0)).copied()), Some(1.5));
    }
}
