//! # Component Store — Entities and Their Components
//!
//! Owns the [`EntityAllocator`] and one [`SparseSet`] per component type.
//!
//! ```text
//! ComponentStore
//! ├── allocator: EntityAllocator            generations + free list
//! └── storages:  HashMap<TypeId, Box<dyn ErasedStorage>>
//!                ├── Position  → SparseSet<Position>
//!                ├── Label     → SparseSet<Label>
//!                └── ...
//! ```
//!
//! Every typed entry point validates the entity's generation before touching
//! a storage, so a stale handle fails with [`EcsError::InvalidEntity`] (or is
//! silently ignored where the operation is documented as a no-op).
//!
//! ## Mutation while iterating
//!
//! [`each`](ComponentStore::each) borrows the store exclusively for the whole
//! pass, so the closure cannot attach or detach. Code that must restructure
//! while walking takes a snapshot first:
//!
//! ```ignore
//! for entity in store.entities::<(&Counter,)>() {
//!     store.destroy_entity(entity)?;
//! }
//! ```

use std::any::TypeId;
use std::cmp::Ordering;
use std::collections::HashSet;

use log::{trace, warn};

use super::bundle::SpawnBundle;
use super::entity::{Entity, EntityAllocator};
use super::query::Query;
use super::storage::{ErasedStorage, SparseSet, StorageMap};
use crate::error::{EcsError, Result};

/// Sparse, per-type component storage keyed by [`Entity`].
pub struct ComponentStore {
    allocator: EntityAllocator,
    storages: StorageMap,
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentStore {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            storages: StorageMap::new(),
        }
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Create an entity with no components.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        trace!("created {entity:?}");
        entity
    }

    /// Create an entity and attach a tuple of components to it.
    pub fn spawn<B: SpawnBundle>(&mut self, bundle: B) -> Entity {
        let entity = self.allocator.allocate();
        bundle.insert_into(self, entity);
        trace!("spawned {entity:?} with {:?}", B::type_names());
        entity
    }

    /// Remove every component of `entity` and invalidate the handle.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        if !self.allocator.deallocate(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        trace!("destroyed {entity:?}");
        Ok(())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Destroy every entity and drop every storage.
    pub fn clear(&mut self) {
        self.allocator.clear();
        self.storages.clear();
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach `value` to `entity`, overwriting any existing `T`.
    pub fn attach<T: 'static + Send + Sync>(&mut self, entity: Entity, value: T) -> Result<()> {
        if !self.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.insert_unchecked(entity, value);
        Ok(())
    }

    /// Insert without the liveness check. Only for freshly allocated entities.
    pub(crate) fn insert_unchecked<T: 'static + Send + Sync>(&mut self, entity: Entity, value: T) {
        self.storage_mut_or_insert::<T>().insert(entity, value);
    }

    /// Remove `T` from `entity` and return it. A no-op for absent components
    /// and dead entities.
    pub fn detach<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage_mut::<T>()?.remove(entity)
    }

    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Result<&T> {
        if !self.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.storage::<T>()
            .and_then(|storage| storage.get(entity))
            .ok_or_else(|| missing::<T>(entity))
    }

    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Result<&mut T> {
        if !self.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.storage_mut::<T>()
            .and_then(|storage| storage.get_mut(entity))
            .ok_or_else(|| missing::<T>(entity))
    }

    pub fn try_get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        self.get(entity).ok()
    }

    pub fn try_get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        self.get_mut(entity).ok()
    }

    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.is_alive(entity)
            && self
                .storages
                .get(&TypeId::of::<T>())
                .is_some_and(|storage| storage.contains(entity))
    }

    /// Number of entities carrying a `T`.
    pub fn len<T: 'static + Send + Sync>(&self) -> usize {
        self.storages
            .get(&TypeId::of::<T>())
            .map_or(0, |storage| storage.len())
    }

    // ── Iteration ────────────────────────────────────────────────────

    /// Visit every entity holding all of `Q`'s component types.
    ///
    /// Entities are visited in the storage order of the first type in `Q`.
    /// Each call is an independent pass.
    ///
    /// ```ignore
    /// store.each::<(&mut Position, &Size)>(|entity, (pos, size)| {
    ///     pos.0 += size.0 * 0.5;
    /// });
    /// ```
    pub fn each<Q: Query>(&mut self, mut f: impl FnMut(Entity, Q::Item<'_>)) {
        if !self.has_storages::<Q>() {
            return;
        }
        let mut column = Q::extract(&mut self.storages);
        let entities = Q::driver(&column).to_vec();
        for entity in entities {
            if let Some(item) = Q::fetch(&mut column, entity) {
                f(entity, item);
            }
        }
        Q::restore(column, &mut self.storages);
    }

    /// Snapshot of the entities [`each`](Self::each) would visit, in order.
    pub fn entities<Q: Query>(&self) -> Vec<Entity> {
        let types = Q::type_ids();
        if repeats_a_type(&types) {
            return Vec::new();
        }
        let Some(((first, _), rest)) = types.split_first() else {
            return Vec::new();
        };
        let Some(driver) = self.storages.get(first) else {
            return Vec::new();
        };
        let others: Vec<&dyn ErasedStorage> = match rest
            .iter()
            .map(|(id, _)| self.storages.get(id).map(|storage| &**storage))
            .collect::<Option<Vec<_>>>()
        {
            Some(others) => others,
            None => return Vec::new(),
        };
        driver
            .dense()
            .iter()
            .copied()
            .filter(|&entity| others.iter().all(|storage| storage.contains(entity)))
            .collect()
    }

    /// Lazy read-only pass over every `T`, in storage order.
    pub fn iter<T: 'static + Send + Sync>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>().into_iter().flat_map(|storage| storage.iter())
    }

    /// Stable-sort `T`'s storage. Later passes led by `T` follow this order
    /// until `T`'s storage is structurally modified.
    pub fn sort<T: 'static + Send + Sync>(&mut self, compare: impl FnMut(&T, &T) -> Ordering) {
        if let Some(storage) = self.storage_mut::<T>() {
            storage.sort_by(compare);
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn storage<T: 'static + Send + Sync>(&self) -> Option<&SparseSet<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref())
    }

    fn storage_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut SparseSet<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut())
    }

    fn storage_mut_or_insert<T: 'static + Send + Sync>(&mut self) -> &mut SparseSet<T> {
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()) as Box<dyn ErasedStorage>);
        match storage.as_any_mut().downcast_mut() {
            Some(typed) => typed,
            None => unreachable!("storage keyed by the wrong TypeId"),
        }
    }

    /// Whether every storage `Q` needs exists and no type is repeated.
    fn has_storages<Q: Query>(&self) -> bool {
        let types = Q::type_ids();
        !repeats_a_type(&types) && types.iter().all(|(id, _)| self.storages.contains_key(id))
    }
}

/// A query naming one type twice would alias its storage; such a pass visits
/// nothing.
fn repeats_a_type(types: &[(TypeId, &'static str)]) -> bool {
    let mut seen = HashSet::new();
    match types.iter().find(|(id, _)| !seen.insert(*id)) {
        Some((_, name)) => {
            warn!("query requests `{name}` more than once; nothing visited");
            true
        }
        None => false,
    }
}

fn missing<T>(entity: Entity) -> EcsError {
    EcsError::ComponentMissing {
        entity,
        component: short_type_name(std::any::type_name::<T>()),
    }
}

/// `kindle::components::Position` → `Position`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
