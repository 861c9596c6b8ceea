//! # Query — Visiting Entities by Component Type
//!
//! A query names the component types it needs, as `&T` (read) or `&mut T`
//! (write), alone or in a tuple. The store visits every entity holding all
//! of them:
//!
//! ```text
//! world.each::<(&mut Counter, &Label)>(|entity, (counter, label)| { ... });
//!
//! 1. Every requested storage must exist, otherwise nothing is visited.
//! 2. Extract the storages: take them out of the TypeId map.
//! 3. Walk the FIRST type's dense entity list (a snapshot of it).
//! 4. Fetch each entity from every extracted storage; skip on any miss.
//! 5. Restore the storages.
//! ```
//!
//! The first listed type therefore decides the visiting order, which is how
//! `sort::<Renderable>` turns into back-to-front drawing.
//!
//! ## Extract / restore
//!
//! Taking the storages out of the map lets the borrow checker see that
//! `&mut Counter` and `&Label` come from different boxes. Asking for the same
//! type twice in one query (`(&T, &mut T)`) would alias, so such a query
//! visits nothing and logs a warning.

use std::any::TypeId;

use super::entity::Entity;
use super::storage::{SparseSet, StorageMap};

/// A fetchable set of component references.
///
/// Implemented for `&T`, `&mut T` and tuples of those up to eight elements.
pub trait Query {
    /// What the visitor receives per entity.
    type Item<'w>;

    /// Storages taken out of the map for the duration of one pass.
    #[doc(hidden)]
    type Column;

    /// Component types the query needs, with their names.
    fn type_ids() -> Vec<(TypeId, &'static str)>;

    #[doc(hidden)]
    fn extract(storages: &mut StorageMap) -> Self::Column;

    #[doc(hidden)]
    fn restore(column: Self::Column, storages: &mut StorageMap);

    #[doc(hidden)]
    fn fetch(column: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>>;

    /// Entities of the first requested storage, in storage order.
    #[doc(hidden)]
    fn driver(column: &Self::Column) -> &[Entity];
}

fn take_typed<T: 'static + Send + Sync>(storages: &mut StorageMap) -> Box<SparseSet<T>> {
    storages
        .remove(&TypeId::of::<T>())
        .and_then(|erased| erased.into_any().downcast::<SparseSet<T>>().ok())
        .unwrap_or_else(|| {
            panic!(
                "query extract: storage for `{}` missing or requested twice",
                std::any::type_name::<T>()
            )
        })
}

impl<T: 'static + Send + Sync> Query for &T {
    type Item<'w> = &'w T;
    type Column = Box<SparseSet<T>>;

    fn type_ids() -> Vec<(TypeId, &'static str)> {
        vec![(TypeId::of::<T>(), std::any::type_name::<T>())]
    }

    fn extract(storages: &mut StorageMap) -> Self::Column {
        take_typed::<T>(storages)
    }

    fn restore(column: Self::Column, storages: &mut StorageMap) {
        storages.insert(TypeId::of::<T>(), column);
    }

    fn fetch(column: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
        column.get(entity)
    }

    fn driver(column: &Self::Column) -> &[Entity] {
        column.entities()
    }
}

impl<T: 'static + Send + Sync> Query for &mut T {
    type Item<'w> = &'w mut T;
    type Column = Box<SparseSet<T>>;

    fn type_ids() -> Vec<(TypeId, &'static str)> {
        vec![(TypeId::of::<T>(), std::any::type_name::<T>())]
    }

    fn extract(storages: &mut StorageMap) -> Self::Column {
        take_typed::<T>(storages)
    }

    fn restore(column: Self::Column, storages: &mut StorageMap) {
        storages.insert(TypeId::of::<T>(), column);
    }

    fn fetch(column: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
        column.get_mut(entity)
    }

    fn driver(column: &Self::Column) -> &[Entity] {
        column.entities()
    }
}

/// `Query` for tuples: `(&A, &mut B, ...)` yields `(&A, &mut B, ...)`.
macro_rules! impl_query_tuple {
    ($First:ident $(, $P:ident)*) => {
        impl<$First: Query $(, $P: Query)*> Query for ($First, $($P,)*) {
            type Item<'w> = ($First::Item<'w>, $($P::Item<'w>,)*);
            type Column = ($First::Column, $($P::Column,)*);

            fn type_ids() -> Vec<(TypeId, &'static str)> {
                let mut ids = $First::type_ids();
                $(ids.extend($P::type_ids());)*
                ids
            }

            fn extract(storages: &mut StorageMap) -> Self::Column {
                ($First::extract(storages), $($P::extract(storages),)*)
            }

            #[allow(non_snake_case)]
            fn restore(column: Self::Column, storages: &mut StorageMap) {
                let ($First, $($P,)*) = column;
                $First::restore($First, storages);
                $($P::restore($P, storages);)*
            }

            #[allow(non_snake_case)]
            fn fetch(column: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
                let ($First, $($P,)*) = column;
                Some(($First::fetch($First, entity)?, $($P::fetch($P, entity)?,)*))
            }

            fn driver(column: &Self::Column) -> &[Entity] {
                $First::driver(&column.0)
            }
        }
    };
}

impl_query_tuple!(A);
impl_query_tuple!(A, B);
impl_query_tuple!(A, B, C);
impl_query_tuple!(A, B, C, D);
impl_query_tuple!(A, B, C, D, E);
impl_query_tuple!(A, B, C, D, E, F);
impl_query_tuple!(A, B, C, D, E, F, G);
impl_query_tuple!(A, B, C, D, E, F, G, H);
