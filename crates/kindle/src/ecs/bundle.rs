//! Tuples of components spawned together.

use super::entity::Entity;
use super::store::ComponentStore;
use super::world::World;

/// A tuple of components attached to a fresh entity in one call.
///
/// ```ignore
/// let e = world.spawn((Position::new(0.0, 0.0), Label::new("score")));
/// ```
pub trait SpawnBundle {
    /// Human-readable type names of the bundle's components.
    fn type_names() -> Vec<&'static str>;

    /// Attach every component to `entity`.
    fn insert_into(self, store: &mut ComponentStore, entity: Entity);

    /// Emit `ComponentAdded` for every component type somebody listens to.
    fn announce(world: &mut World, entity: Entity);
}

macro_rules! impl_spawn_bundle {
    ($($T:ident),+) => {
        impl<$($T: 'static + Send + Sync),+> SpawnBundle for ($($T,)+) {
            fn type_names() -> Vec<&'static str> {
                vec![$(std::any::type_name::<$T>()),+]
            }

            #[allow(non_snake_case)]
            fn insert_into(self, store: &mut ComponentStore, entity: Entity) {
                let ($($T,)+) = self;
                $(store.insert_unchecked::<$T>(entity, $T);)+
            }

            fn announce(world: &mut World, entity: Entity) {
                $(world.announce_added::<$T>(entity);)+
            }
        }
    };
}

impl_spawn_bundle!(A);
impl_spawn_bundle!(A, B);
impl_spawn_bundle!(A, B, C);
impl_spawn_bundle!(A, B, C, D);
impl_spawn_bundle!(A, B, C, D, E);
impl_spawn_bundle!(A, B, C, D, E, F);
impl_spawn_bundle!(A, B, C, D, E, F, G);
impl_spawn_bundle!(A, B, C, D, E, F, G, H);
