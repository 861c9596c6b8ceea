//! # World — The Central Container
//!
//! The [`World`] owns all entities, components, globals, systems and the
//! event bus. It is the single `&mut` context handed to every system and
//! every event handler.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ World                                               │
//! │                                                     │
//! │  store:     ComponentStore                          │
//! │    entity allocator + one sparse set per type       │
//! │                                                     │
//! │  globals:   HashMap<TypeId, Box<dyn Any>>           │
//! │    GameTime, InputState, game state...              │
//! │                                                     │
//! │  events:    EventBus (queue + listener table)       │
//! │  scheduler: pending / active systems                │
//! │  errors:    failures contained during ticks         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## The tick
//!
//! ```text
//! tick()
//!   1. advance GameTime, start a new input frame
//!   2. admit pending systems        (init, then sorted into the active list)
//!   3. update active systems        (priority order)
//!   4. flush the event bus          (until empty, bounded)
//!   5. destroy entities queued with destroy_entity_later
//! ```
//!
//! ## Errors
//!
//! Store operations return [`Result`]. Failures inside the tick that no
//! caller can receive (a system's `init` failing) are logged and kept in an
//! error channel, drained with [`World::drain_errors`].
//!
//! ## Comparison
//!
//! - **bevy_ecs**: World + Schedule + Events are separate types wired by an
//!   App. Much more flexible, much more machinery.
//! - **hecs**: A World is only entities and components.
//!
//! We bundle everything a small 2D game needs behind one type.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use log::{trace, warn};

use super::bundle::SpawnBundle;
use super::entity::Entity;
use super::globals::Globals;
use super::query::Query;
use super::store::ComponentStore;
use super::system::Scheduler;
use crate::error::{EcsError, Result};
use crate::events::{ComponentAdded, EventBus};
use crate::input::InputState;
use crate::time::GameTime;

/// The central container for all game state.
pub struct World {
    store: ComponentStore,
    globals: Globals,
    pub(crate) events: EventBus,
    pub(crate) scheduler: Scheduler,
    errors: Vec<EcsError>,
    /// Entities to destroy once the current tick's flush is over.
    doomed: Vec<Entity>,
    ticking: bool,
    last_tick: Option<Instant>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// An empty world with [`GameTime`] and [`InputState`] already set.
    pub fn new() -> Self {
        let mut world = Self {
            store: ComponentStore::new(),
            globals: Globals::new(),
            events: EventBus::new(),
            scheduler: Scheduler::new(),
            errors: Vec::new(),
            doomed: Vec::new(),
            ticking: false,
            last_tick: None,
        };
        world.seed_globals();
        world
    }

    fn seed_globals(&mut self) {
        self.globals.set(GameTime::new());
        self.globals.set(InputState::default());
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Run one tick, advancing [`GameTime`] by the wall-clock time since the
    /// previous `tick()` (zero the first time).
    pub fn tick(&mut self) {
        let now = Instant::now();
        let delta = self.last_tick.map_or(Duration::ZERO, |last| now - last);
        self.last_tick = Some(now);
        self.tick_by(delta);
    }

    /// Run one tick with a fixed time step.
    pub fn tick_by(&mut self, delta: Duration) {
        if self.ticking {
            warn!("nested tick ignored");
            return;
        }
        self.ticking = true;

        self.globals.get_or_default::<GameTime>().advance(delta);
        self.globals.get_or_default::<InputState>().begin_frame();
        self.admit_pending_systems();
        self.run_systems();
        self.flush();
        self.apply_deferred_destruction();

        self.ticking = false;
    }

    /// Whether a tick is in progress.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// End every system, drop every listener, queued event, global and
    /// entity. `GameTime` and `InputState` are seeded again.
    pub fn clear(&mut self) {
        trace!("clearing world");
        self.events.discard_pending();
        self.end_all_systems();
        self.events.clear();
        self.doomed.clear();
        self.store.clear();
        self.globals.clear();
        self.seed_globals();
    }

    // ── Errors ───────────────────────────────────────────────────────

    /// Record a contained failure.
    pub fn report(&mut self, error: EcsError) {
        self.errors.push(error);
    }

    /// Failures recorded since the last drain.
    pub fn errors(&self) -> &[EcsError] {
        &self.errors
    }

    pub fn drain_errors(&mut self) -> Vec<EcsError> {
        std::mem::take(&mut self.errors)
    }

    // ── Entities ─────────────────────────────────────────────────────

    pub fn create_entity(&mut self) -> Entity {
        self.store.create_entity()
    }

    /// Create an entity with a tuple of components.
    ///
    /// ```ignore
    /// let e = world.spawn((Position::new(10.0, 10.0), Label::new("hi")));
    /// ```
    pub fn spawn<B: SpawnBundle>(&mut self, bundle: B) -> Entity {
        let entity = self.store.spawn(bundle);
        B::announce(self, entity);
        entity
    }

    /// Destroy `entity` and every component it carries, right now.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        self.store.destroy_entity(entity)
    }

    /// Destroy `entity` at the end of the current tick (or the next one, when
    /// called between ticks). Stale handles are ignored then.
    pub fn destroy_entity_later(&mut self, entity: Entity) {
        self.doomed.push(entity);
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.store.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.store.entity_count()
    }

    fn apply_deferred_destruction(&mut self) {
        for entity in std::mem::take(&mut self.doomed) {
            if self.store.destroy_entity(entity).is_err() {
                trace!("{entity:?} already gone before deferred destruction");
            }
        }
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach `value` to `entity`, replacing any existing `T`, and announce
    /// it with [`ComponentAdded<T>`] if anybody listens.
    pub fn attach<T: 'static + Send + Sync>(&mut self, entity: Entity, value: T) -> Result<()> {
        self.store.attach(entity, value)?;
        self.announce_added::<T>(entity);
        Ok(())
    }

    pub fn detach<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        self.store.detach(entity)
    }

    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Result<&T> {
        self.store.get(entity)
    }

    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Result<&mut T> {
        self.store.get_mut(entity)
    }

    pub fn try_get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        self.store.try_get(entity)
    }

    pub fn try_get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        self.store.try_get_mut(entity)
    }

    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.store.has::<T>(entity)
    }

    /// Number of entities carrying a `T`.
    pub fn count<T: 'static + Send + Sync>(&self) -> usize {
        self.store.len::<T>()
    }

    /// See [`ComponentStore::each`].
    pub fn each<Q: Query>(&mut self, f: impl FnMut(Entity, Q::Item<'_>)) {
        self.store.each::<Q>(f);
    }

    /// See [`ComponentStore::entities`].
    pub fn entities<Q: Query>(&self) -> Vec<Entity> {
        self.store.entities::<Q>()
    }

    pub fn iter<T: 'static + Send + Sync>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.store.iter::<T>()
    }

    /// See [`ComponentStore::sort`].
    pub fn sort<T: 'static + Send + Sync>(&mut self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.store.sort::<T>(compare);
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    pub(crate) fn announce_added<T: 'static>(&mut self, entity: Entity) {
        if self.events.has_listeners::<ComponentAdded<T>>() {
            self.events.emit(ComponentAdded::<T>::new(entity));
        }
    }

    // ── Globals ──────────────────────────────────────────────────────

    /// Insert or replace the global of type `T`.
    pub fn set_global<T: 'static + Send + Sync>(&mut self, value: T) {
        self.globals.set(value);
    }

    /// The global of type `T`, or [`EcsError::GlobalMissing`].
    pub fn global<T: 'static + Send + Sync>(&self) -> Result<&T> {
        self.globals.get()
    }

    pub fn global_mut<T: 'static + Send + Sync>(&mut self) -> Result<&mut T> {
        self.globals.get_mut()
    }

    pub fn try_global<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.globals.try_get()
    }

    pub fn try_global_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.globals.try_get_mut()
    }

    /// The global of type `T`, inserting `T::default()` first if unset.
    pub fn global_or_default<T: 'static + Send + Sync + Default>(&mut self) -> &mut T {
        self.globals.get_or_default()
    }

    pub fn has_global<T: 'static + Send + Sync>(&self) -> bool {
        self.globals.has::<T>()
    }

    pub fn remove_global<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.globals.remove()
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut Globals {
        &mut self.globals
    }

    /// Shorthand for the [`GameTime`] global.
    pub fn time(&self) -> GameTime {
        self.globals.try_get::<GameTime>().copied().unwrap_or_default()
    }
}
