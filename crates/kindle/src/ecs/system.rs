//! # System — Per-Tick Logic With a Lifecycle
//!
//! A system is a value implementing [`System`]: `init` once when it becomes
//! active, `update` every tick, `end` once when it is removed.
//!
//! ## Lifecycle
//!
//! ```text
//! add_system ──► pending ──(next tick boundary: init Ok)──► active ──► removed
//!                   │                    │                               ▲
//!                   │                    └─(init Err: reported, no end)   │
//!                   └─(remove_system: dropped, no init/end)   remove_system: end
//! ```
//!
//! Systems added while a tick is running (from `update` or an event
//! handler) wait in the pending list until the next tick starts, so the
//! active list never grows under the scheduler's feet.
//!
//! ## Ordering
//!
//! Active systems run by [`priority`], highest first. Systems with equal
//! priority run in the order they were added. The order is re-established
//! after every admission, so it is total and reproducible.
//!
//! ## Take-out, put-back
//!
//! The world owns its systems, yet `update` needs `&mut World`. The scheduler
//! takes the box out of its slot for the duration of the call and puts it
//! back afterwards. A system removed while it is out (typically removing
//! itself) has its slot marked; `end` runs as soon as the call returns.
//!
//! ## Comparison
//!
//! - **bevy_ecs**: Systems are functions with injected parameters, scheduled
//!   into sets with explicit ordering constraints.
//! - **entt-style engines**: Systems are objects with virtual `init` /
//!   `update` / `end`, sorted by an integer priority. We follow this model.

use std::any::{Any, TypeId};
use std::cmp::Reverse;

use log::{debug, error, trace};

use super::world::World;
use crate::error::{BoxError, EcsError};
use crate::events::Owner;

/// Named priority levels. Higher runs first.
pub mod priority {
    pub const HIGHEST: i32 = i32::MAX;
    pub const HIGH: i32 = HIGHEST >> 1;
    pub const NORMAL: i32 = 0;
    pub const LOW: i32 = LOWEST >> 1;
    pub const LOWEST: i32 = i32::MIN;

    /// Slot for systems that must see the frame before any game logic.
    pub const BEFORE_APPLICATIONS: i32 = HIGHEST;
    /// Slot for systems that must see the frame after all game logic.
    pub const AFTER_APPLICATIONS: i32 = LOWEST;

    pub const PLATFORM_EVENTS: i32 = BEFORE_APPLICATIONS;
    pub const KEYS: i32 = PLATFORM_EVENTS - 1;
    pub const RENDER: i32 = AFTER_APPLICATIONS;
    pub const LAYOUT: i32 = RENDER + 1;
    pub const EFFECTS: i32 = LAYOUT + 1;
}

/// Upcast to `Any` so a system can be recovered as its concrete type.
///
/// Blanket-implemented for every `'static` type; never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of per-tick logic owned by the [`World`].
///
/// ```ignore
/// struct Spin;
///
/// impl System for Spin {
///     fn update(&mut self, world: &mut World) {
///         world.each::<(&mut Rotation,)>(|_, (r,)| r.0 += 0.1);
///     }
/// }
/// ```
pub trait System: AsAny {
    /// Called once, at the first tick boundary after the system was added.
    /// An error keeps the system from ever becoming active.
    fn init(&mut self, _world: &mut World) -> Result<(), BoxError> {
        Ok(())
    }

    fn update(&mut self, world: &mut World);

    /// Called once when an active system is removed or the world is cleared.
    fn end(&mut self, _world: &mut World) {}

    /// Name used in logs, errors and timings.
    fn name(&self) -> String {
        short_system_name(std::any::type_name::<Self>())
    }
}

/// Any `FnMut(&mut World)` is a system with no `init` and no `end`.
impl<F: FnMut(&mut World) + 'static> System for F {
    fn update(&mut self, world: &mut World) {
        (self)(world);
    }
}

/// Handle to a system added to a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub(crate) u64);

struct SystemSlot {
    id: SystemId,
    name: String,
    type_id: TypeId,
    priority: i32,
    order: u64,
    removed: bool,
    /// `None` while the system is out running `init` / `update` / a handler.
    system: Option<Box<dyn System>>,
}

/// Per-system timing recorded during the last tick.
#[cfg(feature = "diagnostics")]
#[derive(Clone, Debug)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// Pending and active systems plus the id of the one currently running.
#[derive(Default)]
pub(crate) struct Scheduler {
    next_id: u64,
    next_order: u64,
    pending: Vec<SystemSlot>,
    active: Vec<SystemSlot>,
    current: Option<SystemId>,
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_pending(&mut self, system: Box<dyn System>, type_id: TypeId, priority: i32) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;
        let order = self.next_order;
        self.next_order += 1;
        let name = system.name();
        debug!("system `{name}` queued with priority {priority}");
        self.pending.push(SystemSlot {
            id,
            name,
            type_id,
            priority,
            order,
            removed: false,
            system: Some(system),
        });
        id
    }

    fn active_slot_mut(&mut self, id: SystemId) -> Option<&mut SystemSlot> {
        self.active.iter_mut().find(|slot| slot.id == id && !slot.removed)
    }

    fn sort_active(&mut self) {
        self.active.retain(|slot| !slot.removed);
        self.active
            .sort_by_key(|slot| (Reverse(slot.priority), slot.order));
    }

    /// The system whose `init` / `update` is on the stack, if any.
    pub fn current(&self) -> Option<SystemId> {
        self.current
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|slot| !slot.removed).count()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Names of the active systems in execution order.
    pub fn active_names(&self) -> Vec<&str> {
        self.active
            .iter()
            .filter(|slot| !slot.removed)
            .map(|slot| slot.name.as_str())
            .collect()
    }

    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }
}

// ── World integration ────────────────────────────────────────────────

impl World {
    /// Queue a system at [`priority::NORMAL`]. It is initialised and starts
    /// updating at the next tick.
    pub fn add_system<S: System>(&mut self, system: S) -> SystemId {
        self.add_system_with_priority(system, priority::NORMAL)
    }

    pub fn add_system_with_priority<S: System>(&mut self, system: S, priority: i32) -> SystemId {
        self.scheduler
            .push_pending(Box::new(system), TypeId::of::<S>(), priority)
    }

    /// Remove the first system of type `S`, active ones before pending ones.
    pub fn remove_system<S: System>(&mut self) -> bool {
        let type_id = TypeId::of::<S>();
        let target = self
            .scheduler
            .active
            .iter()
            .chain(self.scheduler.pending.iter())
            .find(|slot| slot.type_id == type_id && !slot.removed)
            .map(|slot| slot.id);
        target.is_some_and(|id| self.remove_system_by_id(id))
    }

    /// Remove a system. Returns `false` if it is unknown or already removed.
    ///
    /// An idle active system gets `end` right away; a system removing itself
    /// gets it once its current call returns. A pending system is dropped
    /// without ever seeing `init` or `end`.
    pub fn remove_system_by_id(&mut self, id: SystemId) -> bool {
        if let Some(pos) = self.scheduler.pending.iter().position(|slot| slot.id == id) {
            let slot = self.scheduler.pending.remove(pos);
            debug!("pending system `{}` dropped", slot.name);
            return true;
        }
        let Some(slot) = self.scheduler.active_slot_mut(id) else {
            return false;
        };
        slot.removed = true;
        let name = slot.name.clone();
        match slot.system.take() {
            Some(system) => self.retire_system(id, &name, system),
            None => trace!("system `{name}` marked for removal while running"),
        }
        true
    }

    pub fn has_system<S: System>(&self) -> bool {
        let type_id = TypeId::of::<S>();
        self.scheduler
            .active
            .iter()
            .chain(self.scheduler.pending.iter())
            .any(|slot| slot.type_id == type_id && !slot.removed)
    }

    /// The system whose `init`, `update` or bound handler is running.
    ///
    /// A system subscribes closures under this id so they go away with it:
    ///
    /// ```ignore
    /// fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
    ///     let me = world.current_system().ok_or(EcsError::NoRunningSystem)?;
    ///     world.subscribe::<KeyUp>(me, |world, key| { ... });
    ///     Ok(())
    /// }
    /// ```
    pub fn current_system(&self) -> Option<SystemId> {
        self.scheduler.current()
    }

    pub fn system_count(&self) -> usize {
        self.scheduler.active_count()
    }

    pub fn pending_system_count(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Names of the active systems in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.scheduler.active_names()
    }

    /// Per-system timings from the most recent tick.
    #[cfg(feature = "diagnostics")]
    pub fn system_timings(&self) -> &[SystemTiming] {
        self.scheduler.timings()
    }

    /// Run `f` on the live system `id`, downcast to `S`.
    ///
    /// Returns `false` without calling `f` when the system is gone, is busy
    /// (its own call is on the stack) or is not an `S`.
    pub(crate) fn with_system<S: System>(
        &mut self,
        id: SystemId,
        f: impl FnOnce(&mut S, &mut World),
    ) -> bool {
        let Some(mut system) = self
            .scheduler
            .active_slot_mut(id)
            .and_then(|slot| slot.system.take())
        else {
            return false;
        };
        let previous = self.scheduler.current.replace(id);
        let called = match (*system).as_any_mut().downcast_mut::<S>() {
            Some(typed) => {
                f(typed, self);
                true
            }
            None => false,
        };
        self.scheduler.current = previous;
        self.put_back(id, system);
        called
    }

    /// Admit every pending system: `init`, then join the sorted active list.
    ///
    /// Slots stay in the pending list until their turn, so an `init` that
    /// removes a later system of the same batch drops it before it starts.
    /// Systems added by an `init` wait for the next tick.
    pub(crate) fn admit_pending_systems(&mut self) {
        let batch: Vec<SystemId> = self.scheduler.pending.iter().map(|slot| slot.id).collect();
        if batch.is_empty() {
            return;
        }
        for id in batch {
            let Some(pos) = self.scheduler.pending.iter().position(|slot| slot.id == id) else {
                continue;
            };
            let mut slot = self.scheduler.pending.remove(pos);
            let Some(mut system) = slot.system.take() else {
                continue;
            };
            let name = slot.name.clone();
            self.scheduler.active.push(slot);

            let previous = self.scheduler.current.replace(id);
            let result = system.init(self);
            self.scheduler.current = previous;

            match result {
                Ok(()) => {
                    debug!("system `{name}` initialised");
                    self.put_back(id, system);
                }
                Err(reason) => {
                    error!("system `{name}` failed to initialise: {reason}");
                    self.scheduler.active.retain(|slot| slot.id != id);
                    self.events.unsubscribe_all(Owner::from(id));
                    self.report(EcsError::SystemInitFailure {
                        system: name,
                        reason: reason.to_string(),
                    });
                }
            }
        }
        self.scheduler.sort_active();
    }

    /// Update every active system once, in order.
    pub(crate) fn run_systems(&mut self) {
        #[cfg(feature = "diagnostics")]
        self.scheduler.timings.clear();

        let mut index = 0;
        while index < self.scheduler.active.len() {
            let slot = &mut self.scheduler.active[index];
            index += 1;
            if slot.removed {
                continue;
            }
            let Some(mut system) = slot.system.take() else {
                continue;
            };
            let id = slot.id;

            #[cfg(feature = "diagnostics")]
            let (name, start) = (slot.name.clone(), std::time::Instant::now());

            let previous = self.scheduler.current.replace(id);
            system.update(self);
            self.scheduler.current = previous;

            #[cfg(feature = "diagnostics")]
            self.scheduler.timings.push(SystemTiming {
                name,
                duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
            });

            self.put_back(id, system);
        }
        self.scheduler.active.retain(|slot| !slot.removed);
    }

    /// End and drop every system, active and pending.
    pub(crate) fn end_all_systems(&mut self) {
        self.scheduler.pending.clear();
        let active = std::mem::take(&mut self.scheduler.active);
        for mut slot in active {
            if let Some(system) = slot.system.take() {
                if !slot.removed {
                    self.retire_system(slot.id, &slot.name, system);
                }
            }
        }
    }

    /// Return a system to its slot, or end it if it was removed meanwhile.
    fn put_back(&mut self, id: SystemId, system: Box<dyn System>) {
        match self.scheduler.active.iter_mut().find(|slot| slot.id == id) {
            Some(slot) if !slot.removed => slot.system = Some(system),
            Some(slot) => {
                let name = slot.name.clone();
                self.retire_system(id, &name, system);
            }
            None => {
                let name = system.name();
                self.retire_system(id, &name, system);
            }
        }
    }

    fn retire_system(&mut self, id: SystemId, name: &str, mut system: Box<dyn System>) {
        system.end(self);
        self.events.unsubscribe_all(Owner::from(id));
        debug!("system `{name}` removed");
    }
}

/// Strip the module path from a type name (`game::systems::Spin` → `Spin`,
/// closures → `<closure>`).
pub(crate) fn short_system_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base);
    if full.contains("{{closure}}") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}
