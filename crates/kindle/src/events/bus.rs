//! # Event Bus — Queued, Typed Publish/Subscribe
//!
//! ```text
//! emit(KeyUp)  ──► queue: [KeyUp, WindowResized, KeyUp]   (global FIFO)
//!                              │
//!                       flush (end of tick)
//!                              ▼
//! listeners[TypeId::of::<KeyUp>()] = [keys system, game handler, ...]
//! ```
//!
//! ## Delivery
//!
//! Queued events are delivered in emission order, each to the listeners
//! subscribed to its type at the moment it is delivered, in subscription
//! order. Events emitted by handlers during a flush are delivered in the same
//! flush, in a later pass. After [`MAX_FLUSH_PASSES`] passes whatever is
//! still queued waits for the next tick, so two handlers that keep
//! re-emitting each other cannot hang the frame.
//!
//! ## Owners
//!
//! Every listener belongs to an [`Owner`]. A system's listeners are owned by
//! its [`SystemId`] and vanish when the system is removed. Other code asks
//! the world for a fresh owner handle and drops its listeners in bulk with
//! `unsubscribe_all`.
//!
//! ## Handlers and the world
//!
//! A handler is `FnMut(&mut World, &E)`. While it runs, its boxed callback is
//! out of the listener table, so it is free to emit, subscribe, unsubscribe
//! (itself included) or remove systems. Listener ids are re-checked before
//! each call: a listener unsubscribed mid-flush is never called again, not
//! even for the event currently being delivered.

use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};

use log::{trace, warn};

use crate::ecs::system::{System, SystemId};
use crate::ecs::World;
use crate::error::{EcsError, Result};

/// Upper bound on delivery passes in one flush.
pub const MAX_FLUSH_PASSES: usize = 64;

/// Groups listeners for bulk removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Listeners registered by (or on behalf of) a system.
    System(SystemId),
    /// A handle from [`World::new_owner`].
    Handle(u64),
}

impl From<SystemId> for Owner {
    fn from(id: SystemId) -> Self {
        Owner::System(id)
    }
}

/// Identifies one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&mut World, &dyn Any)>;

struct Listener {
    id: ListenerId,
    owner: Owner,
    /// `None` while the callback is running.
    callback: Option<Callback>,
}

struct QueuedEvent {
    type_id: TypeId,
    type_name: &'static str,
    payload: Box<dyn Any>,
}

/// Event queue plus the listener table.
#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<QueuedEvent>,
    listeners: HashMap<TypeId, Vec<Listener>>,
    next_listener: u64,
    next_owner: u64,
    flushing: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next flush.
    pub fn emit<E: 'static>(&mut self, event: E) {
        self.queue.push_back(QueuedEvent {
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            payload: Box::new(event),
        });
    }

    /// Register a handler for `E`. Handlers run in subscription order.
    pub fn subscribe<E: 'static>(
        &mut self,
        owner: Owner,
        mut handler: impl FnMut(&mut World, &E) + 'static,
    ) -> ListenerId {
        let callback: Callback = Box::new(move |world: &mut World, payload: &dyn Any| {
            if let Some(event) = payload.downcast_ref::<E>() {
                handler(world, event);
            }
        });
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Listener {
                id,
                owner,
                callback: Some(callback),
            });
        trace!(
            "listener {id:?} ({owner:?}) subscribed to `{}`",
            std::any::type_name::<E>()
        );
        id
    }

    /// Remove one listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(pos) = listeners.iter().position(|l| l.id == listener) {
                listeners.remove(pos);
                return true;
            }
        }
        false
    }

    /// Remove every listener belonging to `owner`. Returns how many went.
    pub fn unsubscribe_all(&mut self, owner: Owner) -> usize {
        let mut removed = 0;
        for listeners in self.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|l| l.owner != owner);
            removed += before - listeners.len();
        }
        if removed > 0 {
            trace!("{removed} listener(s) of {owner:?} unsubscribed");
        }
        removed
    }

    /// Drop every queued event without delivering it.
    pub fn discard_pending(&mut self) {
        if !self.queue.is_empty() {
            trace!("discarding {} pending event(s)", self.queue.len());
        }
        self.queue.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn has_listeners<E: 'static>(&self) -> bool {
        self.listener_count::<E>() > 0
    }

    pub fn listener_count<E: 'static>(&self) -> usize {
        self.listeners
            .get(&TypeId::of::<E>())
            .map_or(0, |listeners| listeners.len())
    }

    /// Drop every listener and every queued event.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.listeners.clear();
    }

    fn new_owner(&mut self) -> Owner {
        let owner = Owner::Handle(self.next_owner);
        self.next_owner += 1;
        owner
    }

    fn listener_ids(&self, type_id: TypeId) -> Vec<ListenerId> {
        self.listeners
            .get(&type_id)
            .map(|listeners| listeners.iter().map(|l| l.id).collect())
            .unwrap_or_default()
    }

    fn take_callback(&mut self, type_id: TypeId, id: ListenerId) -> Option<Callback> {
        self.listeners
            .get_mut(&type_id)?
            .iter_mut()
            .find(|l| l.id == id)?
            .callback
            .take()
    }

    /// Put a callback back. Dropped if its listener was removed meanwhile.
    fn restore_callback(&mut self, type_id: TypeId, id: ListenerId, callback: Callback) {
        if let Some(listener) = self
            .listeners
            .get_mut(&type_id)
            .and_then(|listeners| listeners.iter_mut().find(|l| l.id == id))
        {
            listener.callback = Some(callback);
        }
    }
}

// ── World integration ────────────────────────────────────────────────

impl World {
    /// Queue an event. Delivered when the current (or next) tick flushes.
    pub fn emit<E: 'static>(&mut self, event: E) {
        self.events.emit(event);
    }

    /// Register a handler for `E` under `owner`.
    ///
    /// ```ignore
    /// let owner = world.new_owner();
    /// world.subscribe::<KeyUp>(owner, |world, key| {
    ///     if key.key == Key::Space {
    ///         world.emit(Jump);
    ///     }
    /// });
    /// ```
    pub fn subscribe<E: 'static>(
        &mut self,
        owner: impl Into<Owner>,
        handler: impl FnMut(&mut World, &E) + 'static,
    ) -> ListenerId {
        self.events.subscribe(owner.into(), handler)
    }

    /// Register a method of the running system as a handler for `E`.
    ///
    /// Must be called from inside a system's `init` or `update`; the listener
    /// is owned by that system and removed with it. At delivery the system is
    /// looked up by id and downcast to `S`; if it is gone or busy the handler
    /// is skipped.
    ///
    /// ```ignore
    /// impl System for KeysSystem {
    ///     fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
    ///         world.listen(KeysSystem::key_up)?;
    ///         Ok(())
    ///     }
    /// }
    /// ```
    pub fn listen<E: 'static, S: System>(
        &mut self,
        mut method: impl FnMut(&mut S, &mut World, &E) + 'static,
    ) -> Result<ListenerId> {
        let id = self.current_system().ok_or(EcsError::NoRunningSystem)?;
        Ok(self.events.subscribe(Owner::System(id), move |world, event: &E| {
            let delivered = world.with_system::<S>(id, |system, world| method(system, world, event));
            if !delivered {
                warn!(
                    "`{}` handler skipped: system {id:?} is not available",
                    std::any::type_name::<E>()
                );
            }
        }))
    }

    pub fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        self.events.unsubscribe(listener)
    }

    pub fn unsubscribe_all(&mut self, owner: impl Into<Owner>) -> usize {
        self.events.unsubscribe_all(owner.into())
    }

    /// A fresh owner handle for listeners that do not belong to a system.
    pub fn new_owner(&mut self) -> Owner {
        self.events.new_owner()
    }

    pub fn discard_pending_events(&mut self) {
        self.events.discard_pending();
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.pending_count()
    }

    /// Whether anybody listens to `E` right now.
    pub fn has_listeners<E: 'static>(&self) -> bool {
        self.events.has_listeners::<E>()
    }

    /// Deliver queued events until the queue is empty or
    /// [`MAX_FLUSH_PASSES`] passes have run.
    ///
    /// A flush called from inside a handler, or from a system's `init` or
    /// `update`, is ignored: the running system is out of its slot and could
    /// not receive its own bound events. The queue waits for the tick's flush.
    pub fn flush(&mut self) {
        if self.events.flushing {
            trace!("nested flush ignored");
            return;
        }
        if let Some(id) = self.current_system() {
            trace!("flush from running system {id:?} deferred to the tick");
            return;
        }
        self.events.flushing = true;

        let mut passes = 0;
        while !self.events.queue.is_empty() {
            if passes == MAX_FLUSH_PASSES {
                warn!(
                    "event flush stopped after {MAX_FLUSH_PASSES} passes; {} event(s) left for the next tick",
                    self.events.queue.len()
                );
                break;
            }
            passes += 1;
            let batch = std::mem::take(&mut self.events.queue);
            for event in batch {
                self.deliver(event);
            }
        }

        self.events.flushing = false;
    }

    fn deliver(&mut self, event: QueuedEvent) {
        let ids = self.events.listener_ids(event.type_id);
        if ids.is_empty() {
            trace!("no listeners for `{}`", event.type_name);
            return;
        }
        for id in ids {
            let Some(mut callback) = self.events.take_callback(event.type_id, id) else {
                continue;
            };
            callback(self, &*event.payload);
            self.events.restore_callback(event.type_id, id, callback);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Ping(u32);

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Pong(u32);

    type Log = Rc<RefCell<Vec<String>>>;

    fn record(log: &Log, entry: impl Into<String>) {
        log.borrow_mut().push(entry.into());
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let log = Log::default();
        let mut world = World::new();
        let owner = world.new_owner();
        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            world.subscribe::<Ping>(owner, move |_, ping| record(&log, format!("{tag}{}", ping.0)));
        }
        world.emit(Ping(1));
        world.emit(Ping(2));
        world.flush();
        assert_eq!(*log.borrow(), vec!["a1", "b1", "c1", "a2", "b2", "c2"]);
    }

    #[test]
    fn emit_without_listeners_is_fine() {
        let mut world = World::new();
        world.emit(Ping(1));
        world.flush();
        assert_eq!(world.pending_event_count(), 0);
    }

    #[test]
    fn nothing_is_delivered_before_flush() {
        let log = Log::default();
        let mut world = World::new();
        let owner = world.new_owner();
        let sink = Rc::clone(&log);
        world.subscribe::<Ping>(owner, move |_, _| record(&sink, "ping"));
        world.emit(Ping(0));
        assert!(log.borrow().is_empty());
        assert_eq!(world.pending_event_count(), 1);
    }

    #[test]
    fn cascading_events_delivered_in_same_flush() {
        let log = Log::default();
        let mut world = World::new();
        let owner = world.new_owner();
        world.subscribe::<Ping>(owner, |world, ping| world.emit(Pong(ping.0 + 1)));
        let sink = Rc::clone(&log);
        world.subscribe::<Pong>(owner, move |_, pong| record(&sink, format!("pong{}", pong.0)));

        world.emit(Ping(1));
        world.flush();
        assert_eq!(*log.borrow(), vec!["pong2"]);
        assert_eq!(world.pending_event_count(), 0);
    }

    #[test]
    fn cascade_preserves_global_order() {
        let log = Log::default();
        let mut world = World::new();
        let owner = world.new_owner();
        let sink = Rc::clone(&log);
        world.subscribe::<Ping>(owner, move |world, ping| {
            record(&sink, format!("ping{}", ping.0));
            world.emit(Pong(ping.0));
        });
        let sink = Rc::clone(&log);
        world.subscribe::<Pong>(owner, move |_, pong| record(&sink, format!("pong{}", pong.0)));

        world.emit(Ping(1));
        world.emit(Ping(2));
        world.flush();
        assert_eq!(*log.borrow(), vec!["ping1", "ping2", "pong1", "pong2"]);
    }

    #[test]
    fn endless_cascade_is_bounded() {
        let mut world = World::new();
        let owner = world.new_owner();
        let passes = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&passes);
        world.subscribe::<Ping>(owner, move |world, ping| {
            *counter.borrow_mut() += 1;
            world.emit(Ping(ping.0 + 1));
        });
        world.emit(Ping(0));
        world.flush();
        assert_eq!(*passes.borrow(), MAX_FLUSH_PASSES);
        assert_eq!(world.pending_event_count(), 1);
    }

    #[test]
    fn unsubscribed_mid_flush_is_not_called_again() {
        let log = Log::default();
        let mut world = World::new();
        let owner = world.new_owner();
        let second: Rc<RefCell<Option<ListenerId>>> = Rc::default();

        let target = Rc::clone(&second);
        world.subscribe::<Ping>(owner, move |world, _| {
            if let Some(id) = target.borrow_mut().take() {
                world.unsubscribe(id);
            }
        });
        let sink = Rc::clone(&log);
        let id = world.subscribe::<Ping>(owner, move |_, _| record(&sink, "second"));
        *second.borrow_mut() = Some(id);

        world.emit(Ping(0));
        world.emit(Ping(1));
        world.flush();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn handler_may_unsubscribe_itself() {
        let log = Log::default();
        let mut world = World::new();
        let owner = world.new_owner();
        let me: Rc<RefCell<Option<ListenerId>>> = Rc::default();
        let slot = Rc::clone(&me);
        let sink = Rc::clone(&log);
        let id = world.subscribe::<Ping>(owner, move |world, _| {
            record(&sink, "once");
            if let Some(id) = *slot.borrow() {
                world.unsubscribe(id);
            }
        });
        *me.borrow_mut() = Some(id);

        world.emit(Ping(0));
        world.emit(Ping(1));
        world.flush();
        assert_eq!(*log.borrow(), vec!["once"]);
        assert!(!world.has_listeners::<Ping>());
    }

    #[test]
    fn unsubscribe_all_only_touches_owner() {
        let mut world = World::new();
        let a = world.new_owner();
        let b = world.new_owner();
        world.subscribe::<Ping>(a, |_, _| {});
        world.subscribe::<Pong>(a, |_, _| {});
        world.subscribe::<Ping>(b, |_, _| {});

        assert_eq!(world.unsubscribe_all(a), 2);
        assert!(world.has_listeners::<Ping>());
        assert!(!world.has_listeners::<Pong>());
        assert_eq!(world.unsubscribe_all(a), 0);
    }

    #[test]
    fn nested_flush_is_ignored() {
        let log = Log::default();
        let mut world = World::new();
        let owner = world.new_owner();
        let sink = Rc::clone(&log);
        world.subscribe::<Ping>(owner, move |world, ping| {
            record(&sink, format!("ping{}", ping.0));
            if ping.0 == 0 {
                world.emit(Ping(1));
                world.flush();
                record(&sink, "after nested flush");
            }
        });
        world.emit(Ping(0));
        world.flush();
        assert_eq!(*log.borrow(), vec!["ping0", "after nested flush", "ping1"]);
    }

    #[test]
    fn discard_pending_drops_queue() {
        let log = Log::default();
        let mut world = World::new();
        let owner = world.new_owner();
        let sink = Rc::clone(&log);
        world.subscribe::<Ping>(owner, move |_, _| record(&sink, "ping"));
        world.emit(Ping(0));
        world.discard_pending_events();
        world.flush();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn listen_outside_a_system_fails() {
        struct Idle;
        impl System for Idle {
            fn update(&mut self, _world: &mut World) {}
        }
        impl Idle {
            fn on_ping(&mut self, _world: &mut World, _ping: &Ping) {}
        }

        let mut world = World::new();
        assert!(matches!(
            world.listen(Idle::on_ping),
            Err(EcsError::NoRunningSystem)
        ));
    }

    /// Counts pings through a bound method; removes itself at three.
    struct PingCounter {
        seen: Rc<RefCell<u32>>,
    }

    impl PingCounter {
        fn on_ping(&mut self, world: &mut World, _ping: &Ping) {
            *self.seen.borrow_mut() += 1;
            if *self.seen.borrow() == 3 {
                world.remove_system::<PingCounter>();
            }
        }
    }

    impl System for PingCounter {
        fn init(&mut self, world: &mut World) -> std::result::Result<(), crate::error::BoxError> {
            world.listen(PingCounter::on_ping)?;
            Ok(())
        }

        fn update(&mut self, _world: &mut World) {}
    }

    /// Emits a ping and asks for an immediate flush from its own `update`.
    struct Echo {
        heard: Rc<RefCell<Vec<u32>>>,
    }

    impl Echo {
        fn on_ping(&mut self, _world: &mut World, ping: &Ping) {
            self.heard.borrow_mut().push(ping.0);
        }
    }

    impl System for Echo {
        fn init(&mut self, world: &mut World) -> std::result::Result<(), crate::error::BoxError> {
            world.listen(Echo::on_ping)?;
            Ok(())
        }

        fn update(&mut self, world: &mut World) {
            world.emit(Ping(7));
            world.flush();
            assert_eq!(world.pending_event_count(), 1);
        }
    }

    #[test]
    fn flush_inside_update_leaves_events_for_the_tick() {
        let heard = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.add_system(Echo {
            heard: Rc::clone(&heard),
        });
        world.tick_by(std::time::Duration::ZERO);
        assert_eq!(*heard.borrow(), vec![7]);
        assert_eq!(world.pending_event_count(), 0);
    }

    #[test]
    fn bound_listener_dies_with_its_system() {
        let seen = Rc::new(RefCell::new(0));
        let mut world = World::new();
        world.add_system(PingCounter {
            seen: Rc::clone(&seen),
        });
        world.tick_by(std::time::Duration::ZERO);
        assert!(world.has_listeners::<Ping>());

        for i in 0..5 {
            world.emit(Ping(i));
        }
        world.flush();
        assert_eq!(*seen.borrow(), 3);
        assert!(!world.has_listeners::<Ping>());
        assert_eq!(world.system_count(), 0);
    }
}
