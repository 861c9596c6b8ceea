//! # Events — Typed Notifications Between Systems
//!
//! Producers [`emit`](crate::ecs::World::emit) plain values; the world queues
//! them and delivers them to subscribers at the end of the tick (see
//! [`bus`]). Any `'static` type can be an event. The ones below are emitted by
//! the framework itself.
//!
//! Events carry no reference to the world. Handlers receive `&mut World` as
//! an argument when they are called.

use std::fmt;
use std::marker::PhantomData;

use glam::Vec2;

use crate::components::Rect;
use crate::ecs::Entity;
use crate::input::{Key, Modifiers, MouseButton};

pub mod bus;

pub use bus::{EventBus, ListenerId, MAX_FLUSH_PASSES, Owner};

/// Somebody (the platform, the keys system, game code) asked the application
/// to close. The app driver stops after the tick that delivered it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppWantsClose;

/// Switch between windowed and fullscreen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleFullscreen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDown {
    pub key: Key,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUp {
    pub key: Key,
    pub modifiers: Modifiers,
}

/// Cursor moved. Position in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMoved {
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseButtonDown {
    pub button: MouseButton,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseButtonUp {
    pub button: MouseButton,
    pub position: Vec2,
}

/// The window changed size. `logical` is the area of the window the game's
/// logical resolution maps onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowResized {
    pub window: Vec2,
    pub logical: Rect,
}

/// A `T` was attached to `entity`.
///
/// Only emitted when at least one listener for `ComponentAdded<T>` exists,
/// so unobserved component types cost nothing.
pub struct ComponentAdded<T> {
    pub entity: Entity,
    _component: PhantomData<fn() -> T>,
}

impl<T> ComponentAdded<T> {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            _component: PhantomData,
        }
    }
}

impl<T> Clone for ComponentAdded<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentAdded<T> {}

impl<T> PartialEq for ComponentAdded<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<T> fmt::Debug for ComponentAdded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentAdded")
            .field("component", &std::any::type_name::<T>())
            .field("entity", &self.entity)
            .finish()
    }
}
