//! # Kindle — Small 2D Game Framework
//!
//! An entity-component world with a priority-ordered system scheduler and a
//! queued event bus, plus the built-in systems a 2D game needs: platform
//! input, key chords, anchored layout, color effects and depth-sorted
//! drawing. Window and graphics are reached only through the
//! [`backend`] traits.
//!
//! Start with `use kindle::prelude::*` and implement an
//! [`Application`](app::Application).

pub mod app;
pub mod backend;
pub mod components;
pub mod config;
pub mod ecs;
pub mod effects;
pub mod error;
pub mod events;
pub mod input;
pub mod logging;
pub mod prelude;
pub mod settings;
pub mod systems;
pub mod time;
