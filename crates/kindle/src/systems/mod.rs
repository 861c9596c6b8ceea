//! # Built-in Systems
//!
//! The systems every [`App`](crate::app::App) registers before the game's own,
//! at fixed priorities around the game's `NORMAL` band:
//!
//! ```text
//! PLATFORM_EVENTS  PlatformEventsSystem  platform → KeyDown, MouseMoved, ...
//! KEYS             KeysSystem            exit / fullscreen chords
//!   ...            game systems
//! EFFECTS          EffectsSystem         AlternateColor → Color
//! LAYOUT           LayoutSystem          Anchor + Position → Layout
//! RENDER           RenderSystem          depth-sorted draw calls
//! ```
//!
//! Layout and keys react to events, so their work for a frame happens in the
//! flush at the end of the tick that emitted them.

pub mod effects;
pub mod keys;
pub mod layout;
pub mod platform;
pub mod render;

pub use effects::EffectsSystem;
pub use keys::KeysSystem;
pub use layout::LayoutSystem;
pub use platform::{PlatformEventsSystem, visible_area};
pub use render::RenderSystem;
