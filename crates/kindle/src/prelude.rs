//! Convenience re-exports — `use kindle::prelude::*` for the common items.

pub use crate::app::{App, AppError, Application};
pub use crate::backend::{
    DrawCall, Platform, PlatformEvent, RecordingRenderer, Renderer, ScriptedPlatform,
};
pub use crate::components::{
    Alignment, Anchor, Color, Horizontal, Label, Layout, Position, Rect, Renderable, Size, Sprite,
    Vec2, Vertical,
};
pub use crate::config::AppConfig;
pub use crate::ecs::{Entity, SpawnBundle, System, SystemId, World, priority};
pub use crate::effects::AlternateColor;
pub use crate::error::{BoxError, EcsError};
pub use crate::events::{
    AppWantsClose, ComponentAdded, KeyDown, KeyUp, ListenerId, MouseButtonDown, MouseButtonUp,
    MouseMoved, Owner, ToggleFullscreen, WindowResized,
};
pub use crate::input::{Input, InputState, Key, KeyChord, Modifiers, MouseButton};
pub use crate::settings::Settings;
pub use crate::time::GameTime;
