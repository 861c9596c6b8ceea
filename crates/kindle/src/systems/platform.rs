//! Translates raw [`PlatformEvent`]s into world events and [`InputState`].

use glam::Vec2;
use log::{debug, trace};

use crate::backend::{Platform, PlatformEvent};
use crate::components::Rect;
use crate::ecs::{System, World};
use crate::error::BoxError;
use crate::events::{
    AppWantsClose, KeyDown, KeyUp, MouseButtonDown, MouseButtonUp, MouseMoved, WindowResized,
};
use crate::input::InputState;

/// The part of logical space a window of `window` pixels shows, and the
/// pixels-per-logical-unit scale.
///
/// The logical area always fits entirely and stays centred; a window with a
/// different aspect ratio shows extra logical space on two sides rather than
/// black bars, so the returned rect may start at negative coordinates.
///
/// ```text
/// logical 1920x1080, window 1000x1000
///   scale = min(1000/1920, 1000/1080) = 0.52
///   area  = (0, -420) 1920x1920
/// ```
pub fn visible_area(window: Vec2, logical: Vec2) -> (Rect, f32) {
    if window.x <= 0.0 || window.y <= 0.0 || logical.x <= 0.0 || logical.y <= 0.0 {
        return (Rect::from_size(logical), 1.0);
    }
    let scale = (window.x / logical.x).min(window.y / logical.y);
    let size = window / scale;
    (Rect::new((logical - size) / 2.0, size), scale)
}

/// Polls a [`Platform`] once per tick.
pub struct PlatformEventsSystem {
    platform: Box<dyn Platform>,
    logical_size: Vec2,
    area: Rect,
    scale: f32,
}

impl PlatformEventsSystem {
    pub fn new(platform: impl Platform + 'static, logical_size: Vec2) -> Self {
        Self::from_boxed(Box::new(platform), logical_size)
    }

    pub fn from_boxed(platform: Box<dyn Platform>, logical_size: Vec2) -> Self {
        Self {
            platform,
            logical_size,
            area: Rect::from_size(logical_size),
            scale: 1.0,
        }
    }

    /// Visible logical area after the last resize.
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Window pixels to logical coordinates.
    pub fn to_logical(&self, window_point: Vec2) -> Vec2 {
        self.area.position + window_point / self.scale
    }

    fn resize(&mut self, world: &mut World, window: Vec2) {
        let (area, scale) = visible_area(window, self.logical_size);
        self.area = area;
        self.scale = scale;
        debug!("window {window} shows logical area {area:?} at scale {scale}");
        world.emit(WindowResized {
            window,
            logical: area,
        });
    }

    fn handle(&mut self, world: &mut World, event: PlatformEvent) {
        trace!("platform event {event:?}");
        match event {
            PlatformEvent::CloseRequested => world.emit(AppWantsClose),
            PlatformEvent::KeyDown { key, modifiers } => {
                let input = world.global_or_default::<InputState>();
                input.keys.press(key);
                input.modifiers = modifiers;
                world.emit(KeyDown { key, modifiers });
            }
            PlatformEvent::KeyUp { key, modifiers } => {
                let input = world.global_or_default::<InputState>();
                input.keys.release(key);
                input.modifiers = modifiers;
                world.emit(KeyUp { key, modifiers });
            }
            PlatformEvent::MouseMoved { position } => {
                let position = self.to_logical(position);
                world.global_or_default::<InputState>().cursor = position;
                world.emit(MouseMoved { position });
            }
            PlatformEvent::MouseButtonDown { button } => {
                let input = world.global_or_default::<InputState>();
                input.mouse.press(button);
                let position = input.cursor;
                world.emit(MouseButtonDown { button, position });
            }
            PlatformEvent::MouseButtonUp { button } => {
                let input = world.global_or_default::<InputState>();
                input.mouse.release(button);
                let position = input.cursor;
                world.emit(MouseButtonUp { button, position });
            }
            PlatformEvent::Resized { size } => self.resize(world, size),
        }
    }
}

impl System for PlatformEventsSystem {
    /// Announces the initial window size so layout has an area to work with.
    fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
        let window = self.platform.window_size();
        self.resize(world, window);
        Ok(())
    }

    fn update(&mut self, world: &mut World) {
        for event in self.platform.poll_events() {
            self.handle(world, event);
        }
    }
}
