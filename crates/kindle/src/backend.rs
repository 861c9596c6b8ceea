//! # Backend — The Narrow Interfaces to Window, Input and Drawing
//!
//! The framework never talks to a graphics API or a windowing library
//! directly. It drives two traits:
//!
//! ```text
//! Platform ──poll_events()──► PlatformEventsSystem ──emit──► KeyDown, WindowResized, ...
//! RenderSystem ──begin_frame / draw_* / end_frame──► Renderer
//! ```
//!
//! [`ScriptedPlatform`] and [`RecordingRenderer`] implement them without a
//! window, which is how the whole frame loop runs in tests and headless
//! demos.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;

use crate::components::{Color, Label, Sprite};
use crate::input::{Key, Modifiers, MouseButton};

/// Draws one frame at a time.
pub trait Renderer {
    fn begin_frame(&mut self, clear: Color);
    fn draw_label(&mut self, label: &Label, position: Vec2, color: Color);
    fn draw_sprite(&mut self, sprite: &Sprite, position: Vec2, color: Color);
    fn end_frame(&mut self);
    fn set_fullscreen(&mut self, fullscreen: bool);
}

/// Raw input and window notifications, in window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    CloseRequested,
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
    MouseMoved { position: Vec2 },
    MouseButtonDown { button: MouseButton },
    MouseButtonUp { button: MouseButton },
    Resized { size: Vec2 },
}

/// Source of [`PlatformEvent`]s.
pub trait Platform {
    /// Everything that happened since the last call.
    fn poll_events(&mut self) -> Vec<PlatformEvent>;
    /// Current window size in pixels.
    fn window_size(&self) -> Vec2;
}

// ── Headless implementations ─────────────────────────────────────────

/// One recorded [`Renderer`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    BeginFrame { clear: Color },
    Label { text: String, position: Vec2, color: Color },
    Sprite { file: String, frame: String, position: Vec2, color: Color },
    EndFrame,
    Fullscreen(bool),
}

/// A renderer that only remembers what it was asked to draw.
///
/// Clones share the same record, so a test can keep one handle and give the
/// other to the render system.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Rc<RefCell<Vec<DrawCall>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<DrawCall> {
        self.calls.borrow().clone()
    }

    /// Take the record, leaving it empty.
    pub fn take(&self) -> Vec<DrawCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Completed frames.
    pub fn frames(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, DrawCall::EndFrame))
            .count()
    }

    /// Label texts drawn, in draw order.
    pub fn label_texts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                DrawCall::Label { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DrawCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, clear: Color) {
        self.record(DrawCall::BeginFrame { clear });
    }

    fn draw_label(&mut self, label: &Label, position: Vec2, color: Color) {
        self.record(DrawCall::Label {
            text: label.text.clone(),
            position,
            color,
        });
    }

    fn draw_sprite(&mut self, sprite: &Sprite, position: Vec2, color: Color) {
        self.record(DrawCall::Sprite {
            file: sprite.file.clone(),
            frame: sprite.frame.clone(),
            position,
            color,
        });
    }

    fn end_frame(&mut self) {
        self.record(DrawCall::EndFrame);
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.record(DrawCall::Fullscreen(fullscreen));
    }
}

/// A platform that replays scripted frames of events.
///
/// Each `poll_events` call returns the next scripted frame, then nothing
/// once the script runs out. Clones share the script.
#[derive(Debug, Clone)]
pub struct ScriptedPlatform {
    script: Rc<RefCell<VecDeque<Vec<PlatformEvent>>>>,
    size: Rc<RefCell<Vec2>>,
}

impl ScriptedPlatform {
    pub fn new(size: Vec2) -> Self {
        Self {
            script: Rc::default(),
            size: Rc::new(RefCell::new(size)),
        }
    }

    /// Append one frame's worth of events.
    pub fn push_frame(&self, events: impl IntoIterator<Item = PlatformEvent>) {
        self.script
            .borrow_mut()
            .push_back(events.into_iter().collect());
    }

    /// Builder form of [`push_frame`](Self::push_frame).
    pub fn then(self, events: impl IntoIterator<Item = PlatformEvent>) -> Self {
        self.push_frame(events);
        self
    }

    /// Frames not yet polled.
    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }
}

impl Platform for ScriptedPlatform {
    /// A scripted `Resized` also changes [`window_size`](Self::window_size).
    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        let events = self.script.borrow_mut().pop_front().unwrap_or_default();
        for event in &events {
            if let PlatformEvent::Resized { size } = event {
                *self.size.borrow_mut() = *size;
            }
        }
        events
    }

    fn window_size(&self) -> Vec2 {
        *self.size.borrow()
    }
}
