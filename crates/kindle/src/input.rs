//! Keyboard and mouse input state.
//!
//! The [`InputState`] global tracks which keys and buttons are held, just
//! pressed this frame, or just released this frame, plus the held modifiers
//! and the cursor position. [`PlatformEventsSystem`](crate::systems::PlatformEventsSystem)
//! keeps it current from the platform's event stream.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::ops::{BitOr, BitOrAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Unknown,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Return,
    Escape,
    Backspace,
    Tab,
    Space,
    Minus,
    Equals,
    LeftBracket,
    RightBracket,
    Backslash,
    Slash,
    Semicolon,
    Backquote,
    Comma,
    Period,
    CapsLock,
    Pause,
    PrintScreen,
    ScrollLock,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Right,
    Up,
    Down,
}

/// Held modifier keys, left and right tracked separately.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const LEFT_SHIFT: Self = Self(1 << 0);
    pub const RIGHT_SHIFT: Self = Self(1 << 1);
    pub const LEFT_CONTROL: Self = Self(1 << 2);
    pub const RIGHT_CONTROL: Self = Self(1 << 3);
    pub const LEFT_ALT: Self = Self(1 << 4);
    pub const RIGHT_ALT: Self = Self(1 << 5);
    pub const LEFT_GUI: Self = Self(1 << 6);
    pub const RIGHT_GUI: Self = Self(1 << 7);

    /// Either shift key.
    pub const SHIFT: Self = Self(Self::LEFT_SHIFT.0 | Self::RIGHT_SHIFT.0);
    /// Either control key.
    pub const CONTROL: Self = Self(Self::LEFT_CONTROL.0 | Self::RIGHT_CONTROL.0);
    /// Either alt key.
    pub const ALT: Self = Self(Self::LEFT_ALT.0 | Self::RIGHT_ALT.0);
    /// Either gui (command / windows) key.
    pub const GUI: Self = Self(Self::LEFT_GUI.0 | Self::RIGHT_GUI.0);

    const GROUPS: [Self; 4] = [Self::SHIFT, Self::CONTROL, Self::ALT, Self::GUI];

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is held.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Whether the held modifiers (`self`) satisfy `required`.
    ///
    /// Each modifier group in `required` (shift, control, alt, gui) needs at
    /// least one of its requested sides held. Extra held modifiers are ignored.
    pub fn satisfies(self, required: Self) -> bool {
        Self::GROUPS.iter().all(|group| {
            let wanted = required.0 & group.0;
            wanted == 0 || self.0 & wanted != 0
        })
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 8] = [
            "LeftShift",
            "RightShift",
            "LeftControl",
            "RightControl",
            "LeftAlt",
            "RightAlt",
            "LeftGui",
            "RightGui",
        ];
        if self.is_empty() {
            return f.write_str("Modifiers(NONE)");
        }
        let held: Vec<&str> = NAMES
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.0 & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Modifiers({})", held.join(" | "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u8),
}

/// A key plus the modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub const fn with(modifiers: Modifiers, key: Key) -> Self {
        Self { key, modifiers }
    }

    /// A chord bound to [`Key::Unknown`] never matches.
    pub fn is_bound(&self) -> bool {
        self.key != Key::Unknown
    }

    pub fn matches(&self, key: Key, held: Modifiers) -> bool {
        self.is_bound() && self.key == key && held.satisfies(self.modifiers)
    }
}

/// Tracks the state of a set of inputs (keys or mouse buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed this frame (not held last frame)
/// - `just_released`: released this frame
#[derive(Debug, Clone)]
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Clear per-frame state.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the platform told us about the input devices so far.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keys: Input<Key>,
    pub mouse: Input<MouseButton>,
    pub modifiers: Modifiers,
    /// Cursor position in logical coordinates.
    pub cursor: Vec2,
}

impl InputState {
    /// Start a new frame: forget what was pressed or released last frame.
    pub fn begin_frame(&mut self) {
        self.keys.clear_just();
        self.mouse.clear_just();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_release_cycle() {
        let mut keys = Input::new();
        keys.press(Key::Space);
        assert!(keys.pressed(Key::Space));
        assert!(keys.just_pressed(Key::Space));

        keys.clear_just();
        keys.press(Key::Space);
        assert!(!keys.just_pressed(Key::Space), "held keys do not re-trigger");

        keys.release(Key::Space);
        assert!(!keys.pressed(Key::Space));
        assert!(keys.just_released(Key::Space));
    }

    #[test]
    fn either_side_satisfies_a_group() {
        let chord = KeyChord::with(Modifiers::ALT, Key::Return);
        assert!(chord.matches(Key::Return, Modifiers::LEFT_ALT));
        assert!(chord.matches(Key::Return, Modifiers::RIGHT_ALT | Modifiers::SHIFT));
        assert!(!chord.matches(Key::Return, Modifiers::NONE));
        assert!(!chord.matches(Key::Space, Modifiers::LEFT_ALT));
    }

    #[test]
    fn one_sided_requirement() {
        let chord = KeyChord::with(Modifiers::LEFT_CONTROL, Key::Q);
        assert!(chord.matches(Key::Q, Modifiers::LEFT_CONTROL));
        assert!(!chord.matches(Key::Q, Modifiers::RIGHT_CONTROL));
    }

    #[test]
    fn unbound_chord_never_matches() {
        let chord = KeyChord::new(Key::Unknown);
        assert!(!chord.matches(Key::Unknown, Modifiers::NONE));
    }

    #[test]
    fn modifiers_debug_lists_held_keys() {
        let mods = Modifiers::LEFT_SHIFT | Modifiers::RIGHT_ALT;
        assert_eq!(format!("{mods:?}"), "Modifiers(LeftShift | RightAlt)");
        assert_eq!(format!("{:?}", Modifiers::NONE), "Modifiers(NONE)");
    }

    #[test]
    fn chord_roundtrips_through_json() {
        let chord = KeyChord::with(Modifiers::ALT, Key::Return);
        let json = serde_json::to_string(&chord).unwrap();
        let back: KeyChord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chord);
    }
}
