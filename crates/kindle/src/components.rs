//! Built-in components: geometry, rendering and UI.
//!
//! Plain data. The built-in systems give them meaning:
//!
//! ```text
//! Anchor ──(LayoutSystem)──► Layout      screen-relative placement
//! AlternateColor ──(EffectsSystem)──► Color
//! Renderable + Position/Layout + Color + Label/Sprite ──(RenderSystem)──► Renderer
//! ```

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

// ── Geometry ─────────────────────────────────────────────────────────

/// Where an entity sits, in logical coordinates. With an [`Anchor`] it is an
/// offset from the anchor point instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

impl Position {
    pub const ZERO: Self = Self(Vec2::ZERO);

    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size(pub Vec2);

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self(Vec2::new(width, height))
    }

    pub fn width(self) -> f32 {
        self.0.x
    }

    pub fn height(self) -> f32 {
        self.0.y
    }
}

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub fn from_size(size: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.position + self.size;
        point.x >= self.position.x && point.y >= self.position.y && point.x < max.x && point.y < max.y
    }
}

// ── Rendering ────────────────────────────────────────────────────────

/// Marks an entity as drawable. Lower depth draws first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub depth: f32,
    pub visible: bool,
}

impl Renderable {
    pub fn at_depth(depth: f32) -> Self {
        Self {
            depth,
            visible: true,
        }
    }
}

impl Default for Renderable {
    fn default() -> Self {
        Self::at_depth(0.0)
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const OPAQUE: u8 = 255;
    pub const TRANSLUCENT: u8 = 0;

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const GRAY: Self = Self::rgb(130, 130, 130);
    pub const LIGHT_GRAY: Self = Self::rgb(200, 200, 200);
    pub const DARK_GRAY: Self = Self::rgb(80, 80, 80);
    pub const YELLOW: Self = Self::rgb(253, 249, 0);
    pub const GOLD: Self = Self::rgb(255, 203, 0);
    pub const ORANGE: Self = Self::rgb(255, 161, 0);
    pub const PINK: Self = Self::rgb(255, 109, 194);
    pub const RED: Self = Self::rgb(230, 41, 55);
    pub const MAROON: Self = Self::rgb(190, 33, 55);
    pub const GREEN: Self = Self::rgb(0, 228, 48);
    pub const LIME: Self = Self::rgb(0, 158, 47);
    pub const DARK_GREEN: Self = Self::rgb(0, 117, 44);
    pub const SKY_BLUE: Self = Self::rgb(102, 191, 255);
    pub const BLUE: Self = Self::rgb(0, 121, 241);
    pub const DARK_BLUE: Self = Self::rgb(0, 82, 172);
    pub const PURPLE: Self = Self::rgb(200, 122, 255);
    pub const VIOLET: Self = Self::rgb(135, 60, 190);
    pub const DARK_PURPLE: Self = Self::rgb(112, 31, 126);
    pub const BEIGE: Self = Self::rgb(211, 176, 131);
    pub const BROWN: Self = Self::rgb(127, 106, 79);
    pub const DARK_BROWN: Self = Self::rgb(76, 63, 47);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    pub const RAY_WHITE: Self = Self::rgb(245, 245, 245);
    /// White, used as "no tint" for sprites.
    pub const UNTINTED: Self = Self::WHITE;

    /// Create a color from RGB (alpha = opaque).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, Self::OPAQUE)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a new alpha.
    pub const fn alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Same color with an alpha given as a fraction of opaque. Clamped to 0..=1.
    pub fn alpha_f32(self, factor: f32) -> Self {
        self.alpha((factor.clamp(0.0, 1.0) * f32::from(Self::OPAQUE)) as u8)
    }

    /// Move every channel towards `other` by `factor` (0 keeps `self`, 1 gives
    /// `other`).
    pub fn blend(&mut self, other: Color, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        let mix = |from: u8, to: u8| -> u8 {
            (f32::from(from) * (1.0 - factor) + f32::from(to) * factor) as u8
        };
        self.r = mix(self.r, other.r);
        self.g = mix(self.g, other.g);
        self.b = mix(self.b, other.b);
        self.a = mix(self.a, other.a);
    }

    /// Blended copy.
    pub fn blended(mut self, other: Color, factor: f32) -> Self {
        self.blend(other, factor);
        self
    }

    /// Channels as `[0.0, 1.0]` floats, for renderers that want them.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| f32::from(c) / 255.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A sprite by name. Loading the image is the renderer's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub file: String,
    pub frame: String,
    pub flip_x: bool,
    pub flip_y: bool,
    pub scale: f32,
    pub rotation: f32,
}

impl Sprite {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            frame: "default".to_string(),
            flip_x: false,
            flip_y: false,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = frame.into();
        self
    }
}

// ── UI ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizontal {
    #[default]
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vertical {
    #[default]
    None,
    Top,
    Center,
    Bottom,
}

/// How text is placed relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl Alignment {
    pub const TOP_LEFT: Self = Self::new(Horizontal::Left, Vertical::Top);
    pub const CENTER: Self = Self::new(Horizontal::Center, Vertical::Center);

    pub const fn new(horizontal: Horizontal, vertical: Vertical) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::TOP_LEFT
    }
}

/// A line of text in a named font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub font: String,
    pub size: f32,
    pub alignment: Alignment,
}

impl Label {
    pub const DEFAULT_FONT: &'static str = "default";
    pub const DEFAULT_SIZE: f32 = 20.0;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Self::DEFAULT_FONT.to_string(),
            size: Self::DEFAULT_SIZE,
            alignment: Alignment::default(),
        }
    }

    pub fn with_font(mut self, font: impl Into<String>, size: f32) -> Self {
        self.font = font.into();
        self.size = size;
        self
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Pins an entity to a point of the logical screen. Its [`Position`] then
/// becomes an offset from that point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl Anchor {
    pub const fn new(horizontal: Horizontal, vertical: Vertical) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// The anchor point inside `area`.
    pub fn point_in(&self, area: &Rect) -> Vec2 {
        let x = match self.horizontal {
            Horizontal::None | Horizontal::Left => area.position.x,
            Horizontal::Center => area.position.x + area.size.x / 2.0,
            Horizontal::Right => area.position.x + area.size.x,
        };
        let y = match self.vertical {
            Vertical::None | Vertical::Top => area.position.y,
            Vertical::Center => area.position.y + area.size.y / 2.0,
            Vertical::Bottom => area.position.y + area.size.y,
        };
        Vec2::new(x, y)
    }
}

/// Resolved screen position of an anchored entity. Written by the layout
/// system; read by the render system in preference to [`Position`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout(pub Vec2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        let mut color = Color::BLACK;
        color.blend(Color::WHITE, 0.0);
        assert_eq!(color, Color::BLACK);
        color.blend(Color::WHITE, 1.0);
        assert_eq!(color, Color::WHITE);
    }

    #[test]
    fn blend_halfway() {
        let mid = Color::rgb(0, 0, 0).blended(Color::rgb(200, 100, 50), 0.5);
        assert_eq!(mid, Color::rgb(100, 50, 25));
    }

    #[test]
    fn alpha_variants() {
        assert_eq!(Color::RED.alpha(10).a, 10);
        assert_eq!(Color::RED.alpha_f32(1.0).a, 255);
        assert_eq!(Color::RED.alpha_f32(2.0).a, 255);
        assert_eq!(Color::RED.alpha_f32(0.0).a, 0);
    }

    #[test]
    fn anchor_points() {
        let area = Rect::new(Vec2::new(10.0, 20.0), Vec2::new(100.0, 50.0));
        let at = |h, v| Anchor::new(h, v).point_in(&area);
        assert_eq!(at(Horizontal::None, Vertical::None), Vec2::new(10.0, 20.0));
        assert_eq!(at(Horizontal::Center, Vertical::Center), Vec2::new(60.0, 45.0));
        assert_eq!(at(Horizontal::Right, Vertical::Bottom), Vec2::new(110.0, 70.0));
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::from_size(Vec2::new(10.0, 10.0));
        assert!(rect.contains(Vec2::ZERO));
        assert!(!rect.contains(Vec2::new(10.0, 5.0)));
        assert_eq!(rect.center(), Vec2::new(5.0, 5.0));
    }
}
