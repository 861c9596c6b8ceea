//! Application configuration.
//!
//! ```ignore
//! let config = AppConfig::new("Counter")
//!     .with_logical_size(Vec2::new(1280.0, 720.0))
//!     .with_clear_color(Color::RAY_WHITE);
//! ```
//!
//! Every field has a default, so a JSON file only needs the fields it changes:
//!
//! ```text
//! { "title": "Counter", "clear_color": { "r": 0, "g": 0, "b": 0, "a": 255 } }
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::Color;
use crate::input::KeyChord;
use crate::systems::KeysSystem;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    /// Resolution the game is laid out in, independent of the window size.
    pub logical_size: Vec2,
    pub clear_color: Color,
    /// Released to quit. `Key::Unknown` disables it.
    pub exit_chord: KeyChord,
    pub fullscreen_chord: KeyChord,
    /// Stop after this many frames. `None` runs until a close request.
    pub max_frames: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "kindle".to_string(),
            logical_size: Vec2::new(1920.0, 1080.0),
            clear_color: Color::BLACK,
            exit_chord: KeysSystem::DEFAULT_EXIT,
            fullscreen_chord: KeysSystem::DEFAULT_TOGGLE_FULLSCREEN,
            max_frames: None,
        }
    }
}

impl AppConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_logical_size(mut self, size: Vec2) -> Self {
        self.logical_size = size;
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_exit_chord(mut self, chord: KeyChord) -> Self {
        self.exit_chord = chord;
        self
    }

    pub fn with_fullscreen_chord(mut self, chord: KeyChord) -> Self {
        self.fullscreen_chord = chord;
        self
    }

    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, Modifiers};

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.logical_size, Vec2::new(1920.0, 1080.0));
        assert_eq!(config.exit_chord, KeyChord::new(Key::Escape));
        assert_eq!(
            config.fullscreen_chord,
            KeyChord::with(Modifiers::ALT, Key::Return)
        );
        assert_eq!(config.max_frames, None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "title": "Counter", "max_frames": 3 }"#).unwrap();
        assert_eq!(config.title, "Counter");
        assert_eq!(config.max_frames, Some(3));
        assert_eq!(config.clear_color, Color::BLACK);
    }

    #[test]
    fn json_survives_a_save() {
        let config = AppConfig::new("Labels")
            .with_clear_color(Color::RAY_WHITE)
            .with_exit_chord(KeyChord::with(Modifiers::CONTROL, Key::Q));
        let json = config.to_json().unwrap();
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
