//! # Settings — Persisted Section/Name Values
//!
//! A two-level map of typed values, stored as a JSON object of sections:
//!
//! ```text
//! {
//!   "log":     { "level": "info" },
//!   "window":  { "fullscreen": false, "width": 1280 },
//!   "counter": { "start": 3 }
//! }
//! ```
//!
//! Values are `bool`, `i64`, `f64` or `String`. [`Settings::get`] takes a
//! default and remembers it when the value is missing, so the first save
//! writes out every setting the game asked for.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file `{}` is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("setting `{section}.{name}` is not a {expected}")]
    TypeMismatch {
        section: String,
        name: String,
        expected: &'static str,
    },
}

/// A type that can be stored in [`Settings`].
pub trait SettingValue: Sized {
    const TYPE_NAME: &'static str;

    fn to_value(&self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

impl SettingValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl SettingValue for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl SettingValue for f64 {
    const TYPE_NAME: &'static str = "number";

    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    /// Integers read back as numbers too.
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl SettingValue for String {
    const TYPE_NAME: &'static str = "string";

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

type Section = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    sections: BTreeMap<String, Section>,
    path: Option<PathBuf>,
}

impl Settings {
    /// In-memory settings; `save` is a no-op until a path is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `path`. A missing file gives empty settings that
    /// will be written to `path` on save.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let sections = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        info!("settings read from {}", path.display());
        Ok(Self {
            sections,
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Write to the path given to [`load`](Self::load) or
    /// [`set_path`](Self::set_path), creating parent directories.
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            debug!("settings have no path, not saved");
            return Ok(());
        };
        self.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        let text = serde_json::to_string_pretty(&self.sections)
            .map_err(|err| io(std::io::Error::from(err)))?;
        std::fs::write(path, text).map_err(io)?;
        info!("settings saved to {}", path.display());
        Ok(())
    }

    pub fn set<T: SettingValue>(&mut self, section: &str, name: &str, value: T) {
        self.set_value(section, name, value.to_value());
    }

    fn set_value(&mut self, section: &str, name: &str, value: Value) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    /// The value at `section.name`, or `default` (which is then stored) when
    /// it is missing or holds another type.
    pub fn get<T: SettingValue>(&mut self, section: &str, name: &str, default: T) -> T {
        match self.try_get::<T>(section, name) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("setting {section}.{name} not found, defaulting");
                self.set_value(section, name, default.to_value());
                default
            }
            Err(err) => {
                warn!("{err}, replaced with the default");
                self.set_value(section, name, default.to_value());
                default
            }
        }
    }

    /// The value at `section.name` without defaulting. `Ok(None)` when
    /// missing, [`SettingsError::TypeMismatch`] when present as another type.
    pub fn try_get<T: SettingValue>(&self, section: &str, name: &str) -> Result<Option<T>, SettingsError> {
        let Some(value) = self.sections.get(section).and_then(|s| s.get(name)) else {
            return Ok(None);
        };
        T::from_value(value)
            .map(Some)
            .ok_or_else(|| SettingsError::TypeMismatch {
                section: section.to_string(),
                name: name.to_string(),
                expected: T::TYPE_NAME,
            })
    }

    pub fn contains(&self, section: &str, name: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|s| s.contains_key(name))
    }

    pub fn remove(&mut self, section: &str, name: &str) -> bool {
        self.sections
            .get_mut(section)
            .is_some_and(|s| s.remove(name).is_some())
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_defaults_and_remembers() {
        let mut settings = Settings::new();
        assert_eq!(settings.get("window", "width", 1280_i64), 1280);
        assert!(settings.contains("window", "width"));
        settings.set("window", "width", 800_i64);
        assert_eq!(settings.get("window", "width", 1280_i64), 800);
    }

    #[test]
    fn every_value_type() {
        let mut settings = Settings::new();
        settings.set("a", "flag", true);
        settings.set("a", "count", 3_i64);
        settings.set("a", "ratio", 0.5_f64);
        settings.set("a", "name", "kindle".to_string());
        assert_eq!(settings.try_get::<bool>("a", "flag").unwrap(), Some(true));
        assert_eq!(settings.try_get::<i64>("a", "count").unwrap(), Some(3));
        assert_eq!(settings.try_get::<f64>("a", "ratio").unwrap(), Some(0.5));
        assert_eq!(
            settings.try_get::<String>("a", "name").unwrap().as_deref(),
            Some("kindle")
        );
        assert_eq!(settings.try_get::<f64>("a", "count").unwrap(), Some(3.0));
    }

    #[test]
    fn wrong_type_is_a_mismatch_and_get_replaces_it() {
        let mut settings = Settings::new();
        settings.set("log", "level", "info".to_string());
        let err = settings.try_get::<bool>("log", "level").unwrap_err();
        assert_eq!(err.to_string(), "setting `log.level` is not a bool");

        assert!(!settings.get("log", "level", false));
        assert_eq!(settings.try_get::<bool>("log", "level").unwrap(), Some(false));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings::load(&path).unwrap();
        assert!(settings.is_empty());
        assert_eq!(settings.path(), Some(path.as_path()));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team").join("game").join("settings.json");

        let mut settings = Settings::load(&path).unwrap();
        settings.set("counter", "start", 3_i64);
        settings.set("log", "level", "debug".to_string());
        settings.save().unwrap();

        let mut loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.get("counter", "start", 0_i64), 3);
        assert_eq!(loaded.section_names().collect::<Vec<_>>(), vec!["counter", "log"]);
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn save_without_path_is_a_no_op() {
        let mut settings = Settings::new();
        settings.set("a", "b", true);
        settings.save().unwrap();
        assert!(settings.remove("a", "b"));
        assert!(!settings.remove("a", "b"));
    }
}
