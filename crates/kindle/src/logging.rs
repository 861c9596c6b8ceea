//! Logger set-up.
//!
//! Everything in the crate logs through the `log` facade. [`init`] installs
//! `env_logger` at a given level; `RUST_LOG`, when set, takes precedence.

use std::str::FromStr;

use log::LevelFilter;

use crate::settings::Settings;

pub const LEVEL_SECTION: &str = "log";
pub const LEVEL_NAME: &str = "level";
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Install the global logger. Returns `false` if one was already installed.
pub fn init(level: LevelFilter) -> bool {
    let installed = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .is_ok();
    if installed {
        log::debug!("logging at {level}");
    }
    installed
}

/// `"warn"`, `"DEBUG"`, `"off"`... Anything else is [`DEFAULT_LEVEL`].
pub fn parse_level(text: &str) -> LevelFilter {
    LevelFilter::from_str(text.trim()).unwrap_or(DEFAULT_LEVEL)
}

/// The `log.level` setting, stored as `"info"` when absent.
pub fn level_from_settings(settings: &mut Settings) -> LevelFilter {
    let text = settings.get(
        LEVEL_SECTION,
        LEVEL_NAME,
        DEFAULT_LEVEL.as_str().to_lowercase(),
    );
    parse_level(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("loud"), DEFAULT_LEVEL);
    }

    #[test]
    fn level_comes_from_settings() {
        let mut settings = Settings::new();
        assert_eq!(level_from_settings(&mut settings), LevelFilter::Info);
        assert_eq!(
            settings.try_get::<String>("log", "level").unwrap().as_deref(),
            Some("info")
        );

        settings.set("log", "level", "trace".to_string());
        assert_eq!(level_from_settings(&mut settings), LevelFilter::Trace);
    }
}
