//! # App — The Frame Loop Driver
//!
//! An [`Application`] describes a game; the [`App`] runs it.
//!
//! ```ignore
//! struct Counter;
//!
//! impl Application for Counter {
//!     fn configure(&mut self, _settings: &mut Settings) -> AppConfig {
//!         AppConfig::new("Counter").with_clear_color(Color::RAY_WHITE)
//!     }
//!
//!     fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
//!         world.spawn((Renderable::default(), Position::ZERO, Color::BLACK, Label::new("hi")));
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), AppError> {
//!     App::new(ScriptedPlatform::new(Vec2::new(1280.0, 720.0)), RecordingRenderer::new())
//!         .run(&mut Counter)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! run()
//!   load settings, install logger at the `log.level` setting
//!   configure(settings)           → AppConfig
//!   register built-in systems     (platform, keys, effects, layout, render)
//!   tick once                     (built-ins initialise, window size announced)
//!   init(world)
//!   tick until AppWantsClose or max_frames
//!   end(world), end every system
//!   store window.fullscreen, save settings
//! ```

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, error, info, trace};
use thiserror::Error;

use crate::backend::{Platform, Renderer};
use crate::config::AppConfig;
use crate::ecs::{SystemId, World, priority};
use crate::error::BoxError;
use crate::events::AppWantsClose;
use crate::logging;
use crate::settings::{Settings, SettingsError};
use crate::systems::{EffectsSystem, KeysSystem, LayoutSystem, PlatformEventsSystem, RenderSystem};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("application failed to initialise: {0}")]
    Init(BoxError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// A game, as seen by the [`App`].
pub trait Application {
    /// Called once, before any system exists.
    fn configure(&mut self, settings: &mut Settings) -> AppConfig;

    /// Called once, after the built-in systems have initialised.
    fn init(&mut self, world: &mut World) -> Result<(), BoxError>;

    /// Called once, after the last tick.
    fn end(&mut self, _world: &mut World) {}
}

/// Owns the world, the backends and the settings, and drives the ticks.
pub struct App {
    world: World,
    platform: Option<Box<dyn Platform>>,
    renderer: Option<Box<dyn Renderer>>,
    settings_path: Option<PathBuf>,
    settings: Settings,
    fixed_step: Option<Duration>,
    frames: u64,
}

impl App {
    pub fn new(platform: impl Platform + 'static, renderer: impl Renderer + 'static) -> Self {
        Self {
            world: World::new(),
            platform: Some(Box::new(platform)),
            renderer: Some(Box::new(renderer)),
            settings_path: None,
            settings: Settings::new(),
            fixed_step: None,
            frames: 0,
        }
    }

    /// Read settings from `path` at start-up and write them back at the end.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Advance time by `step` every tick instead of by the wall clock.
    pub fn with_fixed_step(mut self, step: Duration) -> Self {
        self.fixed_step = Some(step);
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ticks run by the last [`run`](Self::run), the start-up tick included.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run `application` until it asks to close. The world is left as the
    /// last tick saw it, with every system ended.
    pub fn run(&mut self, application: &mut impl Application) -> Result<(), AppError> {
        if let Some(path) = &self.settings_path {
            self.settings = Settings::load(path)?;
        }
        logging::init(logging::level_from_settings(&mut self.settings));

        let config = application.configure(&mut self.settings);
        info!("running {}", config.title);
        let fullscreen = self.settings.get("window", "fullscreen", false);

        let render = self.register_systems(&config, fullscreen);
        let closing = Rc::new(Cell::new(false));
        let owner = self.world.new_owner();
        let flag = Rc::clone(&closing);
        self.world.subscribe::<AppWantsClose>(owner, move |_, _| {
            trace!("application wants to close");
            flag.set(true);
        });

        self.frames = 0;
        self.step();

        if let Err(err) = application.init(&mut self.world) {
            error!("{} failed to initialise: {err}", config.title);
            self.world.unsubscribe_all(owner);
            self.world.end_all_systems();
            return Err(AppError::Init(err));
        }

        while !closing.get() && config.max_frames.is_none_or(|max| self.frames < max) {
            self.step();
        }
        debug!("stopping after {} frame(s)", self.frames);

        application.end(&mut self.world);
        self.world.unsubscribe_all(owner);
        let mut fullscreen = fullscreen;
        if let Some(render) = render {
            self.world
                .with_system::<RenderSystem>(render, |system, _| fullscreen = system.is_fullscreen());
        }
        self.world.end_all_systems();

        self.settings.set("window", "fullscreen", fullscreen);
        self.settings.save()?;
        Ok(())
    }

    /// The backends are handed to their systems, so a second `run` has
    /// neither platform nor renderer.
    fn register_systems(&mut self, config: &AppConfig, fullscreen: bool) -> Option<SystemId> {
        if let Some(platform) = self.platform.take() {
            self.world.add_system_with_priority(
                PlatformEventsSystem::from_boxed(platform, config.logical_size),
                priority::PLATFORM_EVENTS,
            );
        }
        self.world.add_system_with_priority(
            KeysSystem::new(config.exit_chord, config.fullscreen_chord),
            priority::KEYS,
        );
        self.world
            .add_system_with_priority(EffectsSystem, priority::EFFECTS);
        self.world.add_system_with_priority(
            LayoutSystem::new(config.logical_size),
            priority::LAYOUT,
        );
        self.renderer.take().map(|renderer| {
            self.world.add_system_with_priority(
                RenderSystem::from_boxed(renderer, config.clear_color).fullscreen(fullscreen),
                priority::RENDER,
            )
        })
    }

    fn step(&mut self) {
        match self.fixed_step {
            Some(step) => self.world.tick_by(step),
            None => self.world.tick(),
        }
        self.frames += 1;
        for err in self.world.drain_errors() {
            error!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::backend::{DrawCall, PlatformEvent, RecordingRenderer, ScriptedPlatform};
    use crate::input::{Key, Modifiers};

    struct Quiet {
        frames: Option<u64>,
        inits: u32,
        ends: u32,
    }

    impl Quiet {
        fn new(frames: Option<u64>) -> Self {
            Self {
                frames,
                inits: 0,
                ends: 0,
            }
        }
    }

    impl Application for Quiet {
        fn configure(&mut self, _settings: &mut Settings) -> AppConfig {
            let config = AppConfig::new("quiet");
            match self.frames {
                Some(frames) => config.with_max_frames(frames),
                None => config,
            }
        }

        fn init(&mut self, _world: &mut World) -> Result<(), BoxError> {
            self.inits += 1;
            Ok(())
        }

        fn end(&mut self, _world: &mut World) {
            self.ends += 1;
        }
    }

    fn headless(platform: ScriptedPlatform) -> (App, RecordingRenderer) {
        let recorder = RecordingRenderer::new();
        let app = App::new(platform, recorder.clone()).with_fixed_step(Duration::from_millis(16));
        (app, recorder)
    }

    #[test]
    fn max_frames_bounds_the_loop() {
        let (mut app, recorder) = headless(ScriptedPlatform::new(Vec2::new(1920.0, 1080.0)));
        let mut game = Quiet::new(Some(5));
        app.run(&mut game).unwrap();
        assert_eq!(app.frames(), 5);
        assert_eq!(recorder.frames(), 5);
        assert_eq!((game.inits, game.ends), (1, 1));
        assert_eq!(app.world().system_count(), 0);
    }

    #[test]
    fn close_request_stops_after_its_tick() {
        let platform = ScriptedPlatform::new(Vec2::new(1920.0, 1080.0))
            .then([])
            .then([])
            .then([PlatformEvent::KeyUp {
                key: Key::Escape,
                modifiers: Modifiers::NONE,
            }]);
        let (mut app, _) = headless(platform);
        let mut game = Quiet::new(Some(100));
        app.run(&mut game).unwrap();
        assert_eq!(app.frames(), 3);
    }

    struct Broken;

    impl Application for Broken {
        fn configure(&mut self, _settings: &mut Settings) -> AppConfig {
            AppConfig::default()
        }

        fn init(&mut self, _world: &mut World) -> Result<(), BoxError> {
            Err("missing font".into())
        }
    }

    #[test]
    fn init_failure_is_returned() {
        let (mut app, _) = headless(ScriptedPlatform::new(Vec2::ONE));
        let err = app.run(&mut Broken).unwrap_err();
        assert_eq!(err.to_string(), "application failed to initialise: missing font");
        assert_eq!(app.world().system_count(), 0);
    }

    #[test]
    fn fullscreen_is_restored_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut stored = Settings::new();
        stored.set("window", "fullscreen", true);
        stored.save_to(&path).unwrap();

        let platform = ScriptedPlatform::new(Vec2::new(1920.0, 1080.0)).then([PlatformEvent::KeyUp {
            key: Key::Return,
            modifiers: Modifiers::LEFT_ALT,
        }]);
        let recorder = RecordingRenderer::new();
        let mut app = App::new(platform, recorder.clone())
            .with_fixed_step(Duration::ZERO)
            .with_settings_path(&path);
        app.run(&mut Quiet::new(Some(3))).unwrap();

        let toggles: Vec<_> = recorder
            .calls()
            .into_iter()
            .filter(|call| matches!(call, DrawCall::Fullscreen(_)))
            .collect();
        assert_eq!(
            toggles,
            vec![DrawCall::Fullscreen(true), DrawCall::Fullscreen(false)]
        );
        let saved = Settings::load(&path).unwrap();
        assert_eq!(saved.try_get::<bool>("window", "fullscreen").unwrap(), Some(false));
        assert_eq!(saved.try_get::<String>("log", "level").unwrap().as_deref(), Some("info"));
    }
}
