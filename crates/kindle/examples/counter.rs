//! Counter — a label counts down and disappears.
//!
//! Runs headless: a scripted platform and a recording renderer stand in for
//! the window. `RUST_LOG=debug` shows the frame loop at work.

use std::time::Duration;

use kindle::prelude::*;

#[derive(Debug, Clone, Copy)]
struct Counter(i32);

struct Finished(Entity);

/// Counts every `Counter` down once per second.
#[derive(Default)]
struct CountDown {
    elapsed: f32,
}

impl System for CountDown {
    fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
        let me = world.current_system().ok_or(EcsError::NoRunningSystem)?;
        world.subscribe::<Finished>(me, |world, finished| {
            log::info!("counter {:?} finished", finished.0);
            world.destroy_entity_later(finished.0);
            world.emit(AppWantsClose);
        });
        Ok(())
    }

    fn update(&mut self, world: &mut World) {
        self.elapsed += world.time().delta_secs();
        if self.elapsed < 1.0 {
            return;
        }
        self.elapsed -= 1.0;

        let mut finished = Vec::new();
        world.each::<(&mut Counter, &mut Label)>(|entity, (counter, label)| {
            counter.0 -= 1;
            label.text = format!("Counter: {}", counter.0);
            log::info!("{}", label.text);
            if counter.0 == 0 {
                finished.push(entity);
            }
        });
        for entity in finished {
            world.emit(Finished(entity));
        }
    }
}

struct CounterGame;

impl Application for CounterGame {
    fn configure(&mut self, _settings: &mut Settings) -> AppConfig {
        AppConfig::new("Counter").with_clear_color(Color::RAY_WHITE)
    }

    fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
        world.spawn((
            Renderable::default(),
            Anchor::new(Horizontal::Center, Vertical::Center),
            Position::ZERO,
            Color::BLACK,
            Counter(5),
            Label::new("Counter: 5").aligned(Alignment::CENTER),
        ));
        world.add_system(CountDown::default());
        Ok(())
    }
}

fn main() -> Result<(), AppError> {
    kindle::logging::init(log::LevelFilter::Info);

    let platform = ScriptedPlatform::new(Vec2::new(1280.0, 720.0));
    let renderer = RecordingRenderer::new();
    let mut app = App::new(platform, renderer.clone()).with_fixed_step(Duration::from_millis(100));
    app.run(&mut CounterGame)?;

    log::info!("{} frames drawn", renderer.frames());
    Ok(())
}
