//! Labels — anchored, blinking text, with the window resized mid-run.

use std::time::Duration;

use kindle::prelude::*;

const CORNERS: [(Horizontal, Vertical, &str); 5] = [
    (Horizontal::Left, Vertical::Top, "top left"),
    (Horizontal::Right, Vertical::Top, "top right"),
    (Horizontal::Center, Vertical::Center, "center"),
    (Horizontal::Left, Vertical::Bottom, "bottom left"),
    (Horizontal::Right, Vertical::Bottom, "bottom right"),
];

struct Labels;

impl Application for Labels {
    fn configure(&mut self, settings: &mut Settings) -> AppConfig {
        let frames = settings.get("labels", "frames", 30_i64).max(1) as u64;
        AppConfig::new("Labels")
            .with_clear_color(Color::DARK_GRAY)
            .with_max_frames(frames)
    }

    fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
        for (horizontal, vertical, text) in CORNERS {
            world.spawn((
                Renderable::default(),
                Anchor::new(horizontal, vertical),
                Position::ZERO,
                Color::WHITE,
                Label::new(text).with_font("mono", 32.0),
            ));
        }
        world.spawn((
            Renderable::at_depth(1.0),
            Anchor::new(Horizontal::Center, Vertical::Bottom),
            Position::new(0.0, -80.0),
            Color::WHITE,
            AlternateColor::new(Color::WHITE, Color::GOLD).with_timing(0.5, 0.25),
            Label::new("press escape to quit").aligned(Alignment::CENTER),
        ));
        Ok(())
    }

    fn end(&mut self, world: &mut World) {
        for (entity, layout) in world.iter::<Layout>() {
            let text = world.try_get::<Label>(entity).map_or("", |l| l.text.as_str());
            log::info!("{text:>22} at {}", layout.0);
        }
    }
}

fn main() -> Result<(), AppError> {
    kindle::logging::init(log::LevelFilter::Info);

    let platform = ScriptedPlatform::new(Vec2::new(1920.0, 1080.0))
        .then([])
        .then([PlatformEvent::Resized {
            size: Vec2::new(1080.0, 1080.0),
        }]);
    let mut app = App::new(platform, RecordingRenderer::new())
        .with_fixed_step(Duration::from_millis(16));
    app.run(&mut Labels)
}
