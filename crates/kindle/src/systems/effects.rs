use crate::components::Color;
use crate::ecs::{System, World};
use crate::effects::AlternateColor;

/// Steps every [`AlternateColor`] by the frame delta and writes the result
/// into the entity's [`Color`].
#[derive(Debug, Default)]
pub struct EffectsSystem;

impl System for EffectsSystem {
    fn update(&mut self, world: &mut World) {
        let delta = world.time().delta_secs();
        world.each::<(&mut AlternateColor, &mut Color)>(|_, (effect, color)| {
            *color = effect.step(delta);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn color_follows_the_effect() {
        let mut world = World::new();
        world.add_system(EffectsSystem);
        let blinking = world.spawn((
            AlternateColor::new(Color::BLACK, Color::WHITE).with_timing(1.0, 1.0),
            Color::RED,
        ));
        let plain = world.spawn((Color::RED,));

        world.tick_by(Duration::from_millis(500));
        let color = *world.get::<Color>(blinking).unwrap();
        assert_eq!(color, Color::BLACK.blended(Color::WHITE, 0.5));
        assert_eq!(world.get::<Color>(plain).unwrap(), &Color::RED);
    }

    #[test]
    fn effect_without_color_is_left_alone() {
        let mut world = World::new();
        world.add_system(EffectsSystem);
        let e = world.spawn((AlternateColor::default(),));
        world.tick_by(Duration::from_millis(16));
        assert_eq!(world.get::<AlternateColor>(e).unwrap().current_time, 0.0);
    }
}
