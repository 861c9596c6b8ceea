//! Visual effects driven by [`EffectsSystem`](crate::systems::EffectsSystem).

use serde::{Deserialize, Serialize};

use crate::components::Color;

/// Fades an entity's [`Color`] from `from` to `to` over `time` seconds, holds
/// for `delay` seconds, then fades back the other way. Forever.
///
/// ```text
///  to ┤      ╭──────╮
///     │     ╱        ╲
/// from┤────╯          ╰──────
///         time  delay  time  delay
/// ```
///
/// A zero delay with equal colors gives a steady color; distinct colors with
/// a short `time` give a blink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlternateColor {
    pub from: Color,
    pub to: Color,
    /// Seconds spent blending.
    pub time: f32,
    /// Seconds held between blends.
    pub delay: f32,
    /// Holding rather than blending.
    pub pause: bool,
    /// Seconds into the current phase.
    pub current_time: f32,
}

impl AlternateColor {
    pub fn new(from: Color, to: Color) -> Self {
        Self {
            from,
            to,
            ..Self::default()
        }
    }

    pub fn with_timing(mut self, time: f32, delay: f32) -> Self {
        self.time = time;
        self.delay = delay;
        self
    }

    /// Advance by `delta` seconds and return the color to show.
    pub fn step(&mut self, delta: f32) -> Color {
        let shown = self.from;
        self.current_time += delta;
        if self.pause {
            if self.current_time > self.delay {
                self.pause = false;
                self.current_time = 0.0;
            }
            return shown;
        }
        if self.current_time > self.time {
            self.current_time = 0.0;
            self.pause = true;
            std::mem::swap(&mut self.from, &mut self.to);
            return shown;
        }
        let factor = if self.time > 0.0 {
            self.current_time / self.time
        } else {
            1.0
        };
        shown.blended(self.to, factor)
    }
}

impl Default for AlternateColor {
    fn default() -> Self {
        Self {
            from: Color::WHITE,
            to: Color::WHITE,
            time: 0.15,
            delay: 0.1,
            pause: false,
            current_time: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blends_then_holds_then_swaps() {
        let mut effect = AlternateColor::new(Color::BLACK, Color::WHITE).with_timing(1.0, 0.5);

        let half = effect.step(0.5);
        assert_eq!(half, Color::rgb(127, 127, 127));

        // Past `time`: swap and start holding.
        assert_eq!(effect.step(0.6), Color::BLACK);
        assert!(effect.pause);
        assert_eq!(effect.from, Color::WHITE);

        // Holding shows the new `from`.
        assert_eq!(effect.step(0.2), Color::WHITE);
        assert!(effect.pause);
        assert_eq!(effect.step(0.4), Color::WHITE);
        assert!(!effect.pause);
        assert_eq!(effect.current_time, 0.0);
    }
}
