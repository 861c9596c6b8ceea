//! Frame timing and delta time.
//!
//! The [`GameTime`] global is advanced by the world at the start of each tick,
//! before any system runs. Systems read it for the frame delta and the total
//! game time.

use std::time::Duration;

/// Frame timing global. Seeded by [`World::new`](crate::ecs::World::new).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameTime {
    /// Duration of the current tick's step.
    delta: Duration,
    /// Sum of every delta so far.
    elapsed: Duration,
    /// Ticks advanced so far.
    frame_count: u64,
}

impl GameTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of length `delta`.
    pub(crate) fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Duration of the current tick's step.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total game time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of ticks advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}
