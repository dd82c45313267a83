//! Monotonic frame timing.

use std::time::{Duration, Instant};

/// Tracks elapsed time since start-up and the delta between frames.
///
/// The frame driver reads [`FrameClock::elapsed_seconds`] once per frame and
/// hands the value to the renderer, so shaders that animate over time see one
/// consistent value for the whole frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    startup: Instant,
    last_tick: Instant,
    delta: Duration,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Start a new clock at the current instant.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            last_tick: now,
            delta: Duration::ZERO,
            frames: 0,
        }
    }

    /// Advance the clock by one frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_tick;
        self.last_tick = now;
        self.frames += 1;
    }

    /// Seconds since the previous [`tick`](Self::tick).
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Seconds between start-up and the last tick.
    ///
    /// Stays constant between ticks.
    pub fn elapsed_seconds(&self) -> f32 {
        (self.last_tick - self.startup).as_secs_f32()
    }

    /// Number of ticks so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Restart the clock from now.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
