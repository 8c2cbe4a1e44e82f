//! Time management utilities
//!
//! The scene manager samples a [`Clock`] once per frame and feeds the elapsed
//! time into a [`FixedTimestep`] accumulator. Time is kept as [`Duration`]
//! so the fixed-step count is exact (`60ms` at 50 Hz is three steps, never
//! two and a rounding error).

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source sampled once per frame
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is the moment of construction
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock for tests and offline stepping.
///
/// Clones share the same time cell, so a test can keep one handle and give
/// another to the scene manager.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Create a clock stopped at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Move the clock forward by fractional seconds
    pub fn advance_secs(&self, seconds: f64) {
        self.advance(Duration::from_secs_f64(seconds));
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Fixed timestep accumulator.
///
/// Frame time is added to the accumulator and drained in whole steps; the
/// remainder carries over to the next frame. No cap is applied, so a long
/// frame produces as many steps as it covers.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    /// Create an accumulator ticking `hz` times per second
    pub fn from_hz(hz: u32) -> Self {
        Self {
            step: Duration::from_secs(1) / hz.max(1),
            accumulator: Duration::ZERO,
        }
    }

    /// Add frame time to the accumulator
    pub fn accumulate(&mut self, frame_time: Duration) {
        self.accumulator += frame_time;
    }

    /// Consume one step if the accumulator holds at least one
    pub fn try_step(&mut self) -> bool {
        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            true
        } else {
            false
        }
    }

    /// Length of one fixed step
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Time waiting in the accumulator
    pub fn remainder(&self) -> Duration {
        self.accumulator
    }

    /// Drop any accumulated time
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}
