//! Fixed-timestep accounting.
//!
//! The simulation advances in constant ticks while rendering happens once per
//! real frame. [`FixedTimestep`] holds the "time debt": wall time that has
//! passed but has not yet been simulated. The engine loop adds the frame time
//! and then consumes whole ticks until less than one tick is left.
//!
//! Nothing here touches a window, so the tick arithmetic is tested directly.

use instant::{Duration, Instant};

/// Simulation rate used when nothing else is configured.
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Whether the main loop keeps iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

impl LoopState {
    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }
}

/// Tick accumulator.
///
/// Invariant: after [`FixedTimestep::consume_tick`] returns `false`, the
/// remaining debt is strictly below one step.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    debt: Duration,
}

impl FixedTimestep {
    /// Creates an accumulator with a fixed step.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero, which would never drain.
    pub fn new(step: Duration) -> Self {
        assert!(!step.is_zero(), "fixed timestep must be positive");
        Self {
            step,
            debt: Duration::ZERO,
        }
    }

    /// Creates an accumulator that ticks `rate` times per simulated second.
    ///
    /// The step is truncated to whole nanoseconds (60 Hz gives 16_666_666 ns).
    ///
    /// # Panics
    ///
    /// Panics if `rate` is zero.
    pub fn from_rate(rate: u32) -> Self {
        assert!(rate > 0, "tick rate must be positive, got {}", rate);
        Self::new(Duration::from_nanos(1_000_000_000 / rate as u64))
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Wall time accumulated but not yet simulated.
    pub fn debt(&self) -> Duration {
        self.debt
    }

    /// Adds a measured frame duration to the debt.
    pub fn accumulate(&mut self, elapsed: Duration) {
        self.debt += elapsed;
    }

    /// Takes one tick off the debt if a whole tick is available.
    pub fn consume_tick(&mut self) -> bool {
        if self.debt >= self.step {
            self.debt -= self.step;
            true
        } else {
            false
        }
    }

    /// Accumulates `elapsed` and drains it, returning how many ticks ran.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulate(elapsed);
        let mut ticks = 0;
        while self.consume_tick() {
            ticks += 1;
        }
        ticks
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::from_rate(DEFAULT_TICK_RATE)
    }
}

/// Wall clock that reports the time since it was last restarted.
#[derive(Debug, Clone)]
pub struct Clock {
    last: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Returns the time since the previous restart and restarts the clock.
    pub fn restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
