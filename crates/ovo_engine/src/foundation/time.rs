//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
#[derive(Debug)]
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    #[must_use]
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Fixed-interval tick source
///
/// Converts wall-clock time into a whole number of ticks of `interval`,
/// carrying the remainder so no time is lost between polls.
#[derive(Debug)]
pub struct TickTimer {
    interval: Duration,
    last_poll: Instant,
    accumulated: Duration,
    total_ticks: u64,
}

impl TickTimer {
    /// Create a tick timer firing every `interval`
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_poll: Instant::now(),
            accumulated: Duration::ZERO,
            total_ticks: 0,
        }
    }

    /// Tick interval
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Total ticks produced since creation
    #[must_use]
    pub const fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Advance by the wall-clock time since the last poll; returns due ticks
    pub fn poll(&mut self) -> u32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_poll);
        self.last_poll = now;
        self.advance(elapsed)
    }

    /// Advance by an explicit amount of time; returns due ticks
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        self.accumulated += elapsed;
        let mut ticks = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            ticks += 1;
        }
        self.total_ticks += u64::from(ticks);
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_timer_carries_remainder() {
        let mut timer = TickTimer::new(Duration::from_millis(50));
        assert_eq!(timer.advance(Duration::from_millis(30)), 0);
        assert_eq!(timer.advance(Duration::from_millis(30)), 1);
        assert_eq!(timer.advance(Duration::from_millis(140)), 3);
        assert_eq!(timer.total_ticks(), 4);
    }

    #[test]
    fn test_zero_interval_never_ticks() {
        let mut timer = TickTimer::new(Duration::ZERO);
        assert_eq!(timer.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_time() >= 0.0);
    }
}
