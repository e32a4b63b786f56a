//! CPU Clock.
use std::{
    thread,
    time::{Duration, Instant},
};

use crate::constants::*;

/// Clock frequency, in hertz (per second)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// Fixed-rate software clock.
///
/// Elapsed time is accumulated, and each whole period that has passed
/// counts as one cycle. The remainder carries over to the next call,
/// so the clock doesn't drift when the caller's frame time doesn't
/// divide evenly into the period.
pub struct Clock {
    period: Duration,
    accumulator: Duration,
    last: Instant,
}

impl Clock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            accumulator: Duration::ZERO,
            last: Instant::now(),
        }
    }

    pub fn from_hz(freq: Hz) -> Self {
        Self::new(freq.into())
    }

    /// Set the clock state back to zero.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
        self.last = Instant::now();
    }

    /// Add elapsed time, and return the number of cycles that are due.
    ///
    /// A zero period means the clock is unthrottled, and no cycles are
    /// ever due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.period.is_zero() {
            return 0;
        }

        self.accumulator += elapsed;
        let mut cycles = 0;
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            cycles += 1;
        }
        cycles
    }

    /// Wall time since the previous call, or since the last reset.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed
    }

    /// Block the current thread until one period has passed since the last lap.
    pub fn wait(&mut self) {
        loop {
            let elapsed = self.last.elapsed();
            if elapsed < self.period {
                // Sleep does not have enough resolution, and causes
                // the clock to run at 30 FPS.
                //
                // Spinning a loop causes high CPU usage and fan madness.
                //
                // Yielding in a loop is the best alternative.
                thread::yield_now();
            } else {
                return;
            }
        }
    }
}

impl Default for Clock {
    /// Clock running at the timer frequency of 60Hz.
    fn default() -> Self {
        Self::new(Duration::from_nanos(CLOCK_CYCLE_TIME))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clock_hz() {
        let interval: Duration = Hz(60).into();
        assert_eq!(interval.as_millis(), 16);
        let interval: Duration = Hz(0).into();
        assert!(interval.is_zero());
    }

    #[test]
    fn test_advance_carries_remainder() {
        let mut clock = Clock::new(Duration::from_millis(10));
        assert_eq!(clock.advance(Duration::from_millis(25)), 2);
        // 5ms carried over
        assert_eq!(clock.advance(Duration::from_millis(5)), 1);
        assert_eq!(clock.advance(Duration::from_millis(9)), 0);
        assert_eq!(clock.advance(Duration::from_millis(1)), 1);
    }

    #[test]
    fn test_default_is_timer_rate() {
        let mut clock = Clock::default();
        assert_eq!(clock.advance(Duration::from_secs(1)), 60);
    }

    #[test]
    fn test_unthrottled() {
        let mut clock = Clock::from_hz(Hz(0));
        assert_eq!(clock.advance(Duration::from_secs(1)), 0);
    }
}
