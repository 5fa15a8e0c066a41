use std::cell::Cell;

/// One minute in milliseconds
pub const ONE_MINUTE_MS: i64 = 60_000;

/// Current-time accessor used for pruning and corroboration-window checks.
///
/// The engine never reads the wall clock directly so tests can drive time
/// explicitly.
pub trait Clock {
    /// Current time in milliseconds since the Unix epoch
    fn now_ms(&self) -> i64;
}

/// Wall-clock time via chrono
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually-advanced clock for tests.
///
/// The engine is single-threaded by contract, so interior mutability via
/// `Cell` is sufficient.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    /// Set the absolute time
    pub fn set(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }

    /// Advance the clock by the given number of milliseconds
    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);

        clock.advance(ONE_MINUTE_MS);
        assert_eq!(clock.now_ms(), 61_000);

        clock.set(5);
        assert_eq!(clock.now_ms(), 5);
    }

    #[test]
    fn test_system_clock_is_plausible() {
        // 2024-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_704_067_200_000);
    }
}
