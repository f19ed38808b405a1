use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic wall-clock timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

//
// ─── TIMER PORT ────────────────────────────────────────────────────────────────
//

/// Time source used to measure how long an item was on screen.
///
/// Injected into the quiz controller so elapsed time can be tested without
/// a real clock.
pub trait Timer: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production timer: wall-clock anchor advanced by a monotonic `Instant`.
///
/// Readings never go backwards even if the system clock is adjusted.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTimer {
    anchor_wall: DateTime<Utc>,
    anchor: Instant,
}

impl MonotonicTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchor_wall: Utc::now(),
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for MonotonicTimer {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Duration::from_std(self.anchor.elapsed()).unwrap_or(Duration::MAX);
        self.anchor_wall
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Hand-driven timer for tests and scripted demos.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the controller.
#[derive(Clone)]
pub struct ManualTimer {
    at: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualTimer {
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            at: Arc::new(Mutex::new(at)),
        }
    }

    /// Moves the reading by `delta`; negative values simulate a clock jump back.
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.at.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> DateTime<Utc> {
        *self.at.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTimer").field("at", &self.now()).finish()
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `ManualTimer` starting at the deterministic test timestamp.
#[must_use]
pub fn manual_timer() -> ManualTimer {
    ManualTimer::new(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = Clock::fixed(fixed_now());
        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(5));
    }

    #[test]
    fn manual_timer_clones_share_reading() {
        let timer = manual_timer();
        let handle = timer.clone();
        handle.advance_secs(3);
        assert_eq!(timer.now(), fixed_now() + Duration::seconds(3));
        handle.advance_secs(-10);
        assert!(timer.now() < fixed_now());
    }

    #[test]
    fn monotonic_timer_never_goes_backwards() {
        let timer = MonotonicTimer::new();
        let first = timer.now();
        let second = timer.now();
        assert!(second >= first);
    }
}
