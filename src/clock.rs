//! Clock Module
//!
//! Time source shared by the in-memory cache backend and telemetry, so that
//! expiry and day boundaries can be driven by a simulated clock in tests.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Local, TimeZone};

// == Clock Trait ==
/// Source of the current local time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current local time.
    fn now(&self) -> DateTime<Local>;

    /// Returns the current time as Unix milliseconds.
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

// == System Clock ==
/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

// == Manual Clock ==
/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Local>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Jumps the clock to `to`.
    pub fn set(&self, to: DateTime<Local>) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

// == Day Boundary ==
/// Seconds remaining until the next local midnight, never less than one.
///
/// Falls back to a full day when the next midnight does not exist in the
/// local zone.
pub fn seconds_until_midnight(now: DateTime<Local>) -> u64 {
    let next_midnight = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest());

    match next_midnight {
        Some(midnight) => (midnight - now).num_seconds().max(1) as u64,
        None => 86_400,
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn local(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 12, h, m, s)
            .earliest()
            .unwrap()
    }

    #[test]
    fn test_seconds_until_midnight_one_minute_before() {
        assert_eq!(seconds_until_midnight(local(23, 59, 0)), 60);
    }

    #[test]
    fn test_seconds_until_midnight_at_noon() {
        assert_eq!(seconds_until_midnight(local(12, 0, 0)), 12 * 3600);
    }

    #[test]
    fn test_seconds_until_midnight_at_midnight() {
        assert_eq!(seconds_until_midnight(local(0, 0, 0)), 86_400);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(local(10, 0, 0));
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), local(11, 30, 0));
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::new(local(10, 0, 0));
        clock.set(local(22, 15, 0));
        assert_eq!(clock.now_ms(), local(22, 15, 0).timestamp_millis());
    }
}
