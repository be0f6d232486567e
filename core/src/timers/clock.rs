//! Wall-clock sources
//!
//! Deadlines are absolute wall-clock instants so they keep their meaning
//! across a suspended process. A monotonic clock would stop while suspended.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for deadline arithmetic.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Seconds from `now` until `end_time`, rounded to the nearest whole second.
/// Negative once the deadline has passed.
pub fn seconds_until(end_time: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = end_time.signed_duration_since(now).num_milliseconds();
    (millis as f64 / 1000.0).round() as i64
}
