//! Time source and calendar days.
//!
//! Daily caps are not stored counters that need a reset job; they are derived
//! by filtering logs to the current calendar day. The day is always computed
//! in one configured time zone, from an injectable [`Clock`].

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use std::sync::{Mutex, PoisonError};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A calendar day in the canonical time zone, with its UTC bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// The local calendar date.
    pub day: NaiveDate,
    /// First instant of the day (inclusive).
    pub start: DateTime<Utc>,
    /// First instant of the next day (exclusive).
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The calendar day containing `now` in time zone `offset`.
    #[must_use]
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let day = now.with_timezone(&offset).date_naive();
        let start = offset
            .from_local_datetime(&day.and_time(chrono::NaiveTime::MIN))
            .single()
            .map_or(now, |local| local.with_timezone(&Utc));
        Self {
            day,
            start,
            end: start + Duration::days(1),
        }
    }

    /// Whether `at` falls inside this day.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}
