//! Time source abstraction.
//!
//! Business rules never read the system clock themselves. The session layer
//! asks a [`Clock`] for the current instant, and the renewal rules take
//! "today" as a plain argument.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

/// Source of the current instant and calendar date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date the agent is working in.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time. Dates are taken in the local timezone so "today" matches
/// what the agent sees on their calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
