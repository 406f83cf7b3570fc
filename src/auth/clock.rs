//! Clock trait abstraction for controlling the current date in tests.
//!
//! - `SystemClock`: delegates to the real UTC wall clock
//! - `FixedClock`: returns a configured date

use chrono::{NaiveDate, Utc};

/// Source of the current UTC calendar day.
pub trait Clock: Send + Sync + 'static {
    fn today(&self) -> NaiveDate;
}

/// Live implementation: `Utc::now()` truncated to the day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
