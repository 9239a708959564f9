//! Sources for "today", the default anchor of a schedule.

use chrono::{Local, NaiveDate};

/// Oracle for the current calendar date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local date from the system each time it is asked
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
