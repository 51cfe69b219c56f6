use chrono::{Local, NaiveDate};

/// Source of the date stamped on metadata records
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the running machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always answers the same date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// `last_update` format of `plugins.json`, e.g. `March 7, 2024`
pub fn format_last_update(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
