use chrono::{Datelike, Local, NaiveDate};

/// Source of "today" for age derivation.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine running the form.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Age as the difference of calendar years. Month and day are ignored, so
/// someone born late in the year is counted one year older until their
/// birthday passes.
pub fn age_in_years(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - birth_date.year()
}
