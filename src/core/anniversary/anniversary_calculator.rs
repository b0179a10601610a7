use chrono::{Datelike, NaiveDate};

/// Whole days since `start`. A `today` before `start` clamps to 0.
pub fn days_together(start: NaiveDate, today: NaiveDate) -> u32 {
    u32::try_from((today - start).num_days()).unwrap_or(0)
}

/// The anniversary's date in `year`.
///
/// A Feb 29 start date is celebrated on Feb 28 in non-leap years.
pub fn anniversary_in(start: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, start.month(), start.day()).or_else(|| {
        (start.month() == 2 && start.day() == 29)
            .then(|| NaiveDate::from_ymd_opt(year, 2, 28))
            .flatten()
    })
}

/// The next anniversary on or after `today`.
pub fn next_anniversary(start: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = anniversary_in(start, today.year())?;
    if this_year < today {
        anniversary_in(start, today.year() + 1)
    } else {
        Some(this_year)
    }
}

/// Days until the next anniversary, 0 on the day itself.
pub fn days_to_next_anniversary(start: NaiveDate, today: NaiveDate) -> u32 {
    next_anniversary(start, today)
        .and_then(|next| u32::try_from((next - today).num_days()).ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnniversarySummary {
    pub start: NaiveDate,
    pub days_together: u32,
    pub days_to_next: u32,
    pub next_date: Option<NaiveDate>,
    /// How many full years the next anniversary will mark.
    pub next_years: i32,
}

/// Counters for the home page, anchored to a fixed start date.
#[derive(Debug, Clone, Copy)]
pub struct AnniversaryCalculator {
    start: NaiveDate,
}

impl AnniversaryCalculator {
    pub fn new(start: NaiveDate) -> Self {
        Self { start }
    }

    pub fn summary(&self, today: NaiveDate) -> AnniversarySummary {
        let next_date = next_anniversary(self.start, today);
        AnniversarySummary {
            start: self.start,
            days_together: days_together(self.start, today),
            days_to_next: days_to_next_anniversary(self.start, today),
            next_date,
            next_years: next_date.map_or(0, |d| d.year() - self.start.year()),
        }
    }
}
