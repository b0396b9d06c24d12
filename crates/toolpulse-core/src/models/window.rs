//! Inclusive calendar-date windows used by every query

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current UTC calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Inclusive `[start, end]` date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[today - days, today]`
    pub fn trailing(days: u32) -> Self {
        let end = today();
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }

    /// Fill missing bounds: `end` defaults to today, `start` to `end - default_days`
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>, default_days: u32) -> Self {
        let end = end.unwrap_or_else(today);
        let start = start.unwrap_or_else(|| end - Duration::days(i64::from(default_days)));
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered (0 for an inverted window)
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
