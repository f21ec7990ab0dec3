// Month cursor and day-type (holiday) rules.
//
// A day is a holiday when an override says so, otherwise when it falls on a
// Saturday or Sunday. Removing an override reverts to the weekday rule.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOverride {
    pub is_holiday: bool,
    #[serde(default)]
    pub note: String,
}

pub type DayOverrides = BTreeMap<NaiveDate, DayOverride>;

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_holiday(date: NaiveDate, overrides: &DayOverrides) -> bool {
    overrides
        .get(&date)
        .map(|day| day.is_holiday)
        .unwrap_or_else(|| is_weekend(date))
}

/// The month the grid displays. Always holds a valid first-of-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    /// `month` is 1-based. Returns None for an invalid month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn month(self) -> u32 {
        self.first.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn next(self) -> Self {
        Self {
            first: self.first.checked_add_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    pub fn prev(self) -> Self {
        Self {
            first: self.first.checked_sub_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    pub fn days(self) -> Vec<NaiveDate> {
        self.first
            .iter_days()
            .take_while(|day| day.month() == self.first.month())
            .collect()
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}
