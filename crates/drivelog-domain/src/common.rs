use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month (`YYYY-MM`), used for the month filter and the
/// distinct-months query. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// True when `day` falls inside this month.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day.year() == self.year && day.month() == self.month
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (year, month) = value.split_once('-').ok_or(ParseMonthKeyError)?;
        let year: i32 = year.parse().map_err(|_| ParseMonthKeyError)?;
        let month: u32 = month.parse().map_err(|_| ParseMonthKeyError)?;
        MonthKey::new(year, month).ok_or(ParseMonthKeyError)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = ParseMonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

/// Raised when a string does not hold a `YYYY-MM` month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseMonthKeyError;

impl fmt::Display for ParseMonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected a month in YYYY-MM form")
    }
}

impl std::error::Error for ParseMonthKeyError {}
