//! Date type for rate observations.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{FxError, FxResult};

/// A calendar date keyed by rate observations and conversion queries.
///
/// This is a newtype wrapper around `chrono::NaiveDate`.
///
/// # Example
///
/// ```rust
/// use fxrate_core::types::Date;
///
/// let date = Date::from_ymd(2024, 2, 15).unwrap();
/// assert_eq!(date.add_days(15), Date::from_ymd(2024, 3, 1).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> FxResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| FxError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Creates a date from an ISO 8601 string (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> FxResult<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| FxError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Returns today's date in UTC.
    #[must_use]
    pub fn today() -> Self {
        Date(Utc::now().date_naive())
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of days to the date.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Calculates the number of calendar days between two dates.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl Add<i64> for Date {
    type Output = Self;

    /// Adds days to a date.
    fn add(self, days: i64) -> Self::Output {
        self.add_days(days)
    }
}

impl Sub<i64> for Date {
    type Output = Self;

    /// Subtracts days from a date.
    fn sub(self, days: i64) -> Self::Output {
        self.add_days(-days)
    }
}

impl Sub<Date> for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    fn sub(self, other: Date) -> Self::Output {
        other.days_between(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_creation() {
        let date = Date::from_ymd(2024, 3, 1).unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_invalid_date() {
        assert!(Date::from_ymd(2025, 2, 29).is_err());
        assert!(Date::from_ymd(2025, 13, 1).is_err());
    }

    #[test]
    fn test_parse() {
        let date = Date::parse("2024-02-15").unwrap();
        assert_eq!(date, Date::from_ymd(2024, 2, 15).unwrap());
        assert!(matches!(
            Date::parse("15.02.2024"),
            Err(FxError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_ordering_across_leap_day() {
        let feb28 = Date::from_ymd(2024, 2, 28).unwrap();
        let mar1 = Date::from_ymd(2024, 3, 1).unwrap();
        assert!(feb28 < mar1);
        assert_eq!(mar1 - feb28, 2);
        assert_eq!(feb28 + 2, mar1);
        assert_eq!(mar1 - 2, feb28);
    }

    #[test]
    fn test_display() {
        let date = Date::from_ymd(2024, 1, 1).unwrap();
        assert_eq!(format!("{}", date), "2024-01-01");
    }

    #[test]
    fn test_serde() {
        let date = Date::from_ymd(2024, 1, 1).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2024-01-01\"");
        let parsed: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(date, parsed);
    }
}
