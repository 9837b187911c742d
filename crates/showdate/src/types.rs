use std::fmt::Display;
use std::num::ParseIntError;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("Invalid date format '{0}'. Expected D.MM")]
    InvalidFormat(String),
    #[error("Date '{0}' is outside the supported calendar range")]
    OutOfRange(String),
    #[error("Invalid number '{part}' in date '{token}': {source}")]
    InvalidNumber {
        token: String,
        part: String,
        source: ParseIntError,
    },
}

/// A screening date as shown to users, `"D.MM"`, e.g. `"5.03"` or `"24.09"`.
///
/// The year is never part of the token; it comes from the configured season.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateToken(String);

impl DateToken {
    pub fn new(day: u32, month: u32) -> Self {
        Self(format!("{}.{:02}", day, month))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DateToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DateToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for DateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Midnight of a `(year, month, day)` triple.
///
/// Days and months outside their usual range roll over into the neighbouring
/// month or year, so `31.02` is the 3rd of March and `0.10` is the 30th of
/// September. Unparseable tokens become [`CalendarInstant::MIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CalendarInstant(Option<NaiveDate>);

impl CalendarInstant {
    /// What an unparseable token resolves to. Sorts before every real date.
    pub const MIN: CalendarInstant = CalendarInstant(None);

    /// `None` when the rolled over date leaves the representable range.
    pub(crate) fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let with_month = match month {
            0 => start.checked_sub_months(Months::new(1))?,
            m => start.checked_add_months(Months::new(m - 1))?,
        };
        let date = match day {
            0 => with_month.checked_sub_days(Days::new(1))?,
            d => with_month.checked_add_days(Days::new(u64::from(d) - 1))?,
        };
        Some(Self(Some(date)))
    }

    pub fn year(&self) -> i32 {
        self.0.map_or(0, |d| d.year())
    }

    pub fn month(&self) -> u32 {
        self.0.map_or(0, |d| d.month())
    }

    pub fn day(&self) -> u32 {
        self.0.map_or(0, |d| d.day())
    }

    pub fn is_min(&self) -> bool {
        self.to_naive_date().is_none()
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        self.0
    }
}

impl Display for CalendarInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_naive_date() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => f.write_str("0000-00-00"),
        }
    }
}

/// Unique screening dates found on one page, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateSet(Vec<DateToken>);

impl DateSet {
    /// Callers must hand in unique tokens already sorted by instant.
    pub(crate) fn from_sorted(tokens: Vec<DateToken>) -> Self {
        Self(tokens)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DateToken> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, token: &DateToken) -> bool {
        self.0.contains(token)
    }

    pub fn as_slice(&self) -> &[DateToken] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a DateSet {
    type Item = &'a DateToken;
    type IntoIter = std::slice::Iter<'a, DateToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for DateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", token)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_token_pads_month_but_not_day() {
        assert_eq!(DateToken::new(5, 3).as_str(), "5.03");
        assert_eq!(DateToken::new(24, 9).as_str(), "24.09");
        assert_eq!(DateToken::new(1, 12).as_str(), "1.12");
    }

    #[test]
    fn test_min_instant_sorts_first() {
        let earliest_real = CalendarInstant::new(1, 1, 1).unwrap();
        assert!(CalendarInstant::MIN < earliest_real);
        assert!(CalendarInstant::MIN.is_min());
        assert!(!earliest_real.is_min());
        assert_eq!(CalendarInstant::MIN.to_string(), "0000-00-00");
    }

    #[test]
    fn test_out_of_range_parts_roll_over() {
        let feb_31 = CalendarInstant::new(2025, 2, 31).unwrap();
        assert_eq!(feb_31.to_naive_date(), NaiveDate::from_ymd_opt(2025, 3, 3));
        assert!(feb_31 > CalendarInstant::new(2025, 3, 2).unwrap());

        let oct_0 = CalendarInstant::new(2025, 10, 0).unwrap();
        assert_eq!(oct_0.to_string(), "2025-09-30");

        let month_13 = CalendarInstant::new(2025, 13, 1).unwrap();
        assert_eq!(month_13.to_string(), "2026-01-01");

        let month_0 = CalendarInstant::new(2025, 0, 15).unwrap();
        assert_eq!(month_0.to_string(), "2024-12-15");
    }

    #[test]
    fn test_unrepresentable_dates_are_rejected() {
        assert_eq!(CalendarInstant::new(2025, 1, u32::MAX), None);
    }

    #[test]
    fn test_date_set_display() {
        let set = DateSet::from_sorted(vec![DateToken::new(24, 9), DateToken::new(30, 9)]);
        assert_eq!(set.to_string(), "[24.09, 30.09]");
        assert_eq!(DateSet::default().to_string(), "[]");
    }

    #[test]
    fn test_date_token_serializes_as_plain_string() {
        let json = serde_json::to_string(&DateToken::new(24, 9)).unwrap();
        assert_eq!(json, "\"24.09\"");
        let back: DateToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DateToken::from("24.09"));
    }
}
