//! Calendar date ranges used as fetch windows

use anyhow::{Result, anyhow};
use chrono::{Duration, NaiveDate, NaiveTime};
use std::fmt::Display;

/// An inclusive `[start, end]` window of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(anyhow!("Start date {start} is after end date {end}"));
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending at `end`. Fails when the start would
    /// fall before the earliest representable date.
    pub fn lookback(days: u32, end: NaiveDate) -> Result<Self> {
        let start = end
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| anyhow!("Lookback of {days} days from {end} is out of range"))?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Unix timestamps bounding the range: midnight UTC of `start` and
    /// midnight UTC of the day after `end`.
    pub fn to_unix_bounds(&self) -> (i64, i64) {
        let from = self.start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let to = self
            .end
            .succ_opt()
            .unwrap_or(self.end)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        (from, to)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());
        assert!(DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_lookback_ends_today() {
        let range = DateRange::lookback(30, date(2024, 3, 31)).unwrap();
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 31));
        assert!(range.contains(date(2024, 3, 15)));
        assert!(!range.contains(date(2024, 2, 29)));
    }

    #[test]
    fn test_lookback_beyond_calendar_is_an_error() {
        let err = DateRange::lookback(200_000_000, date(2024, 3, 31)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(DateRange::lookback(u32::MAX, NaiveDate::MIN).is_err());
    }

    #[test]
    fn test_unix_bounds_at_calendar_end() {
        let range = DateRange::new(NaiveDate::MAX, NaiveDate::MAX).unwrap();
        let (from, to) = range.to_unix_bounds();
        assert_eq!(from, to);
    }

    #[test]
    fn test_unix_bounds_cover_the_end_date() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 2)).unwrap();
        let (from, to) = range.to_unix_bounds();
        assert_eq!(from, 1_704_067_200);
        assert_eq!(to - from, 2 * 86_400);
    }
}
