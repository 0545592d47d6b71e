//! Canonical quote series shared by every provider and view.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Which column of a ticker's data is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMode {
    #[default]
    Close,
    Volume,
    Rsi,
}

impl SeriesMode {
    /// Column names matched case-insensitively, in order of preference.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            SeriesMode::Close => &["close", "adj close", "price", "value"],
            SeriesMode::Volume => &["volume"],
            SeriesMode::Rsi => &["rsi", "rsi14"],
        }
    }
}

impl Display for SeriesMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesMode::Close => write!(f, "close"),
            SeriesMode::Volume => write!(f, "volume"),
            SeriesMode::Rsi => write!(f, "rsi"),
        }
    }
}

impl FromStr for SeriesMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "close" => Ok(SeriesMode::Close),
            "volume" => Ok(SeriesMode::Volume),
            "rsi" => Ok(SeriesMode::Rsi),
            _ => Err(anyhow::anyhow!("Invalid series mode: {}", s)),
        }
    }
}

/// A single daily (or weekly) OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// A bar for single-value sources where only a close is known.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// Bars for one symbol, dates strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

/// Flat `(date, close)` series consumed by the metric and line chart.
pub type ClosingSeries = Vec<(NaiveDate, f64)>;

impl QuoteSeries {
    pub fn new(symbol: &str, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.to_string(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn closes(&self) -> ClosingSeries {
        self.bars.iter().map(|b| (b.date, b.close)).collect()
    }

    /// Resamples to weeks ending on Sunday, each bar labelled by that Sunday.
    pub fn resample_weekly(&self) -> QuoteSeries {
        let mut weekly: Vec<Bar> = Vec::new();

        for bar in &self.bars {
            let label = week_ending_sunday(bar.date);
            match weekly.last_mut() {
                Some(current) if current.date == label => {
                    current.high = current.high.max(bar.high);
                    current.low = current.low.min(bar.low);
                    current.close = bar.close;
                    current.volume += bar.volume;
                }
                _ => weekly.push(Bar { date: label, ..*bar }),
            }
        }

        QuoteSeries::new(&self.symbol, weekly)
    }
}

fn week_ending_sunday(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_to_sunday)
}

/// Keeps every `ceil(n / max_points)`-th item, always including the last one.
pub fn decimate<T: Clone>(points: &[T], max_points: usize) -> Vec<T> {
    if max_points == 0 || points.len() <= max_points {
        return points.to_vec();
    }
    let step = points.len().div_ceil(max_points);
    let mut out: Vec<T> = points.iter().step_by(step).cloned().collect();
    if (points.len() - 1) % step != 0 {
        if let Some(last) = points.last() {
            out.push(last.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
        Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    #[test]
    fn test_series_mode_parse_and_fields() {
        assert_eq!("RSI".parse::<SeriesMode>().unwrap(), SeriesMode::Rsi);
        assert_eq!("volume".parse::<SeriesMode>().unwrap(), SeriesMode::Volume);
        assert!("open".parse::<SeriesMode>().is_err());
        assert_eq!(SeriesMode::Close.fields()[0], "close");
        assert_eq!(SeriesMode::default(), SeriesMode::Close);
    }

    #[test]
    fn test_resample_weekly_aggregates_ohlcv() {
        // 2024-01-01 is a Monday
        let series = QuoteSeries::new(
            "AAPL",
            vec![
                bar(date(2024, 1, 1), 10.0, 12.0, 9.0, 11.0, 100.0),
                bar(date(2024, 1, 3), 11.0, 15.0, 10.5, 14.0, 200.0),
                bar(date(2024, 1, 5), 14.0, 14.5, 8.0, 13.0, 50.0),
                bar(date(2024, 1, 8), 13.0, 13.5, 12.0, 12.5, 10.0),
            ],
        );

        let weekly = series.resample_weekly();
        assert_eq!(weekly.len(), 2);

        let first = weekly.bars[0];
        assert_eq!(first.date, date(2024, 1, 7));
        assert_eq!(first.open, 10.0);
        assert_eq!(first.high, 15.0);
        assert_eq!(first.low, 8.0);
        assert_eq!(first.close, 13.0);
        assert_eq!(first.volume, 350.0);

        let second = weekly.bars[1];
        assert_eq!(second.date, date(2024, 1, 14));
        assert_eq!(second.close, 12.5);
    }

    #[test]
    fn test_sunday_belongs_to_its_own_week() {
        assert_eq!(week_ending_sunday(date(2024, 1, 7)), date(2024, 1, 7));
        assert_eq!(week_ending_sunday(date(2024, 1, 8)), date(2024, 1, 14));
    }

    #[test]
    fn test_decimate_keeps_last_point() {
        let points: Vec<u32> = (0..10).collect();
        assert_eq!(decimate(&points, 4), vec![0, 3, 6, 9]);
        assert_eq!(decimate(&points, 3), vec![0, 4, 8, 9]);
        assert_eq!(decimate(&points, 20), points);
    }
}
