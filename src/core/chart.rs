//! Renderer-independent chart description built from a quote series.

use crate::core::series::{Bar, QuoteSeries, decimate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Candlestick,
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Line => write!(f, "line"),
            ChartKind::Candlestick => write!(f, "candlestick"),
        }
    }
}

impl FromStr for ChartKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(ChartKind::Line),
            "candlestick" | "candle" => Ok(ChartKind::Candlestick),
            _ => Err(anyhow::anyhow!("Invalid chart kind: {}", s)),
        }
    }
}

/// Everything a renderer needs to draw one ticker's chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub bars: Vec<Bar>,
    /// Padded `(min, max)` of the Y axis.
    pub y_range: (f64, f64),
    /// Dotted horizontal line at the latest value.
    pub reference: f64,
    pub x_format: &'static str,
}

impl Chart {
    /// Builds a chart of at most `max_points` bars. Returns `None` for an
    /// empty series.
    pub fn build(series: &QuoteSeries, kind: ChartKind, max_points: usize) -> Option<Self> {
        let last = series.bars.last()?;
        // Extremes come from every bar, including those dropped by decimation.
        let (lo, hi) = match kind {
            ChartKind::Line => min_max(series.bars.iter().map(|b| b.close)),
            ChartKind::Candlestick => min_max(series.bars.iter().flat_map(|b| [b.low, b.high])),
        }?;
        let bars = decimate(&series.bars, max_points);

        Some(Self {
            kind,
            bars,
            y_range: padded_range(lo, hi),
            reference: last.close,
            x_format: DATE_FORMAT,
        })
    }

    pub fn first_label(&self) -> Option<String> {
        self.bars
            .first()
            .map(|b| b.date.format(self.x_format).to_string())
    }

    pub fn last_label(&self) -> Option<String> {
        self.bars
            .last()
            .map(|b| b.date.format(self.x_format).to_string())
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Pads `[min, max]` by 10% of the span. A flat series is padded by 1% of
/// its magnitude instead. The range is never clamped to zero.
pub fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        let pad = 0.1 * (max - min);
        (min - pad, max + pad)
    } else if max != 0.0 {
        let pad = 0.01 * max.abs();
        (max - pad, max + pad)
    } else {
        (-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn line_series(values: &[f64]) -> QuoteSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = values
            .iter()
            .enumerate()
            .map(|(i, v)| Bar::from_close(start + chrono::Duration::days(i as i64), *v))
            .collect();
        QuoteSeries::new("TEST", bars)
    }

    #[test]
    fn test_padded_range_uses_ten_percent_of_span() {
        let (lo, hi) = padded_range(100.0, 200.0);
        assert_eq!(lo, 100.0 - 0.1 * (200.0 - 100.0));
        assert_eq!(hi, 200.0 + 0.1 * (200.0 - 100.0));
    }

    #[test]
    fn test_padded_range_for_flat_series() {
        assert_eq!(padded_range(50.0, 50.0), (50.0 - 0.01 * 50.0, 50.0 + 0.01 * 50.0));
        assert_eq!(padded_range(-50.0, -50.0), (-50.5, -49.5));
        assert_eq!(padded_range(0.0, 0.0), (-1.0, 1.0));
    }

    #[test]
    fn test_range_is_not_clamped_to_zero() {
        let chart = Chart::build(&line_series(&[1000.0, 1010.0, 1020.0]), ChartKind::Line, 80)
            .unwrap();
        assert_eq!(chart.y_range, (998.0, 1022.0));
        assert_eq!(chart.reference, 1020.0);
        assert_eq!(chart.first_label().as_deref(), Some("2024-01-01"));
        assert_eq!(chart.last_label().as_deref(), Some("2024-01-03"));
    }

    #[test]
    fn test_candlestick_range_uses_high_and_low() {
        let mut series = line_series(&[10.0, 20.0]);
        series.bars[0].low = 5.0;
        series.bars[1].high = 25.0;
        let chart = Chart::build(&series, ChartKind::Candlestick, 80).unwrap();
        assert_eq!(chart.y_range, (3.0, 27.0));
    }

    #[test]
    fn test_build_decimates_but_keeps_latest() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let chart = Chart::build(&line_series(&values), ChartKind::Line, 30).unwrap();
        assert!(chart.bars.len() <= 31);
        assert_eq!(chart.bars.last().map(|b| b.close), Some(99.0));
        assert_eq!(chart.reference, 99.0);
    }

    #[test]
    fn test_range_covers_extremes_dropped_by_decimation() {
        let mut values = vec![100.0; 100];
        values[1] = 50.0;
        let chart = Chart::build(&line_series(&values), ChartKind::Line, 72).unwrap();
        assert!(chart.bars.iter().all(|b| b.close == 100.0));
        assert_eq!(chart.y_range, (45.0, 105.0));
    }

    #[test]
    fn test_empty_series_has_no_chart() {
        assert!(Chart::build(&line_series(&[]), ChartKind::Line, 80).is_none());
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!("Candle".parse::<ChartKind>().unwrap(), ChartKind::Candlestick);
        assert_eq!("line".parse::<ChartKind>().unwrap(), ChartKind::Line);
        assert!("bar".parse::<ChartKind>().is_err());
    }
}
