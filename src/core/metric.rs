//! Latest-value metrics derived from a closing series.

use crate::core::series::ClosingSeries;
use chrono::NaiveDate;

/// Latest value and its change against the previous sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSnapshot {
    pub as_of: NaiveDate,
    pub latest: f64,
    pub previous: f64,
    pub delta: f64,
    pub delta_pct: f64,
}

impl MetricSnapshot {
    /// Returns `None` for an empty series. With a single point, or a zero
    /// previous value, the change is reported as zero.
    pub fn from_closes(closes: &ClosingSeries) -> Option<Self> {
        let (as_of, latest) = *closes.last()?;
        let previous = match closes.len() {
            0 | 1 => latest,
            n => closes[n - 2].1,
        };
        let (delta, delta_pct) = if closes.len() < 2 || previous == 0.0 {
            (latest - previous, 0.0)
        } else {
            let delta = latest - previous;
            (delta, 100.0 * delta / previous)
        };
        Some(Self {
            as_of,
            latest,
            previous,
            delta,
            delta_pct,
        })
    }

    pub fn value_text(&self) -> String {
        format_number(self.latest, 2)
    }

    /// Signed change, e.g. `+3.00 (+2.00%)`.
    pub fn change_text(&self) -> String {
        format!(
            "{} ({}%)",
            format_signed(self.delta),
            format_signed(self.delta_pct)
        )
    }
}

/// Formats with `decimals` places and `,` thousands separators.
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn format_signed(value: f64) -> String {
    let text = format_number(value, 2);
    if text.starts_with('-') {
        text
    } else {
        format!("+{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> ClosingSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + chrono::Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_snapshot_from_two_or_more_points() {
        let snapshot = MetricSnapshot::from_closes(&series(&[140.0, 150.0, 153.0])).unwrap();
        assert_eq!(snapshot.latest, 153.0);
        assert_eq!(snapshot.previous, 150.0);
        assert_eq!(snapshot.delta, 153.0 - 150.0);
        assert_eq!(snapshot.delta_pct, 100.0 * (153.0 - 150.0) / 150.0);
        assert_eq!(snapshot.value_text(), "153.00");
        assert_eq!(snapshot.change_text(), "+3.00 (+2.00%)");
    }

    #[test]
    fn test_single_point_has_zero_change() {
        let snapshot = MetricSnapshot::from_closes(&series(&[42.0])).unwrap();
        assert_eq!(snapshot.delta, 0.0);
        assert_eq!(snapshot.delta_pct, 0.0);
        assert_eq!(snapshot.change_text(), "+0.00 (+0.00%)");
    }

    #[test]
    fn test_empty_series_has_no_snapshot() {
        assert!(MetricSnapshot::from_closes(&series(&[])).is_none());
    }

    #[test]
    fn test_zero_previous_does_not_divide() {
        let snapshot = MetricSnapshot::from_closes(&series(&[0.0, 5.0])).unwrap();
        assert_eq!(snapshot.delta, 5.0);
        assert_eq!(snapshot.delta_pct, 0.0);
    }

    #[test]
    fn test_negative_change_text() {
        let snapshot = MetricSnapshot::from_closes(&series(&[1400.0, 1260.0])).unwrap();
        assert_eq!(snapshot.value_text(), "1,260.00");
        assert_eq!(snapshot.change_text(), "-140.00 (-10.00%)");
    }

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(999.999, 2), "1,000.00");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-98765.4, 1), "-98,765.4");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(71000.0, 0), "71,000");
    }
}
