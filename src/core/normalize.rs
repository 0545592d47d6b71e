//! Flattens provider-specific frame shapes into one canonical [`QuoteSeries`].
//!
//! Every fetch result passes through [`normalize`] before anything downstream
//! looks at it, so the metric and chart code only ever see flat, date-indexed
//! bars with strictly increasing dates.

use crate::core::frame::{Cell, ColumnKey, RawFrame};
use crate::core::series::{Bar, QuoteSeries, SeriesMode};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("No usable rows for {0}")]
    Empty(String),

    #[error("No {mode} column for {symbol} (columns: {columns})")]
    MissingColumn {
        symbol: String,
        mode: SeriesMode,
        columns: String,
    },

    #[error("Cannot coerce {len} values to a scalar at {date} for {symbol}")]
    NotScalar {
        symbol: String,
        date: NaiveDate,
        len: usize,
    },
}

/// Normalizes `frame` into the closing-price series of `symbol`.
pub fn normalize(frame: &RawFrame, symbol: &str) -> Result<QuoteSeries, NormalizeError> {
    normalize_mode(frame, symbol, SeriesMode::Close)
}

/// Normalizes `frame` into the series of `symbol` selected by `mode`.
///
/// In close mode open/high/low fall back to the close and volume to zero.
/// Other modes produce flat bars of the selected column.
pub fn normalize_mode(
    frame: &RawFrame,
    symbol: &str,
    mode: SeriesMode,
) -> Result<QuoteSeries, NormalizeError> {
    if frame.is_empty() {
        return Err(NormalizeError::Empty(symbol.to_string()));
    }

    let selected = select_symbol_columns(frame, symbol);
    let value = mode
        .fields()
        .iter()
        .find_map(|field| find_column(&selected, field))
        .ok_or_else(|| NormalizeError::MissingColumn {
            symbol: symbol.to_string(),
            mode,
            columns: frame
                .columns
                .iter()
                .map(|(key, _)| key.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })?;
    let ohlcv = |field: &str| match mode {
        SeriesMode::Close => find_column(&selected, field),
        _ => None,
    };
    let (open, high, low, volume) = (ohlcv("open"), ohlcv("high"), ohlcv("low"), ohlcv("volume"));

    let latest_row = frame
        .index
        .iter()
        .enumerate()
        .max_by_key(|(_, index)| index.local_date())
        .map(|(row, _)| row);

    let mut bars: Vec<Bar> = Vec::with_capacity(frame.len());
    for (row, index) in frame.index.iter().enumerate() {
        let date = index.local_date();
        let close = match scalar_at(value, row) {
            Ok(close) => close,
            Err(len) if Some(row) == latest_row => {
                return Err(NormalizeError::NotScalar {
                    symbol: symbol.to_string(),
                    date,
                    len,
                });
            }
            Err(_) => None,
        };
        let Some(close) = close else {
            continue;
        };
        let or_close = |column: Option<&[Cell]>| {
            column
                .and_then(|cells| scalar_at(cells, row).ok().flatten())
                .unwrap_or(close)
        };
        bars.push(Bar {
            date,
            open: or_close(open),
            high: or_close(high),
            low: or_close(low),
            close,
            volume: volume
                .and_then(|cells| scalar_at(cells, row).ok().flatten())
                .unwrap_or(0.0),
        });
    }

    // Stripping the offset can collapse two instants onto one date; keep the last.
    bars.sort_by_key(|bar| bar.date);
    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }

    if deduped.is_empty() {
        return Err(NormalizeError::Empty(symbol.to_string()));
    }
    Ok(QuoteSeries::new(symbol, deduped))
}

/// Picks the columns belonging to `symbol`. A frame with exactly one symbol
/// in its two-level labels is taken as that symbol's data.
fn select_symbol_columns<'a>(
    frame: &'a RawFrame,
    symbol: &str,
) -> Vec<(&'a ColumnKey, &'a [Cell])> {
    let symbols = frame.symbols();
    let wanted = if symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol)) {
        Some(symbol)
    } else if symbols.len() == 1 {
        Some(symbols[0])
    } else {
        None
    };

    frame
        .columns
        .iter()
        .filter(|(key, _)| match (key.symbol(), wanted) {
            (None, _) => true,
            (Some(s), Some(w)) => s.eq_ignore_ascii_case(w),
            (Some(_), None) => false,
        })
        .map(|(key, cells)| (key, cells.as_slice()))
        .collect()
}

fn find_column<'a>(columns: &[(&ColumnKey, &'a [Cell])], field: &str) -> Option<&'a [Cell]> {
    columns
        .iter()
        .find(|(key, _)| key.field().trim().eq_ignore_ascii_case(field))
        .map(|(_, cells)| *cells)
}

/// The finite scalar at `row`, or the length of a wrapped cell that does not
/// hold exactly one value.
fn scalar_at(cells: &[Cell], row: usize) -> Result<Option<f64>, usize> {
    let value = match cells.get(row) {
        None | Some(Cell::Scalar(None)) => None,
        Some(Cell::Scalar(Some(v))) => Some(*v),
        Some(Cell::Wrapped(values)) => match values.as_slice() {
            [v] => Some(*v),
            _ => return Err(values.len()),
        },
    };
    Ok(value.filter(|v| v.is_finite()))
}
