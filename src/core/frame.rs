//! Raw tabular data as returned by providers, before normalization.

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::fmt::Display;

/// Column label of a raw frame.
///
/// Multi-symbol responses label columns with two levels, `(field, symbol)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Flat(String),
    Nested { field: String, symbol: String },
}

impl ColumnKey {
    pub fn flat(field: &str) -> Self {
        ColumnKey::Flat(field.to_string())
    }

    pub fn nested(field: &str, symbol: &str) -> Self {
        ColumnKey::Nested {
            field: field.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            ColumnKey::Flat(field) => field,
            ColumnKey::Nested { field, .. } => field,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            ColumnKey::Flat(_) => None,
            ColumnKey::Nested { symbol, .. } => Some(symbol),
        }
    }
}

impl Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKey::Flat(field) => write!(f, "{field}"),
            ColumnKey::Nested { field, symbol } => write!(f, "({field}, {symbol})"),
        }
    }
}

/// A cell value: either a scalar or a scalar wrapped in a container.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Scalar(Option<f64>),
    Wrapped(Vec<f64>),
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Scalar(Some(value))
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        Cell::Scalar(value)
    }
}

/// Row index of a raw frame: timezone-aware instants or plain dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexValue {
    Instant(DateTime<FixedOffset>),
    Date(NaiveDate),
}

impl IndexValue {
    /// The calendar date in the index's own timezone, offset discarded.
    pub fn local_date(&self) -> NaiveDate {
        match self {
            IndexValue::Instant(dt) => dt.date_naive(),
            IndexValue::Date(date) => *date,
        }
    }
}

/// Column-oriented table keyed by a date-like index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFrame {
    pub index: Vec<IndexValue>,
    pub columns: Vec<(ColumnKey, Vec<Cell>)>,
    pub display_name: Option<String>,
}

impl RawFrame {
    pub fn new(index: Vec<IndexValue>) -> Self {
        Self {
            index,
            columns: Vec::new(),
            display_name: None,
        }
    }

    pub fn with_column(mut self, key: ColumnKey, cells: Vec<Cell>) -> Self {
        self.columns.push((key, cells));
        self
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Distinct symbols appearing in two-level column labels.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = Vec::new();
        for (key, _) in &self.columns {
            if let Some(symbol) = key.symbol() {
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        symbols
    }
}
