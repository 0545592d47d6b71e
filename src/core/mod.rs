//! Core data model and the provider-independent pipeline stages

pub mod cache;
pub mod chart;
pub mod config;
pub mod frame;
pub mod log;
pub mod metric;
pub mod normalize;
pub mod provider;
pub mod range;
pub mod series;
pub mod ticker;

// Re-export main types for cleaner imports
pub use chart::{Chart, ChartKind};
pub use frame::{Cell, ColumnKey, IndexValue, RawFrame};
pub use metric::MetricSnapshot;
pub use normalize::{NormalizeError, normalize, normalize_mode};
pub use provider::{FetchError, HistoryProvider};
pub use range::DateRange;
pub use series::{Bar, ClosingSeries, QuoteSeries, SeriesMode};
pub use ticker::{Section, SourceKind, Ticker, TickerTable};
