use crate::core::frame::{Cell, ColumnKey, IndexValue, RawFrame};
use crate::core::provider::{FetchError, HistoryProvider, Result};
use crate::core::range::DateRange;
use crate::providers::util::{endpoint_url, get_text};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Daily OHLCV history from the Yahoo Finance chart endpoint.
pub struct YahooFinanceProvider {
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Self {
        YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    symbol: Option<String>,
    #[serde(default)]
    gmtoffset: i32,
    #[serde(alias = "longName")]
    long_name: Option<String>,
    #[serde(alias = "shortName")]
    short_name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn to_frame(item: ChartItem, requested: &str) -> RawFrame {
    let symbol = item.meta.symbol.unwrap_or_else(|| requested.to_string());
    let offset = FixedOffset::east_opt(item.meta.gmtoffset).unwrap_or_else(|| Utc.fix());

    let index: Vec<IndexValue> = item
        .timestamp
        .unwrap_or_default()
        .into_iter()
        .filter_map(|ts| DateTime::from_timestamp(ts, 0))
        .map(|utc| IndexValue::Instant(utc.with_timezone(&offset)))
        .collect();

    let quote = item
        .indicators
        .and_then(|inds| inds.quote.into_iter().next())
        .unwrap_or_default();
    let cells = |values: Vec<Option<f64>>| -> Vec<Cell> {
        values.into_iter().map(Cell::from).collect()
    };

    RawFrame::new(index)
        .with_column(ColumnKey::nested("Open", &symbol), cells(quote.open))
        .with_column(ColumnKey::nested("High", &symbol), cells(quote.high))
        .with_column(ColumnKey::nested("Low", &symbol), cells(quote.low))
        .with_column(ColumnKey::nested("Close", &symbol), cells(quote.close))
        .with_column(ColumnKey::nested("Volume", &symbol), cells(quote.volume))
        .with_display_name(item.meta.long_name.or(item.meta.short_name))
}

#[async_trait]
impl HistoryProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(symbol = %symbol, range = %range)
    )]
    async fn fetch_history(&self, symbol: &str, range: &DateRange) -> Result<RawFrame> {
        let (period1, period2) = range.to_unix_bounds();
        let (period1, period2) = (period1.to_string(), period2.to_string());
        let url = endpoint_url(
            &self.base_url,
            &["v8", "finance", "chart", symbol],
            &[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ],
            symbol,
        )?;

        let text = get_text(url.as_str(), symbol).await?;
        let data: YahooChartResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::Decode {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| FetchError::NoData(symbol.to_string()))?;

        let frame = to_frame(item, symbol);
        debug!(rows = frame.len(), "Received Yahoo history");
        if frame.is_empty() {
            return Err(FetchError::NoData(symbol.to_string()));
        }
        Ok(frame)
    }
}
