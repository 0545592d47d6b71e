use crate::core::frame::{Cell, ColumnKey, IndexValue, RawFrame};
use crate::core::provider::{FetchError, HistoryProvider, Result};
use crate::core::range::DateRange;
use crate::providers::util::{
    endpoint_url, find_column, get_text, normalize_header, parse_date, parse_number,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

const VALUE_KEYWORDS: [&str; 5] = ["close", "adj close", "price", "value", "종가"];

/// Macro series published as CSV by a statistics service, one value column
/// per series identifier.
pub struct StatsCsvProvider {
    base_url: String,
}

impl StatsCsvProvider {
    pub fn new(base_url: &str) -> Self {
        StatsCsvProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl HistoryProvider for StatsCsvProvider {
    #[instrument(
        name = "StatsSeriesFetch",
        skip(self),
        fields(series = %series_id, range = %range)
    )]
    async fn fetch_history(&self, series_id: &str, range: &DateRange) -> Result<RawFrame> {
        let url = endpoint_url(
            &self.base_url,
            &["graph", "fredgraph.csv"],
            &[("id", series_id)],
            series_id,
        )?;
        let text = get_text(url.as_str(), series_id).await?;
        series_frame_from_csv(&text, series_id, range)
    }
}

/// Extra columns carried alongside the close, keyed by their normalized
/// header.
const EXTRA_COLUMNS: [(&str, &[&str]); 5] = [
    ("Open", &["open", "시가"]),
    ("High", &["high", "고가"]),
    ("Low", &["low", "저가"]),
    ("Volume", &["volume", "vol", "거래량"]),
    ("RSI", &["rsi", "rsi14"]),
];

/// Reads a date/value CSV into a flat frame, keeping only rows inside
/// `range`.
///
/// The date column is the first header mentioning `date` or `time`, falling
/// back to the first column. The close column is the one named after
/// `symbol`, else the first price-like header, else the first other column.
/// Open, high, low, volume and RSI columns are carried when present.
pub(crate) fn series_frame_from_csv(
    text: &str,
    symbol: &str,
    range: &DateRange,
) -> Result<RawFrame> {
    let decode_error = |e: csv::Error| FetchError::Decode {
        symbol: symbol.to_string(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(decode_error)?
        .iter()
        .map(|h| h.replace('\u{feff}', "").trim().to_string())
        .collect();
    if headers.len() < 2 {
        return Err(FetchError::Decode {
            symbol: symbol.to_string(),
            reason: format!("expected a date and a value column, got {headers:?}"),
        });
    }

    let date_col = find_column(&headers, &["date", "time"]).unwrap_or(0);
    let close_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(symbol))
        .or_else(|| find_column(&headers, &VALUE_KEYWORDS).filter(|i| *i != date_col))
        .unwrap_or(if date_col == 0 { 1 } else { 0 });
    let extras: Vec<(&str, usize)> = EXTRA_COLUMNS
        .iter()
        .filter_map(|(name, aliases)| {
            headers
                .iter()
                .position(|h| aliases.contains(&normalize_header(h).as_str()))
                .filter(|i| *i != date_col && *i != close_col)
                .map(|i| (*name, i))
        })
        .collect();
    debug!(
        date = %headers[date_col],
        close = %headers[close_col],
        extras = ?extras,
        "Selected CSV columns"
    );

    let mut index = Vec::new();
    let mut closes = Vec::new();
    let mut extra_cells: Vec<Vec<Cell>> = vec![Vec::new(); extras.len()];
    for record in reader.records() {
        let record = record.map_err(decode_error)?;
        let Some(date) = record.get(date_col).and_then(parse_date) else {
            continue;
        };
        if !range.contains(date) {
            continue;
        }
        index.push(IndexValue::Date(date));
        closes.push(Cell::from(record.get(close_col).and_then(parse_number)));
        for ((_, col), cells) in extras.iter().zip(extra_cells.iter_mut()) {
            cells.push(Cell::from(record.get(*col).and_then(parse_number)));
        }
    }

    if index.is_empty() {
        return Err(FetchError::NoData(symbol.to_string()));
    }
    let frame = RawFrame::new(index).with_column(ColumnKey::flat("Close"), closes);
    Ok(extras
        .into_iter()
        .zip(extra_cells)
        .fold(frame, |frame, ((name, _), cells)| {
            frame.with_column(ColumnKey::flat(name), cells)
        }))
}
