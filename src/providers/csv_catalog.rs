//! Published CSV series, optionally discovered through a CSV index.
//!
//! The index lists one series per row under the headers
//! `type,key,title,csv_url`. Headers are matched ignoring case, a leading
//! byte-order mark, whitespace and underscores. Every distinct `type`
//! becomes a dashboard section.

use crate::core::config::CatalogConfig;
use crate::core::frame::RawFrame;
use crate::core::provider::{HistoryProvider, Result};
use crate::core::range::DateRange;
use crate::core::ticker::{Section, SourceKind, Ticker};
use crate::providers::stats_csv::series_frame_from_csv;
use crate::providers::util::{get_text, normalize_header};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

const REQUIRED_HEADERS: [&str; 4] = ["type", "key", "title", "csv_url"];

/// Fetches a series from the CSV URL given as its locator.
#[derive(Default)]
pub struct CsvSeriesProvider;

impl CsvSeriesProvider {
    pub fn new() -> Self {
        CsvSeriesProvider
    }
}

#[async_trait]
impl HistoryProvider for CsvSeriesProvider {
    #[instrument(name = "CsvSeriesFetch", skip(self), fields(url = %url))]
    async fn fetch_history(&self, url: &str, range: &DateRange) -> Result<RawFrame> {
        let text = get_text(url, url).await?;
        series_frame_from_csv(&text, url, range)
    }
}

/// Downloads the catalog index and turns it into sections of CSV tickers.
pub async fn load_catalog(catalog: &CatalogConfig) -> anyhow::Result<Vec<Section>> {
    let text = get_text(&catalog.index_url, "catalog index")
        .await
        .with_context(|| format!("Failed to fetch catalog index: {}", catalog.index_url))?;
    let sections = parse_catalog(&text, &catalog.types, &catalog.keys)?;
    info!(
        sections = sections.len(),
        "Loaded catalog from {}", catalog.index_url
    );
    Ok(sections)
}

/// Parses index rows, skipping rows without a type, key or URL. A non-empty
/// `types` keeps only those types, and a non-empty `keys` keeps only those
/// keys plus their `<key>_RSI` companions.
pub fn parse_catalog(
    text: &str,
    types: &[String],
    keys: &[String],
) -> anyhow::Result<Vec<Section>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read catalog headers")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut positions = [0usize; 4];
    for (slot, name) in positions.iter_mut().zip(REQUIRED_HEADERS) {
        *slot = headers
            .iter()
            .position(|h| normalize_header(h) == normalize_header(name))
            .ok_or_else(|| {
                anyhow!(
                    "Catalog index must have headers: {} (received: {:?})",
                    REQUIRED_HEADERS.join(","),
                    headers
                )
            })?;
    }
    let [type_col, key_col, title_col, url_col] = positions;

    let mut sections: Vec<Section> = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read catalog row")?;
        let field = |col: usize| record.get(col).unwrap_or("").trim().to_string();
        let (kind, key, title, url) = (
            field(type_col),
            field(key_col),
            field(title_col),
            field(url_col),
        );

        if kind.is_empty() || key.is_empty() || url.is_empty() {
            debug!(?record, "Skipping incomplete catalog row");
            continue;
        }
        if !types.is_empty() && !types.iter().any(|t| t.eq_ignore_ascii_case(&kind)) {
            continue;
        }
        if !keys.is_empty() && !keys.iter().any(|k| key_matches(k.trim(), &key)) {
            continue;
        }

        let ticker = Ticker {
            name: if title.is_empty() { key.clone() } else { title },
            symbol: key,
            source: SourceKind::Csv,
            url: Some(url),
        };
        match sections.iter_mut().find(|s| s.name == kind) {
            Some(section) => section.tickers.push(ticker),
            None => sections.push(Section {
                name: kind,
                tickers: vec![ticker],
            }),
        }
    }

    Ok(sections)
}

fn key_matches(wanted: &str, key: &str) -> bool {
    key == wanted
        || key
            .strip_prefix(wanted)
            .is_some_and(|rest| rest.eq_ignore_ascii_case("_rsi"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX: &str = "\u{feff}Type, KEY ,Title,CSV_URL\n\
                         metric,lei,Leading Index,https://example.com/lei.csv\n\
                         equity,005930,Samsung,https://example.com/005930.csv\n\
                         metric,exports,,https://example.com/exports.csv\n\
                         equity,,Missing key,https://example.com/none.csv\n";

    #[test]
    fn test_parse_catalog_groups_by_type() {
        let sections = parse_catalog(INDEX, &[], &[]).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name, "metric");
        assert_eq!(sections[0].tickers.len(), 2);
        assert_eq!(sections[0].tickers[1].name, "exports");
        assert_eq!(sections[1].name, "equity");
        assert_eq!(sections[1].tickers.len(), 1);

        let samsung = &sections[1].tickers[0];
        assert_eq!(samsung.source, SourceKind::Csv);
        assert_eq!(samsung.locator(), "https://example.com/005930.csv");
    }

    #[test]
    fn test_parse_catalog_filters_types() {
        let sections = parse_catalog(INDEX, &["EQUITY".to_string()], &[]).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].tickers[0].symbol, "005930");
    }

    #[test]
    fn test_parse_catalog_filters_keys_and_keeps_rsi_companions() {
        let index = format!(
            "{INDEX}equity,005930_RSI,Samsung RSI,https://example.com/005930_rsi.csv\n\
             equity,0059300,Other,https://example.com/other.csv\n"
        );
        let sections =
            parse_catalog(&index, &[], &[" 005930 ".to_string(), "lei".to_string()]).unwrap();
        let symbols: Vec<&str> = sections
            .iter()
            .flat_map(|s| s.tickers.iter().map(|t| t.symbol.as_str()))
            .collect();
        assert_eq!(symbols, vec!["lei", "005930", "005930_RSI"]);

        let none = parse_catalog(INDEX, &["metric".to_string()], &["005930".to_string()]).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_parse_catalog_requires_headers() {
        let err = parse_catalog("type,key,title\nmetric,a,b\n", &[], &[]).unwrap_err();
        assert!(err.to_string().contains("type,key,title,csv_url"));
    }

    #[tokio::test]
    async fn test_csv_series_provider_reads_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lei.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("date,value\n2024-01-31,99.5\n2024-02-29,100.1\n"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/lei.csv", mock_server.uri());
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap();
        let frame = CsvSeriesProvider::new()
            .fetch_history(&url, &range)
            .await
            .unwrap();
        assert_eq!(frame.len(), 2);
    }

    #[tokio::test]
    async fn test_load_catalog_from_server() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(INDEX))
            .mount(&mock_server)
            .await;

        let config = CatalogConfig {
            index_url: format!("{}/index.csv", mock_server.uri()),
            types: vec!["metric".to_string()],
            keys: vec!["exports".to_string()],
        };
        let sections = load_catalog(&config).await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].tickers.len(), 1);
        assert_eq!(sections[0].tickers[0].symbol, "exports");
    }
}
