//! Routes tickers to their provider and memoizes every outcome.

use crate::core::cache::Cache;
use crate::core::frame::RawFrame;
use crate::core::provider::HistoryProvider;
use crate::core::range::DateRange;
use crate::core::ticker::{SourceKind, Ticker};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a fetch: the raw frame, or the reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Data(Arc<RawFrame>),
    Absent(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub source: SourceKind,
    pub locator: String,
    pub range: DateRange,
}

pub struct Fetcher {
    yahoo: Box<dyn HistoryProvider>,
    stats: Box<dyn HistoryProvider>,
    csv: Box<dyn HistoryProvider>,
    cache: Cache<FetchKey, Fetched>,
}

impl Fetcher {
    pub fn new(
        yahoo: Box<dyn HistoryProvider>,
        stats: Box<dyn HistoryProvider>,
        csv: Box<dyn HistoryProvider>,
    ) -> Self {
        Self {
            yahoo,
            stats,
            csv,
            cache: Cache::new(),
        }
    }

    fn provider(&self, source: SourceKind) -> &dyn HistoryProvider {
        match source {
            SourceKind::Yahoo => self.yahoo.as_ref(),
            SourceKind::Stats => self.stats.as_ref(),
            SourceKind::Csv => self.csv.as_ref(),
        }
    }

    /// Fetches `ticker` over `range`. Provider errors are logged and turned
    /// into [`Fetched::Absent`]; both outcomes are cached for the lifetime of
    /// the fetcher.
    pub async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Fetched {
        let key = FetchKey {
            source: ticker.source,
            locator: ticker.locator().to_string(),
            range: *range,
        };
        let locator = key.locator.clone();
        self.cache
            .get_or_insert_with(key, || async move {
                debug!(%locator, source = %ticker.source, "Fetching history");
                match self
                    .provider(ticker.source)
                    .fetch_history(&locator, range)
                    .await
                {
                    Ok(frame) => Fetched::Data(Arc::new(frame)),
                    Err(e) => {
                        warn!(symbol = %ticker.symbol, error = %e, "Fetch failed");
                        Fetched::Absent(e.to_string())
                    }
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::{Cell, ColumnKey, IndexValue};
    use crate::core::provider::{FetchError, Result};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct MockProvider {
        call_count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl HistoryProvider for MockProvider {
        async fn fetch_history(&self, symbol: &str, range: &DateRange) -> Result<RawFrame> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if symbol == "AAPL" {
                Ok(RawFrame::new(vec![IndexValue::Date(range.end)])
                    .with_column(ColumnKey::flat("Close"), vec![Cell::from(150.0)]))
            } else {
                Err(FetchError::NoData(symbol.to_string()))
            }
        }
    }

    fn range(days: u32) -> DateRange {
        DateRange::lookback(days, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap()
    }

    fn fetcher(yahoo: &MockProvider, stats: &MockProvider) -> Fetcher {
        Fetcher::new(
            Box::new(yahoo.clone()),
            Box::new(stats.clone()),
            Box::new(MockProvider::default()),
        )
    }

    #[tokio::test]
    async fn test_repeated_fetch_uses_cache() {
        let yahoo = MockProvider::default();
        let stats = MockProvider::default();
        let fetcher = fetcher(&yahoo, &stats);
        let ticker = Ticker::yahoo("Apple", "AAPL");

        let first = fetcher.fetch(&ticker, &range(30)).await;
        assert!(matches!(first, Fetched::Data(_)));
        assert_eq!(yahoo.call_count.load(Ordering::SeqCst), 1);

        let second = fetcher.fetch(&ticker, &range(30)).await;
        assert_eq!(first, second);
        assert_eq!(yahoo.call_count.load(Ordering::SeqCst), 1);

        // A different range is a different key
        fetcher.fetch(&ticker, &range(60)).await;
        assert_eq!(yahoo.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_become_absent_and_are_cached() {
        let yahoo = MockProvider::default();
        let stats = MockProvider::default();
        let fetcher = fetcher(&yahoo, &stats);
        let ticker = Ticker::yahoo("INVALID123", "INVALID123");

        let outcome = fetcher.fetch(&ticker, &range(30)).await;
        assert_eq!(
            outcome,
            Fetched::Absent("No data found for INVALID123".to_string())
        );
        fetcher.fetch(&ticker, &range(30)).await;
        assert_eq!(yahoo.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_routes_by_source() {
        let yahoo = MockProvider::default();
        let stats = MockProvider::default();
        let fetcher = fetcher(&yahoo, &stats);
        let ticker = Ticker {
            name: "Leading Index".to_string(),
            symbol: "USSLIND".to_string(),
            source: SourceKind::Stats,
            url: None,
        };

        fetcher.fetch(&ticker, &range(30)).await;
        assert_eq!(stats.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(yahoo.call_count.load(Ordering::SeqCst), 0);
    }
}
