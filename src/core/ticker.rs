//! Static ticker reference: display names mapped to provider symbols.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Which provider serves a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Yahoo,
    Stats,
    Csv,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SourceKind::Yahoo => "yahoo",
                SourceKind::Stats => "stats",
                SourceKind::Csv => "csv",
            }
        )
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Ticker {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub source: SourceKind,
    /// Location of the published CSV for `csv` tickers.
    #[serde(default)]
    pub url: Option<String>,
}

impl Ticker {
    pub fn yahoo(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            source: SourceKind::Yahoo,
            url: None,
        }
    }

    /// The identifier handed to the provider: the URL for CSV tickers,
    /// otherwise the symbol.
    pub fn locator(&self) -> &str {
        match (self.source, &self.url) {
            (SourceKind::Csv, Some(url)) => url,
            _ => &self.symbol,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub tickers: Vec<Ticker>,
}

/// Immutable ticker table, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct TickerTable {
    sections: Vec<Section>,
}

impl TickerTable {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.sections.iter().flat_map(|s| s.tickers.iter())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves user input by display name or symbol (case-insensitive).
    /// Unknown input is taken as a Yahoo symbol named after itself.
    pub fn resolve(&self, input: &str) -> Ticker {
        self.iter()
            .find(|t| t.name.eq_ignore_ascii_case(input) || t.symbol.eq_ignore_ascii_case(input))
            .cloned()
            .unwrap_or_else(|| Ticker::yahoo(input, input))
    }

    /// The separately published RSI series of `ticker`, listed under the
    /// symbol `<symbol>_RSI`.
    pub fn rsi_companion(&self, ticker: &Ticker) -> Option<&Ticker> {
        let companion = format!("{}_rsi", ticker.symbol);
        self.iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(&companion))
    }
}

/// Splits comma-separated free text into trimmed, non-empty entries.
pub fn parse_symbols(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
