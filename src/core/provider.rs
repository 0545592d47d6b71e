//! History provider abstraction and its error taxonomy

use crate::core::frame::RawFrame;
use crate::core::range::DateRange;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request error for {symbol}: {source}")]
    Request {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for {symbol}")]
    Status {
        symbol: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid request URL for {symbol}: {reason}")]
    InvalidUrl { symbol: String, reason: String },

    #[error("Failed to decode response for {symbol}: {reason}")]
    Decode { symbol: String, reason: String },

    #[error("No data found for {0}")]
    NoData(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// A source of raw history frames for a symbol over a date range.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_history(&self, symbol: &str, range: &DateRange) -> Result<RawFrame>;
}
