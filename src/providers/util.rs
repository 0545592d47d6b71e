use crate::core::provider::{FetchError, Result};
use chrono::NaiveDate;
use reqwest::Url;
use tracing::debug;

const USER_AGENT: &str = "quotedash/0.1";

/// Issues a GET and returns the body of a successful response.
pub async fn get_text(url: &str, symbol: &str) -> Result<String> {
    let request_error = |source| FetchError::Request {
        symbol: symbol.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(request_error)?;
    debug!("Requesting {}", url);

    let response = client.get(url).send().await.map_err(request_error)?;
    if !response.status().is_success() {
        return Err(FetchError::Status {
            symbol: symbol.to_string(),
            status: response.status(),
        });
    }

    response.text().await.map_err(request_error)
}

/// Appends `segments` to the path of `base` and adds `query`. Segments are
/// percent-encoded, so a `/` inside a symbol stays within its segment.
pub fn endpoint_url(
    base: &str,
    segments: &[&str],
    query: &[(&str, &str)],
    symbol: &str,
) -> Result<Url> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        symbol: symbol.to_string(),
        reason,
    };
    let mut url = Url::parse(base).map_err(|e| invalid(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| invalid(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Lowercases and strips a byte-order mark, whitespace and underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .replace('\u{feff}', "")
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

/// Index of the first header containing any of `keywords` (case-insensitive).
pub fn find_column(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let lower = h.to_lowercase();
        keywords.iter().any(|k| lower.contains(k))
    })
}

/// Parses a number that may carry `,` thousands separators. Blank cells and
/// `.` placeholders are missing values.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the leading date of a cell such as `2024-01-31` or
/// `2024-01-31 00:00:00`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(head, fmt).ok())
}
