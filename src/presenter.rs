//! Turns fetched frames into display panels: a metric snapshot plus a chart,
//! or the reason a ticker has nothing to show.

use crate::core::chart::{Chart, ChartKind};
use crate::core::config::ViewConfig;
use crate::core::frame::RawFrame;
use crate::core::metric::MetricSnapshot;
use crate::core::normalize::{NormalizeError, normalize, normalize_mode};
use crate::core::range::DateRange;
use crate::core::series::{QuoteSeries, SeriesMode};
use crate::core::ticker::{Section, Ticker, TickerTable};
use crate::fetcher::{Fetched, Fetcher};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub chart: ChartKind,
    pub weekly: bool,
    /// Maximum number of plotted bars.
    pub width: usize,
    pub mode: SeriesMode,
}

impl From<&ViewConfig> for ViewOptions {
    fn from(view: &ViewConfig) -> Self {
        Self {
            chart: view.chart,
            weekly: view.weekly,
            width: view.width,
            mode: view.mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    Metric {
        snapshot: MetricSnapshot,
        chart: Chart,
    },
    Unavailable {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub symbol: String,
    pub body: PanelBody,
}

impl Panel {
    pub fn is_available(&self) -> bool {
        matches!(self.body, PanelBody::Metric { .. })
    }
}

pub struct SectionPanels {
    pub name: String,
    pub panels: Vec<Panel>,
}

/// Builds the panel for one ticker from its fetch outcome.
///
/// When the frame has no column for the view's mode the close is shown
/// instead and the title is marked `Close*`.
pub fn compose(ticker: &Ticker, fetched: &Fetched, view: &ViewOptions) -> Panel {
    let title = panel_title(ticker, fetched);
    let frame = match fetched {
        Fetched::Data(frame) => frame,
        Fetched::Absent(reason) => return unavailable(title, ticker, reason.clone()),
    };

    let (series, suffix) = match normalize_mode(frame, &ticker.symbol, view.mode) {
        Ok(series) => (Ok(series), mode_suffix(view.mode)),
        Err(NormalizeError::MissingColumn { .. }) if view.mode != SeriesMode::Close => {
            debug!(symbol = %ticker.symbol, mode = %view.mode, "Falling back to close");
            (normalize(frame, &ticker.symbol), Some("Close*"))
        }
        Err(e) => (Err(e), mode_suffix(view.mode)),
    };
    build_panel(with_suffix(title, suffix), ticker, series, view)
}

/// Builds an RSI panel for `ticker` from its separately published RSI
/// series. The companion's `rsi` column is preferred, then its value.
pub fn compose_rsi_companion(
    ticker: &Ticker,
    fetched: &Fetched,
    companion: &RawFrame,
    view: &ViewOptions,
) -> Panel {
    let title = with_suffix(panel_title(ticker, fetched), Some("RSI"));
    let series = match normalize_mode(companion, &ticker.symbol, SeriesMode::Rsi) {
        Err(NormalizeError::MissingColumn { .. }) => normalize(companion, &ticker.symbol),
        other => other,
    };
    build_panel(title, ticker, series, view)
}

fn build_panel(
    title: String,
    ticker: &Ticker,
    series: Result<QuoteSeries, NormalizeError>,
    view: &ViewOptions,
) -> Panel {
    let series = match series {
        Ok(series) => series,
        Err(e) => {
            debug!(symbol = %ticker.symbol, error = %e, "Normalization failed");
            return unavailable(title, ticker, e.to_string());
        }
    };

    let Some(snapshot) = MetricSnapshot::from_closes(&series.closes()) else {
        return unavailable(title, ticker, format!("No data for {}", ticker.symbol));
    };
    let shown = if view.weekly {
        series.resample_weekly()
    } else {
        series
    };
    let Some(chart) = Chart::build(&shown, view.chart, view.width) else {
        return unavailable(title, ticker, format!("No data for {}", ticker.symbol));
    };

    Panel {
        title,
        symbol: ticker.symbol.clone(),
        body: PanelBody::Metric { snapshot, chart },
    }
}

fn unavailable(title: String, ticker: &Ticker, reason: String) -> Panel {
    Panel {
        title,
        symbol: ticker.symbol.clone(),
        body: PanelBody::Unavailable { reason },
    }
}

fn mode_suffix(mode: SeriesMode) -> Option<&'static str> {
    match mode {
        SeriesMode::Close => None,
        SeriesMode::Volume => Some("Volume"),
        SeriesMode::Rsi => Some("RSI"),
    }
}

fn with_suffix(title: String, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{title} · {suffix}"),
        None => title,
    }
}

fn panel_title(ticker: &Ticker, fetched: &Fetched) -> String {
    let provider_name = match fetched {
        Fetched::Data(frame) => frame.display_name.as_deref(),
        Fetched::Absent(_) => None,
    };
    let name = if ticker.name != ticker.symbol {
        Some(ticker.name.as_str())
    } else {
        provider_name
    };
    match name {
        Some(name) if !name.is_empty() => format!("{} ({})", name, ticker.symbol),
        _ => ticker.symbol.clone(),
    }
}

fn lacks_column(fetched: &Fetched, symbol: &str, mode: SeriesMode) -> bool {
    match fetched {
        Fetched::Data(frame) => matches!(
            normalize_mode(frame, symbol, mode),
            Err(NormalizeError::MissingColumn { .. })
        ),
        Fetched::Absent(_) => true,
    }
}

/// Fetches and composes one panel. In RSI mode a ticker without its own RSI
/// column uses its `<symbol>_RSI` companion from `table` when one exists.
pub async fn present(
    fetcher: &Fetcher,
    table: &TickerTable,
    ticker: &Ticker,
    range: &DateRange,
    view: &ViewOptions,
) -> Panel {
    let fetched = fetcher.fetch(ticker, range).await;
    if view.mode == SeriesMode::Rsi && lacks_column(&fetched, &ticker.symbol, SeriesMode::Rsi) {
        if let Some(companion) = table.rsi_companion(ticker) {
            debug!(symbol = %ticker.symbol, companion = %companion.symbol, "Using RSI companion");
            if let Fetched::Data(frame) = fetcher.fetch(companion, range).await {
                return compose_rsi_companion(ticker, &fetched, &frame, view);
            }
        }
    }
    compose(ticker, &fetched, view)
}

/// Presents every section in display order, one ticker at a time.
/// `on_ticker` is called before each fetch.
pub async fn present_sections(
    fetcher: &Fetcher,
    table: &TickerTable,
    sections: &[Section],
    range: &DateRange,
    view: &ViewOptions,
    on_ticker: &(dyn Fn(&Ticker)),
) -> Vec<SectionPanels> {
    let mut out = Vec::with_capacity(sections.len());
    for section in sections {
        let mut panels = Vec::with_capacity(section.tickers.len());
        for ticker in &section.tickers {
            on_ticker(ticker);
            panels.push(present(fetcher, table, ticker, range, view).await);
        }
        out.push(SectionPanels {
            name: section.name.clone(),
            panels,
        });
    }
    out
}
