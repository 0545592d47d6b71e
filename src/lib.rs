pub mod cli;
pub mod core;
pub mod fetcher;
pub mod presenter;
pub mod providers;

use crate::core::chart::ChartKind;
use crate::core::config::AppConfig;
use crate::core::series::SeriesMode;
use crate::core::ticker::TickerTable;
use crate::fetcher::Fetcher;
use crate::presenter::{SectionPanels, ViewOptions};
use crate::providers::{CsvSeriesProvider, StatsCsvProvider, YahooFinanceProvider};
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct DashboardArgs {
    /// Comma-separated names or symbols; overrides the configured sections.
    pub symbols: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub days: Option<u32>,
    pub chart: Option<ChartKind>,
    pub weekly: bool,
    pub mode: Option<SeriesMode>,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Dashboard(DashboardArgs),
    Tickers,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Quote dashboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Dashboard(args) => run_dashboard(&config, &args).await.map(|_| ()),
        AppCommand::Tickers => {
            let table = build_ticker_table(&config).await;
            cli::tickers::run(&table);
            Ok(())
        }
    }
}

/// Renders the dashboard and hands back the composed panels.
pub async fn run_dashboard(config: &AppConfig, args: &DashboardArgs) -> Result<Vec<SectionPanels>> {
    let today = chrono::Local::now().date_naive();
    let range = cli::dashboard::resolve_range(
        args.start,
        args.end,
        args.days,
        config.range.lookback_days,
        today,
    )?;

    let mut view = ViewOptions::from(&config.view);
    if let Some(kind) = args.chart {
        view.chart = kind;
    }
    view.weekly |= args.weekly;
    if let Some(mode) = args.mode {
        view.mode = mode;
    }

    let table = build_ticker_table(config).await;
    let sections = cli::dashboard::select_sections(&table, args.symbols.as_deref());
    let fetcher = build_fetcher(config);

    cli::dashboard::run(&fetcher, &table, &sections, &range, &view, config.view.height).await
}

pub fn build_fetcher(config: &AppConfig) -> Fetcher {
    Fetcher::new(
        Box::new(YahooFinanceProvider::new(config.providers.yahoo_url())),
        Box::new(StatsCsvProvider::new(config.providers.stats_url())),
        Box::new(CsvSeriesProvider::new()),
    )
}

/// Configured sections followed by the catalog sections, if a catalog is
/// configured. A catalog that cannot be loaded is skipped with a warning.
pub async fn build_ticker_table(config: &AppConfig) -> TickerTable {
    let Some(catalog) = &config.catalog else {
        return config.ticker_table();
    };
    let mut sections = config.sections.clone();
    match providers::csv_catalog::load_catalog(catalog).await {
        Ok(found) => {
            info!("Loaded {} catalog sections", found.len());
            sections.extend(found);
        }
        Err(e) => {
            warn!(error = %e, "Failed to load catalog");
            println!(
                "{}",
                cli::ui::style_text(
                    &format!("Catalog unavailable: {e}"),
                    cli::ui::StyleType::Warning
                )
            );
        }
    }
    TickerTable::new(sections)
}
