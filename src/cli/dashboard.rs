use super::{chart, ui};
use crate::core::range::DateRange;
use crate::core::ticker::{Section, TickerTable, parse_symbols};
use crate::fetcher::Fetcher;
use crate::presenter::{self, Panel, PanelBody, SectionPanels, ViewOptions};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::info;

pub const WATCHLIST_SECTION: &str = "Watchlist";

/// Picks the date window: explicit dates first, then a lookback-day count,
/// then the configured default lookback.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    days: Option<u32>,
    default_lookback_days: u32,
    today: NaiveDate,
) -> Result<DateRange> {
    match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        (Some(start), None) => DateRange::new(start, today),
        (None, Some(end)) => DateRange::lookback(days.unwrap_or(default_lookback_days), end),
        (None, None) => DateRange::lookback(days.unwrap_or(default_lookback_days), today),
    }
}

/// Sections to render: the free-text symbols when given, otherwise every
/// configured section.
pub fn select_sections(table: &TickerTable, symbols: Option<&str>) -> Vec<Section> {
    match symbols.map(parse_symbols) {
        Some(entries) if !entries.is_empty() => vec![Section {
            name: WATCHLIST_SECTION.to_string(),
            tickers: entries.iter().map(|s| table.resolve(s)).collect(),
        }],
        _ => table.sections().to_vec(),
    }
}

/// Fetches every ticker in order, printing each section as it completes.
pub async fn run(
    fetcher: &Fetcher,
    table: &TickerTable,
    sections: &[Section],
    range: &DateRange,
    view: &ViewOptions,
    height: usize,
) -> Result<Vec<SectionPanels>> {
    if sections.iter().all(|s| s.tickers.is_empty()) {
        println!("No tickers configured. Add sections to the config file or pass --symbols.");
        return Ok(Vec::new());
    }
    info!(%range, "Rendering dashboard");
    println!(
        "{}",
        ui::style_text(&format!("Period: {range}"), ui::StyleType::Subtle)
    );

    let pb = ui::new_spinner();
    let on_ticker = |ticker: &crate::core::ticker::Ticker| {
        pb.set_message(format!("Fetching {}", ticker.symbol));
    };
    let results = presenter::present_sections(fetcher, table, sections, range, view, &on_ticker).await;
    pb.finish_and_clear();

    let num_sections = results.len();
    for (i, section) in results.iter().enumerate() {
        println!(
            "\n{}",
            ui::style_text(&section.name, ui::StyleType::Title)
        );
        for panel in &section.panels {
            display_panel(panel, height);
        }
        if i < num_sections - 1 {
            ui::print_separator();
        }
    }

    Ok(results)
}

fn display_panel(panel: &Panel, height: usize) {
    println!("\n{}", ui::style_text(&panel.title, ui::StyleType::Heading));
    match &panel.body {
        PanelBody::Metric { snapshot, chart } => {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Latest"),
                ui::header_cell("Change"),
                ui::header_cell("As of"),
            ]);
            table.add_row(vec![
                ui::value_cell(&snapshot.value_text()),
                ui::change_cell(snapshot.delta, &snapshot.change_text()),
                Cell::new(snapshot.as_of.format("%Y-%m-%d").to_string()),
            ]);
            println!("{table}");
            print!("{}", chart::render_chart(chart, height));
        }
        PanelBody::Unavailable { reason } => {
            println!(
                "{}",
                ui::style_text(&format!("⚠ No data: {reason}"), ui::StyleType::Warning)
            );
        }
    }
}
