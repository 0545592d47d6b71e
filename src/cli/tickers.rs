use super::ui;
use crate::core::ticker::TickerTable;
use comfy_table::Cell;

/// Prints the ticker reference table.
pub fn run(table: &TickerTable) {
    if table.is_empty() {
        println!("No tickers configured.");
        return;
    }

    let mut out = ui::new_styled_table();
    out.set_header(vec![
        ui::header_cell("Section"),
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
        ui::header_cell("Source"),
    ]);
    for section in table.sections() {
        for ticker in &section.tickers {
            out.add_row(vec![
                Cell::new(&section.name),
                Cell::new(&ticker.name),
                Cell::new(ticker.locator()),
                Cell::new(ticker.source.to_string()),
            ]);
        }
    }
    println!("{out}");
}
