pub mod csv_catalog;
pub mod stats_csv;
pub mod util;
pub mod yahoo_finance;

pub use csv_catalog::CsvSeriesProvider;
pub use stats_csv::StatsCsvProvider;
pub use yahoo_finance::YahooFinanceProvider;
