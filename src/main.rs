use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use quotedash::core::chart::ChartKind;
use quotedash::core::log::init_logging;
use quotedash::core::series::SeriesMode;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the market dashboard
    Dashboard {
        /// Comma-separated names or symbols to show instead of the configured sections
        #[arg(short, long)]
        symbols: Option<String>,
        /// First date of the window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date of the window (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Look back this many days instead of the configured default
        #[arg(short, long)]
        days: Option<u32>,
        /// Chart style: line or candlestick
        #[arg(long)]
        chart: Option<ChartKind>,
        /// Aggregate daily bars into weekly bars
        #[arg(short, long)]
        weekly: bool,
        /// Series to show: close, volume or rsi
        #[arg(short, long)]
        mode: Option<SeriesMode>,
    },
    /// List the configured tickers
    Tickers,
}

impl From<Commands> for quotedash::AppCommand {
    fn from(cmd: Commands) -> quotedash::AppCommand {
        match cmd {
            Commands::Dashboard {
                symbols,
                start,
                end,
                days,
                chart,
                weekly,
                mode,
            } => quotedash::AppCommand::Dashboard(quotedash::DashboardArgs {
                symbols,
                start,
                end,
                days,
                chart,
                weekly,
                mode,
            }),
            Commands::Tickers => quotedash::AppCommand::Tickers,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => quotedash::cli::setup::setup_at_path(path),
            None => quotedash::cli::setup::setup(),
        },
        Some(cmd) => quotedash::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
