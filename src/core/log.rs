use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const APP_TARGET: &str = "quotedash";

/// Target filter for the dashboard's own spans and events. Dependencies such
/// as reqwest and hyper stay silent unless `RUST_LOG` asks for them.
fn app_targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    Targets::new().with_target(APP_TARGET, level)
}

/// Installs the global subscriber, writing to stderr so panels on stdout
/// stay clean. `verbose` turns on debug output for this crate; `RUST_LOG`
/// overrides the default level.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "off" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_targets(verbose))
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_verbose_enables_only_app_debug() {
        let targets = app_targets(true);
        assert!(targets.would_enable("quotedash::fetcher", &Level::DEBUG));
        assert!(!targets.would_enable("quotedash::fetcher", &Level::TRACE));
        assert!(!targets.would_enable("reqwest::connect", &Level::DEBUG));
    }

    #[test]
    fn test_quiet_by_default() {
        let targets = app_targets(false);
        assert!(!targets.would_enable("quotedash::providers::yahoo_finance", &Level::WARN));
    }
}
