use crate::core::chart::ChartKind;
use crate::core::series::SeriesMode;
use crate::core::ticker::{Section, TickerTable};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_STATS_URL: &str = "https://fred.stlouisfed.org";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatsProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
    pub stats: Option<StatsProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_URL.to_string(),
            }),
            stats: Some(StatsProviderConfig {
                base_url: DEFAULT_STATS_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn yahoo_url(&self) -> &str {
        self.yahoo
            .as_ref()
            .map_or(DEFAULT_YAHOO_URL, |p| &p.base_url)
    }

    pub fn stats_url(&self) -> &str {
        self.stats
            .as_ref()
            .map_or(DEFAULT_STATS_URL, |p| &p.base_url)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RangeConfig {
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

fn default_lookback_days() -> u32 {
    365
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ViewConfig {
    #[serde(default)]
    pub chart: ChartKind,
    #[serde(default)]
    pub weekly: bool,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default)]
    pub mode: SeriesMode,
}

fn default_width() -> usize {
    72
}

fn default_height() -> usize {
    12
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            chart: ChartKind::default(),
            weekly: false,
            width: default_width(),
            height: default_height(),
            mode: SeriesMode::default(),
        }
    }
}

/// A published CSV index listing `type,key,title,csv_url` rows.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    pub index_url: String,
    #[serde(default)]
    pub types: Vec<String>,
    /// Keys to keep; empty keeps every key.
    #[serde(default)]
    pub keys: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub range: RangeConfig,
    #[serde(default)]
    pub view: ViewConfig,
    pub catalog: Option<CatalogConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "quotedash", "quotedash")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn ticker_table(&self) -> TickerTable {
        TickerTable::new(self.sections.clone())
    }
}
