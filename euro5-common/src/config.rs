//! Configuration loading and resolution
//!
//! Every setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not fatal: a warning is logged and the compiled
//! defaults apply. A config file that exists but does not parse is an error.

use crate::i18n::Locale;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_STORIES_PER_PAGE: usize = 12;

pub const ENV_BASE_URL: &str = "EURO5_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "EURO5_TIMEOUT_MS";
pub const ENV_LOCALE: &str = "EURO5_LOCALE";
pub const ENV_CONFIG: &str = "EURO5_CONFIG";

/// Feed locations relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedPaths {
    pub weekly: String,
    pub top_picks: String,
    pub regional: String,
    pub changelog: String,
}

impl Default for FeedPaths {
    fn default() -> Self {
        Self {
            weekly: "data/weekly.csv".to_string(),
            top_picks: "data/the_5.csv".to_string(),
            regional: "data/nordic_picks.csv".to_string(),
            changelog: "data/changelog.csv".to_string(),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub locale: Option<String>,
    pub stories_per_page: Option<usize>,
    pub regional_required: Option<bool>,
    /// Offset used to read the calendar date for the week label
    pub week_utc_offset_minutes: Option<i32>,
    pub feeds: FeedPaths,
    /// Extra category labels, merged over the built-in table
    pub category_masks: BTreeMap<String, String>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub locale: Option<String>,
}

/// Fully resolved digest configuration
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub base_url: String,
    pub feeds: FeedPaths,
    pub timeout_ms: u64,
    pub locale: Locale,
    pub stories_per_page: usize,
    pub regional_required: bool,
    pub week_utc_offset_minutes: Option<i32>,
    pub category_masks: BTreeMap<String, String>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            feeds: FeedPaths::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            locale: Locale::default(),
            stories_per_page: DEFAULT_STORIES_PER_PAGE,
            regional_required: false,
            week_utc_offset_minutes: None,
            category_masks: BTreeMap::new(),
        }
    }
}

impl DigestConfig {
    /// Join a feed path onto the base URL
    pub fn feed_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn weekly_url(&self) -> String {
        self.feed_url(&self.feeds.weekly)
    }

    pub fn top_picks_url(&self) -> String {
        self.feed_url(&self.feeds.top_picks)
    }

    pub fn regional_url(&self) -> String {
        self.feed_url(&self.feeds.regional)
    }

    pub fn changelog_url(&self) -> String {
        self.feed_url(&self.feeds.changelog)
    }

    pub fn timeout(&self) -> Duration {
        crate::time::millis_to_duration(self.timeout_ms)
    }
}

/// Resolves `DigestConfig` from CLI, environment, TOML and defaults
pub struct ConfigResolver {
    overrides: CliOverrides,
}

impl ConfigResolver {
    pub fn new(overrides: CliOverrides) -> Self {
        Self { overrides }
    }

    pub fn resolve(&self) -> Result<DigestConfig> {
        let toml_config = match self.config_file_path() {
            Some(path) if path.exists() => load_toml_config(&path)?,
            Some(path) => {
                warn!("Config file not found at {}, using defaults", path.display());
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                TomlConfig::default()
            }
        };

        let defaults = DigestConfig::default();

        let base_url = self
            .overrides
            .base_url
            .clone()
            .or_else(|| env_var(ENV_BASE_URL))
            .or(toml_config.base_url)
            .unwrap_or(defaults.base_url);

        let timeout_ms = match self.overrides.timeout_ms {
            Some(ms) => ms,
            None => match env_var(ENV_TIMEOUT_MS) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                    Error::Config(format!("{} must be milliseconds, got {:?}", ENV_TIMEOUT_MS, raw))
                })?,
                None => toml_config.timeout_ms.unwrap_or(defaults.timeout_ms),
            },
        };
        if timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be greater than zero".to_string()));
        }

        let locale = match self
            .overrides
            .locale
            .clone()
            .or_else(|| env_var(ENV_LOCALE))
            .or(toml_config.locale)
        {
            Some(raw) => raw
                .parse::<Locale>()
                .map_err(|e| Error::Config(e.to_string()))?,
            None => defaults.locale,
        };

        let stories_per_page = toml_config
            .stories_per_page
            .unwrap_or(defaults.stories_per_page)
            .max(1);

        let category_masks = toml_config
            .category_masks
            .into_iter()
            .map(|(raw, label)| (raw.trim().to_lowercase(), label))
            .collect();

        let config = DigestConfig {
            base_url,
            feeds: toml_config.feeds,
            timeout_ms,
            locale,
            stories_per_page,
            regional_required: toml_config.regional_required.unwrap_or(defaults.regional_required),
            week_utc_offset_minutes: toml_config.week_utc_offset_minutes,
            category_masks,
        };
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    /// Config file path: CLI argument, then `EURO5_CONFIG`, then the platform config dir
    fn config_file_path(&self) -> Option<PathBuf> {
        self.overrides
            .config_path
            .clone()
            .or_else(|| env_var(ENV_CONFIG).map(PathBuf::from))
            .or_else(default_config_path)
    }
}

/// `~/.config/euro5/config.toml` (or the platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("euro5").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
