//! Configuration infrastructure
//!
//! `AppConfig` is assembled by [`ConfigManager`] from, in increasing order of
//! precedence: built-in defaults, an optional config file (TOML or JSON), and
//! `HARVESTER__`-prefixed environment variables such as
//! `HARVESTER__HARVEST__STORE=acme` or `HARVESTER__LOGGING__LEVEL=debug`.
//! The binary applies command-line overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::error::ConfigError;
use super::http_client::HttpClientConfig;
use super::webdriver::BrowserConfig;
use crate::domain::pagination::{PagePlan, PaginationMode};

pub mod defaults {
    pub const TARGET_DIRECTORY: &str = "temp";
    pub const SCROLL_STEP: u32 = 500;
    pub const STORE: &str = "store";
    pub const PAGE_COUNT: u32 = 1;
    pub const SCROLL_SETTLE_MS: u64 = 1000;
    pub const PAGE_SETTLE_MS: u64 = 5000;
    pub const POLL_INTERVAL_MS: u64 = 100;
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub harvest: HarvestConfig,
    pub logging: LoggingConfig,
}

/// CSS selectors locating the listing fields on a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Optional container narrowing the field selectors; empty means the whole document
    pub content_area: String,
    pub description: String,
    pub price: String,
    pub link: String,
}

impl SelectorSet {
    pub fn content_area(&self) -> Option<&str> {
        let area = self.content_area.trim();
        (!area.is_empty()).then_some(area)
    }
}

/// How the extractor treats uneven selector matches and missing links
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Zip to the shortest collection, keep missing hrefs as empty links
    #[default]
    Lenient,
    /// Reject pages with uneven collections or missing hrefs
    Strict,
}

/// Rendering backend used for sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Remote browser over WebDriver; executes scripts and lazy loading
    #[default]
    WebDriver,
    /// Plain HTTP fetch; no scripts, no scrolling
    Static,
}

/// Settle windows and bounds for asynchronous rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long to wait for the content height to change after a scroll
    pub scroll_settle_ms: u64,

    /// How long to wait for listings to appear before extracting
    pub page_settle_ms: u64,

    pub poll_interval_ms: u64,

    /// Upper bound for the whole scroll loop of one page; unbounded if unset
    pub scroll_timeout_secs: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scroll_settle_ms: defaults::SCROLL_SETTLE_MS,
            page_settle_ms: defaults::PAGE_SETTLE_MS,
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            scroll_timeout_secs: None,
        }
    }
}

impl TimingConfig {
    pub const fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub const fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn scroll_timeout(&self) -> Option<Duration> {
        self.scroll_timeout_secs.map(Duration::from_secs)
    }
}

/// Immutable configuration for one harvest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Directory receiving the output table
    pub target_directory: PathBuf,

    /// Pixels per scroll tick
    pub scroll_step: u32,

    /// Store identifier, used in the file name and every record
    pub store: String,

    pub page_count: u32,

    /// Reuse `url` verbatim for every page instead of appending the page number
    pub single_page: bool,

    /// Base URL; the page number is appended unless `single_page` is set
    pub url: String,

    pub selectors: SelectorSet,

    pub strictness: Strictness,

    pub engine: EngineKind,

    pub timing: TimingConfig,

    pub browser: BrowserConfig,

    pub http: HttpClientConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target_directory: PathBuf::from(defaults::TARGET_DIRECTORY),
            scroll_step: defaults::SCROLL_STEP,
            store: defaults::STORE.to_string(),
            page_count: defaults::PAGE_COUNT,
            single_page: false,
            url: String::new(),
            selectors: SelectorSet::default(),
            strictness: Strictness::default(),
            engine: EngineKind::default(),
            timing: TimingConfig::default(),
            browser: BrowserConfig::default(),
            http: HttpClientConfig::default(),
        }
    }
}

impl HarvestConfig {
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder::default()
    }

    pub fn page_plan(&self) -> PagePlan {
        PagePlan::new(
            self.url.clone(),
            self.page_count,
            PaginationMode::from_single_page_flag(self.single_page),
        )
    }

    /// `{target_directory}/{run_date}_{store}.csv`
    pub fn output_path(&self, run_date: NaiveDate) -> PathBuf {
        self.target_directory
            .join(format!("{}_{}.csv", run_date.format("%Y-%m-%d"), self.store))
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::invalid_field("url", "base URL is empty"));
        }
        let first_page = self.page_plan().url_for(1);
        Url::parse(&first_page)
            .map_err(|e| ConfigError::invalid_field("url", format!("'{first_page}' is not a valid URL: {e}")))?;

        if self.scroll_step == 0 {
            return Err(ConfigError::invalid_field("scroll_step", "must be greater than 0"));
        }

        let store = self.store.trim();
        if store.is_empty() || store.contains(['/', '\\']) {
            return Err(ConfigError::invalid_field(
                "store",
                "must be a non-empty name without path separators",
            ));
        }

        for (field, selector) in [
            ("selectors.description", &self.selectors.description),
            ("selectors.price", &self.selectors.price),
            ("selectors.link", &self.selectors.link),
        ] {
            if selector.trim().is_empty() {
                return Err(ConfigError::invalid_field(field, "selector is empty"));
            }
        }

        if self.timing.poll_interval_ms == 0 {
            return Err(ConfigError::invalid_field("timing.poll_interval_ms", "must be greater than 0"));
        }

        Ok(())
    }
}

/// Builder for [`HarvestConfig`]; `build` validates the result
#[derive(Debug, Clone, Default)]
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    pub fn from_config(config: HarvestConfig) -> Self {
        Self { config }
    }

    pub fn target_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.target_directory = dir.into();
        self
    }

    pub fn scroll_step(mut self, pixels: u32) -> Self {
        self.config.scroll_step = pixels;
        self
    }

    pub fn store(mut self, store: impl Into<String>) -> Self {
        self.config.store = store.into();
        self
    }

    pub fn page_count(mut self, pages: u32) -> Self {
        self.config.page_count = pages;
        self
    }

    pub fn single_page(mut self, single_page: bool) -> Self {
        self.config.single_page = single_page;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    pub fn content_area_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.selectors.content_area = selector.into();
        self
    }

    pub fn description_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.selectors.description = selector.into();
        self
    }

    pub fn price_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.selectors.price = selector.into();
        self
    }

    pub fn link_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.selectors.link = selector.into();
        self
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.config.strictness = strictness;
        self
    }

    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.config.timing = timing;
        self
    }

    pub fn webdriver_url(mut self, endpoint: impl Into<String>) -> Self {
        self.config.browser.webdriver_url = endpoint.into();
        self
    }

    pub fn build(self) -> Result<HarvestConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// JSON formatted file logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_directory: None,
        }
    }
}

/// Loads [`AppConfig`] from file and environment
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigManager {
    pub const ENV_PREFIX: &'static str = "HARVESTER";

    /// Default config file location: `<user config dir>/listing-harvester/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("listing-harvester").join("config.toml"))
    }

    /// Manager reading the default config file if it exists
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: Self::ENV_PREFIX.to_string(),
        }
    }

    /// Manager reading an explicit config file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            env_prefix: Self::ENV_PREFIX.to_string(),
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn load(&self, require_file: bool) -> Result<AppConfig, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = &self.config_path {
            if path.exists() || require_file {
                info!("Loading configuration from: {:?}", path);
            }
            builder = builder.add_source(config::File::from(path.as_path()).required(require_file));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<AppConfig>()?)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
