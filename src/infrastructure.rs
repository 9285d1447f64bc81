//! Infrastructure layer for rendering sessions, configuration, and output
//!
//! Two session engines implement the same traits: a WebDriver client for
//! script-rendered pages and a static HTTP engine for server-rendered ones.

pub mod config;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod record_sink;
pub mod session;
pub mod static_page;
pub mod webdriver;

pub use config::{
    AppConfig, ConfigManager, EngineKind, HarvestConfig, HarvestConfigBuilder, LoggingConfig,
    SelectorSet, Strictness, TimingConfig,
};
pub use error::{ConfigError, ExtractionError, HarvestError, HarvestResult, SessionError, SessionResult};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging_with_config};
pub use record_sink::{CsvOutputTable, MemorySink, RecordSink};
pub use session::{RenderSession, SessionLauncher};
pub use static_page::{StaticLauncher, StaticSession};
pub use webdriver::{BrowserConfig, BrowserKind, WebDriverLauncher, WebDriverSession};
