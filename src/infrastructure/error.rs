//! Error types for the harvesting engine
//!
//! `SessionError` covers everything the rendering session can fail at,
//! `ConfigError` covers rejected configuration, and `HarvestError` is the
//! run-level taxonomy the harvester reports to callers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures raised by a rendering session or its launcher
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to launch rendering session: {reason}")]
    LaunchFailed { reason: String, endpoint: Option<String> },

    #[error("Navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("Script evaluation failed: {reason}")]
    ScriptFailed { script: String, reason: String },

    #[error("Script is not supported by this session: {script}")]
    UnsupportedScript { script: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Element lookup failed for '{selector}': {reason}")]
    LookupFailed { selector: String, reason: String },

    #[error("Element handle is no longer attached to the document")]
    StaleElement,

    #[error("No document loaded in session")]
    NoDocument,

    #[error("Session command failed: {0}")]
    Command(String),
}

impl SessionError {
    pub fn launch_failed(reason: impl Into<String>, endpoint: Option<&str>) -> Self {
        Self::LaunchFailed {
            reason: reason.into(),
            endpoint: endpoint.map(ToString::to_string),
        }
    }

    pub fn navigation_failed(url: &str, reason: impl Into<String>) -> Self {
        Self::NavigationFailed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub fn script_failed(script: &str, reason: impl Into<String>) -> Self {
        Self::ScriptFailed {
            script: script.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    pub fn lookup_failed(selector: &str, reason: impl Into<String>) -> Self {
        Self::LookupFailed {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Failures while extracting listings from a loaded page
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(
        "Selector match counts differ: {descriptions} descriptions, {prices} prices, {links} links"
    )]
    LengthMismatch {
        descriptions: usize,
        prices: usize,
        links: usize,
    },

    #[error("Listing {index} has no href attribute")]
    MissingHref { index: usize },
}

/// Rejected harvest configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Run-level failures reported by the harvester
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Failed to prepare output at {path:?}: {source}")]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error on page {page} ({url}): {source}")]
    Session {
        page: u32,
        url: String,
        #[source]
        source: SessionError,
    },

    #[error("Scrolling page {page} did not converge within {timeout:?}")]
    ScrollTimeout { page: u32, timeout: Duration },

    #[error("Strict extraction rejected page {page}: {reason}")]
    Strictness { page: u32, reason: String },

    #[error("Failed to write record: {0}")]
    Sink(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    pub fn session(page: u32, url: &str, source: SessionError) -> Self {
        Self::Session {
            page,
            url: url.to_string(),
            source,
        }
    }

    pub fn extraction(page: u32, url: &str, error: ExtractionError) -> Self {
        match error {
            ExtractionError::Session(source) => Self::session(page, url, source),
            other => Self::Strictness {
                page,
                reason: other.to_string(),
            },
        }
    }

    /// Whether the error was raised before any page was processed
    pub fn is_setup_failure(&self) -> bool {
        matches!(self, Self::Setup { .. } | Self::Config(_))
    }

    /// Page the run was on when it aborted, if the failure is page-scoped
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Session { page, .. }
            | Self::ScrollTimeout { page, .. }
            | Self::Strictness { page, .. } => Some(*page),
            _ => None,
        }
    }
}

pub type HarvestResult<T> = Result<T, HarvestError>;
