//! WebDriver-backed rendering sessions
//!
//! Each launch opens a new browser session on a running WebDriver endpoint
//! (chromedriver, geckodriver, or a Selenium grid). Closing the session
//! ends the browser session on the endpoint.

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator, elements::Element};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use super::error::{SessionError, SessionResult};
use super::session::{RenderSession, SessionLauncher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

/// Browser session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint URL
    pub webdriver_url: String,

    pub browser: BrowserKind,

    /// Run without a visible window
    pub headless: bool,

    /// Extra command-line arguments passed to the browser
    pub arguments: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser: BrowserKind::Chrome,
            headless: true,
            arguments: vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
        }
    }
}

impl BrowserConfig {
    /// W3C capabilities for a new session
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut args = self.arguments.clone();
        let mut caps = Map::new();

        match self.browser {
            BrowserKind::Chrome => {
                if self.headless && !args.iter().any(|a| a.starts_with("--headless")) {
                    args.insert(0, "--headless".to_string());
                }
                caps.insert("browserName".to_string(), json!("chrome"));
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
            BrowserKind::Firefox => {
                if self.headless && !args.iter().any(|a| a == "-headless") {
                    args.insert(0, "-headless".to_string());
                }
                caps.insert("browserName".to_string(), json!("firefox"));
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
        }

        caps
    }
}

#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    config: BrowserConfig,
}

impl WebDriverLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    type Session = WebDriverSession;

    async fn launch(&self) -> SessionResult<WebDriverSession> {
        debug!("Opening WebDriver session at {}", self.config.webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(self.config.capabilities())
            .connect(&self.config.webdriver_url)
            .await
            .map_err(|e| {
                SessionError::launch_failed(e.to_string(), Some(self.config.webdriver_url.as_str()))
            })?;

        Ok(WebDriverSession { client })
    }
}

pub struct WebDriverSession {
    client: Client,
}

#[async_trait]
impl RenderSession for WebDriverSession {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        info!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| SessionError::navigation_failed(url, e.to_string()))
    }

    async fn evaluate_script(&mut self, script: &str) -> SessionResult<Value> {
        self.client
            .execute(script, Vec::new())
            .await
            .map_err(|e| SessionError::script_failed(script, e.to_string()))
    }

    async fn find_all(
        &mut self,
        selector: &str,
        scope: Option<&Element>,
    ) -> SessionResult<Vec<Element>> {
        let found = match scope {
            Some(element) => element.find_all(Locator::Css(selector)).await,
            None => self.client.find_all(Locator::Css(selector)).await,
        };
        found.map_err(|e| SessionError::lookup_failed(selector, e.to_string()))
    }

    async fn text(&mut self, element: &Element) -> SessionResult<String> {
        element
            .text()
            .await
            .map_err(|e| SessionError::Command(format!("Failed to read element text: {e}")))
    }

    async fn attribute(&mut self, element: &Element, name: &str) -> SessionResult<Option<String>> {
        element
            .attr(name)
            .await
            .map_err(|e| SessionError::Command(format!("Failed to read attribute '{name}': {e}")))
    }

    async fn close(self) -> SessionResult<()> {
        self.client
            .close()
            .await
            .map_err(|e| SessionError::Command(format!("Failed to close browser session: {e}")))
    }
}
