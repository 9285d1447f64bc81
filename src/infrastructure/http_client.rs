//! HTTP client used by the static page engine
//!
//! Fetches server-rendered listing pages as text. No retries and no rate
//! limiting: a failed fetch surfaces as a navigation error for that page.

use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Deserialize, Serialize};

use super::error::{SessionError, SessionResult};

/// HTTP client configuration for page fetching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("listing-harvester/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 30,
            follow_redirects: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpClientConfig) -> SessionResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| SessionError::launch_failed(format!("Invalid user agent: {e}"), None))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| SessionError::launch_failed(format!("Failed to create HTTP client: {e}"), None))?;

        Ok(Self { client })
    }

    /// Fetch a URL and return its body as text
    pub async fn get_text(&self, url: &str) -> SessionResult<String> {
        tracing::debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::navigation_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::navigation_failed(
                url,
                format!("HTTP request failed with status {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| SessionError::navigation_failed(url, format!("Failed to read body: {e}")))
    }
}
