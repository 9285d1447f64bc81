//! Rendering session capability
//!
//! The harvester never talks to a browser directly. It drives a
//! [`RenderSession`] handed out by a [`SessionLauncher`], one session per
//! page. Implementations: `webdriver` (remote browser over WebDriver) and
//! `static_page` (server-rendered HTML, no script execution).

use async_trait::async_trait;
use serde_json::Value;

use super::error::SessionResult;

/// Script returning the current scrollable content height in pixels
pub const CONTENT_HEIGHT_SCRIPT: &str = "return document.body.scrollHeight";

/// Script scrolling the viewport down by `step` pixels
pub fn scroll_by_script(step: u32) -> String {
    format!("window.scrollBy(0, {step});")
}

/// Live, scriptable page handle
#[async_trait]
pub trait RenderSession: Send {
    /// Opaque element handle, valid for the lifetime of the current document
    type Element: Clone + Send + Sync;

    async fn navigate(&mut self, url: &str) -> SessionResult<()>;

    async fn evaluate_script(&mut self, script: &str) -> SessionResult<Value>;

    /// All elements matching `selector`, in document order. With a scope,
    /// only descendants of that element are searched.
    async fn find_all(
        &mut self,
        selector: &str,
        scope: Option<&Self::Element>,
    ) -> SessionResult<Vec<Self::Element>>;

    /// Rendered text content of an element
    async fn text(&mut self, element: &Self::Element) -> SessionResult<String>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> SessionResult<Option<String>>;

    async fn close(self) -> SessionResult<()>
    where
        Self: Sized;
}

/// Factory for fresh, isolated sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: RenderSession;

    async fn launch(&self) -> SessionResult<Self::Session>;
}

/// Read the content height through [`CONTENT_HEIGHT_SCRIPT`].
///
/// Browsers report an integer, but some drivers hand back floats; anything
/// non-numeric counts as zero height.
pub async fn content_height<S: RenderSession>(session: &mut S) -> SessionResult<u64> {
    let value = session.evaluate_script(CONTENT_HEIGHT_SCRIPT).await?;
    Ok(height_from_value(&value))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn height_from_value(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|h| *h > 0.0).map(|h| h.ceil() as u64))
        .unwrap_or(0)
}
