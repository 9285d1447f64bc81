//! Test doubles for rendering sessions
//!
//! `LazyPage` simulates a page whose height grows as it is scrolled.
//! `LateRenderLauncher` serves pages whose listings appear some time after
//! navigation. `TrackingLauncher` wraps another launcher and counts how many
//! sessions were opened and closed.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::infrastructure::error::{SessionError, SessionResult};
use crate::infrastructure::session::{CONTENT_HEIGHT_SCRIPT, RenderSession, SessionLauncher};
use crate::infrastructure::static_page::{StaticElement, StaticLauncher, StaticSession};

/// Page whose content height after `n` scrolls is `heights[min(n, len - 1)]`,
/// or `heights[0] + n * growth` for a page that never stops growing
#[derive(Debug)]
pub struct LazyPage {
    heights: Vec<u64>,
    growth: Option<u64>,
    scrolls: usize,
    render_delay: usize,
    reads_since_scroll: usize,
    fail_scrolls: bool,
}

impl LazyPage {
    pub fn new(heights: Vec<u64>) -> Self {
        assert!(!heights.is_empty(), "LazyPage needs at least one height");
        Self {
            heights,
            growth: None,
            scrolls: 0,
            render_delay: 0,
            reads_since_scroll: 0,
            fail_scrolls: false,
        }
    }

    /// New height becomes visible only on the `reads`-th read after a scroll
    pub fn with_render_delay(mut self, reads: usize) -> Self {
        self.render_delay = reads;
        self.reads_since_scroll = reads;
        self
    }

    /// Infinite feed: every scroll adds `growth` pixels
    pub fn endless(start: u64, growth: u64) -> Self {
        let mut page = Self::new(vec![start]);
        page.growth = Some(growth);
        page
    }

    pub fn failing_scrolls(mut self) -> Self {
        self.fail_scrolls = true;
        self
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls
    }

    fn height_after(&self, scrolls: usize) -> u64 {
        match self.growth {
            Some(growth) => self.heights[0] + growth * scrolls as u64,
            None => self.heights[scrolls.min(self.heights.len() - 1)],
        }
    }

    fn read_height(&mut self) -> u64 {
        self.reads_since_scroll += 1;
        if self.scrolls > 0 && self.reads_since_scroll < self.render_delay {
            self.height_after(self.scrolls - 1)
        } else {
            self.height_after(self.scrolls)
        }
    }
}

#[async_trait]
impl RenderSession for LazyPage {
    type Element = ();

    async fn navigate(&mut self, _url: &str) -> SessionResult<()> {
        Ok(())
    }

    async fn evaluate_script(&mut self, script: &str) -> SessionResult<Value> {
        if script == CONTENT_HEIGHT_SCRIPT {
            return Ok(Value::from(self.read_height()));
        }
        if self.fail_scrolls {
            return Err(SessionError::script_failed(script, "javascript error"));
        }
        self.scrolls += 1;
        self.reads_since_scroll = 0;
        Ok(Value::Null)
    }

    async fn find_all(&mut self, _selector: &str, _scope: Option<&()>) -> SessionResult<Vec<()>> {
        Ok(Vec::new())
    }

    async fn text(&mut self, _element: &()) -> SessionResult<String> {
        Ok(String::new())
    }

    async fn attribute(&mut self, _element: &(), _name: &str) -> SessionResult<Option<String>> {
        Ok(None)
    }

    async fn close(self) -> SessionResult<()> {
        Ok(())
    }
}

/// Launches endless `LazyPage` sessions
#[derive(Debug, Clone, Copy)]
pub struct EndlessFeedLauncher {
    pub start: u64,
    pub growth: u64,
}

#[async_trait]
impl SessionLauncher for EndlessFeedLauncher {
    type Session = LazyPage;

    async fn launch(&self) -> SessionResult<LazyPage> {
        Ok(LazyPage::endless(self.start, self.growth))
    }
}

/// Serves `initial` markup right after navigation and `rendered` markup
/// once `delay` has passed since navigation
#[derive(Debug, Clone)]
pub struct LateRenderLauncher {
    inner: StaticLauncher,
    delay: Duration,
}

impl LateRenderLauncher {
    pub fn new(url: &str, initial: String, rendered: String, delay: Duration) -> Self {
        Self {
            inner: StaticLauncher::from_fixtures([
                (url.to_string(), initial),
                (format!("{url}#rendered"), rendered),
            ]),
            delay,
        }
    }
}

#[async_trait]
impl SessionLauncher for LateRenderLauncher {
    type Session = LateRenderSession;

    async fn launch(&self) -> SessionResult<LateRenderSession> {
        Ok(LateRenderSession {
            inner: self.inner.launch().await?,
            delay: self.delay,
            loaded: None,
            rendered: false,
        })
    }
}

pub struct LateRenderSession {
    inner: StaticSession,
    delay: Duration,
    loaded: Option<(String, Instant)>,
    rendered: bool,
}

impl LateRenderSession {
    async fn render_if_due(&mut self) -> SessionResult<()> {
        if self.rendered {
            return Ok(());
        }
        if let Some((url, at)) = &self.loaded {
            if at.elapsed() >= self.delay {
                let rendered_url = format!("{url}#rendered");
                self.inner.navigate(&rendered_url).await?;
                self.rendered = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RenderSession for LateRenderSession {
    type Element = StaticElement;

    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        self.inner.navigate(url).await?;
        self.loaded = Some((url.to_string(), Instant::now()));
        self.rendered = false;
        Ok(())
    }

    async fn evaluate_script(&mut self, script: &str) -> SessionResult<Value> {
        self.inner.evaluate_script(script).await
    }

    async fn find_all(
        &mut self,
        selector: &str,
        scope: Option<&StaticElement>,
    ) -> SessionResult<Vec<StaticElement>> {
        self.render_if_due().await?;
        self.inner.find_all(selector, scope).await
    }

    async fn text(&mut self, element: &StaticElement) -> SessionResult<String> {
        self.inner.text(element).await
    }

    async fn attribute(
        &mut self,
        element: &StaticElement,
        name: &str,
    ) -> SessionResult<Option<String>> {
        self.inner.attribute(element, name).await
    }

    async fn close(self) -> SessionResult<()> {
        self.inner.close().await
    }
}

/// Counts launches and closes of the wrapped launcher's sessions
#[derive(Debug, Clone)]
pub struct TrackingLauncher<L = StaticLauncher> {
    inner: L,
    pub launches: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    fail_lookups: bool,
    fail_launch_after: Option<usize>,
}

impl<L: SessionLauncher> TrackingLauncher<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            launches: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_lookups: false,
            fail_launch_after: None,
        }
    }

    /// Every selector lookup fails after navigation succeeded
    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    /// Launches beyond the first `count` fail
    pub fn failing_launch_after(mut self, count: usize) -> Self {
        self.fail_launch_after = Some(count);
        self
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<L: SessionLauncher> SessionLauncher for TrackingLauncher<L> {
    type Session = TrackingSession<L::Session>;

    async fn launch(&self) -> SessionResult<Self::Session> {
        let previous = self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch_after.is_some_and(|limit| previous >= limit) {
            return Err(SessionError::launch_failed("browser unavailable", None));
        }
        Ok(TrackingSession {
            inner: self.inner.launch().await?,
            closes: Arc::clone(&self.closes),
            fail_lookups: self.fail_lookups,
        })
    }
}

pub struct TrackingSession<S> {
    inner: S,
    closes: Arc<AtomicUsize>,
    fail_lookups: bool,
}

#[async_trait]
impl<S: RenderSession> RenderSession for TrackingSession<S> {
    type Element = S::Element;

    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        self.inner.navigate(url).await
    }

    async fn evaluate_script(&mut self, script: &str) -> SessionResult<Value> {
        self.inner.evaluate_script(script).await
    }

    async fn find_all(
        &mut self,
        selector: &str,
        scope: Option<&S::Element>,
    ) -> SessionResult<Vec<S::Element>> {
        if self.fail_lookups {
            return Err(SessionError::lookup_failed(selector, "session crashed"));
        }
        self.inner.find_all(selector, scope).await
    }

    async fn text(&mut self, element: &S::Element) -> SessionResult<String> {
        self.inner.text(element).await
    }

    async fn attribute(
        &mut self,
        element: &S::Element,
        name: &str,
    ) -> SessionResult<Option<String>> {
        self.inner.attribute(element, name).await
    }

    async fn close(self) -> SessionResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }
}

/// Listing page markup with one `.d`/`.p`/`.a` triple per item inside `.list`
pub fn listing_page(items: &[(&str, &str, Option<&str>)]) -> String {
    let mut body = String::from("<html><body><div class=\"list\">");
    for (description, price, href) in items {
        body.push_str(&format!(
            "<div class=\"item\"><span class=\"d\">{description}</span><span class=\"p\">{price}</span>"
        ));
        match href {
            Some(href) => body.push_str(&format!("<a class=\"a\" href=\"{href}\">view</a>")),
            None => body.push_str("<a class=\"a\">view</a>"),
        }
        body.push_str("</div>");
    }
    body.push_str("</div></body></html>");
    body
}
