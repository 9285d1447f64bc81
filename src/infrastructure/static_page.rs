//! Static page engine
//!
//! Sessions backed by plain HTML: fetched over HTTP for server-rendered
//! listings, or served from in-memory fixtures. Selectors are evaluated with
//! `scraper`. There is no layout or script engine, so the content height is
//! always reported as zero and scroll requests are accepted as no-ops.
//!
//! `Html` is not `Send`, so the document is kept as source text and parsed
//! once per `find_all`. The text and attributes of every matched element are
//! captured at that point, and `text`/`attribute` read from the capture.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::error::{SessionError, SessionResult};
use super::http_client::{HttpClient, HttpClientConfig};
use super::session::{CONTENT_HEIGHT_SCRIPT, RenderSession, SessionLauncher};

/// Where static sessions get their HTML from
#[derive(Debug, Clone)]
pub enum PageSource {
    Http(HttpClient),
    Fixtures(Arc<HashMap<String, String>>),
}

impl PageSource {
    async fn fetch(&self, url: &str) -> SessionResult<String> {
        match self {
            Self::Http(client) => client.get_text(url).await,
            Self::Fixtures(pages) => pages
                .get(url)
                .cloned()
                .ok_or_else(|| SessionError::navigation_failed(url, "no page registered for URL")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaticLauncher {
    source: PageSource,
}

impl StaticLauncher {
    pub fn http(config: &HttpClientConfig) -> SessionResult<Self> {
        Ok(Self {
            source: PageSource::Http(HttpClient::new(config)?),
        })
    }

    /// Serve pages from memory, keyed by exact URL
    pub fn from_fixtures<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pages = pages
            .into_iter()
            .map(|(url, html)| (url.into(), html.into()))
            .collect();
        Self {
            source: PageSource::Fixtures(Arc::new(pages)),
        }
    }
}

#[async_trait]
impl SessionLauncher for StaticLauncher {
    type Session = StaticSession;

    async fn launch(&self) -> SessionResult<StaticSession> {
        Ok(StaticSession {
            source: self.source.clone(),
            document: None,
            generation: 0,
            captured: HashMap::new(),
        })
    }
}

/// Element handle: position in document order within one loaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticElement {
    generation: u64,
    index: usize,
}

/// Content of a matched element, valid for one generation
#[derive(Debug)]
struct CapturedElement {
    text: String,
    attributes: HashMap<String, String>,
}

impl CapturedElement {
    fn of(element: ElementRef<'_>) -> Self {
        Self {
            text: element.text().collect(),
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug)]
pub struct StaticSession {
    source: PageSource,
    document: Option<String>,
    generation: u64,
    captured: HashMap<usize, CapturedElement>,
}

impl StaticSession {
    fn parsed(&self) -> SessionResult<Html> {
        self.document
            .as_deref()
            .map(Html::parse_document)
            .ok_or(SessionError::NoDocument)
    }

    fn check_generation(&self, handle: &StaticElement) -> SessionResult<()> {
        if handle.generation == self.generation {
            Ok(())
        } else {
            Err(SessionError::StaleElement)
        }
    }

    fn captured(&self, handle: &StaticElement) -> SessionResult<&CapturedElement> {
        self.check_generation(handle)?;
        self.captured.get(&handle.index).ok_or(SessionError::StaleElement)
    }
}

fn parse_selector(selector: &str) -> SessionResult<Selector> {
    Selector::parse(selector).map_err(|e| SessionError::invalid_selector(selector, e.to_string()))
}

fn elements(html: &Html) -> Vec<ElementRef<'_>> {
    html.tree.root().descendants().filter_map(ElementRef::wrap).collect()
}

#[async_trait]
impl RenderSession for StaticSession {
    type Element = StaticElement;

    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        let body = self.source.fetch(url).await?;
        debug!("Loaded static document from {} ({} bytes)", url, body.len());
        self.document = Some(body);
        self.generation += 1;
        self.captured.clear();
        Ok(())
    }

    async fn evaluate_script(&mut self, script: &str) -> SessionResult<Value> {
        if script == CONTENT_HEIGHT_SCRIPT {
            Ok(Value::from(0))
        } else if script.starts_with("window.scrollBy(") {
            Ok(Value::Null)
        } else {
            Err(SessionError::UnsupportedScript {
                script: script.to_string(),
            })
        }
    }

    async fn find_all(
        &mut self,
        selector: &str,
        scope: Option<&StaticElement>,
    ) -> SessionResult<Vec<StaticElement>> {
        let compiled = parse_selector(selector)?;
        let html = self.parsed()?;
        let all = elements(&html);

        let matches: Vec<ElementRef<'_>> = match scope {
            None => html.select(&compiled).collect(),
            Some(handle) => {
                self.check_generation(handle)?;
                all.get(handle.index)
                    .ok_or(SessionError::StaleElement)?
                    .select(&compiled)
                    .collect()
            }
        };
        if matches.is_empty() {
            return Ok(Vec::new());
        }

        let positions: HashMap<_, usize> = all
            .iter()
            .enumerate()
            .map(|(index, element)| (element.id(), index))
            .collect();

        let mut handles = Vec::with_capacity(matches.len());
        for element in matches {
            let Some(&index) = positions.get(&element.id()) else {
                continue;
            };
            self.captured
                .entry(index)
                .or_insert_with(|| CapturedElement::of(element));
            handles.push(StaticElement {
                generation: self.generation,
                index,
            });
        }
        Ok(handles)
    }

    async fn text(&mut self, element: &StaticElement) -> SessionResult<String> {
        Ok(self.captured(element)?.text.clone())
    }

    async fn attribute(
        &mut self,
        element: &StaticElement,
        name: &str,
    ) -> SessionResult<Option<String>> {
        Ok(self.captured(element)?.attributes.get(name).cloned())
    }

    async fn close(self) -> SessionResult<()> {
        Ok(())
    }
}
