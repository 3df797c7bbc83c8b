//! Scripted in-memory automation surface for exercising the engine
//! without a browser.
//!
//! Tests build a [`FakeBrowser`] with scripted behaviors (which selectors
//! are present, how each URL responds to navigation), hand it to the
//! engine, then inspect the recorded interaction log.
//!
//! # Example
//!
//! ```ignore
//! let browser = FakeBrowser::builder()
//!     .present("#current-user")
//!     .nav("https://forum.test/t/broken", NavBehavior::Timeout)
//!     .build();
//!
//! let page = browser.open_page().await?;
//! page.navigate("https://forum.test/t/broken").await.unwrap_err();
//! assert_eq!(browser.pages_opened(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BrowserSurface, ElementSurface, PageSurface};
use crate::error::{SurfaceError, SurfaceResult};

/// Scripted result of navigating to one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavBehavior {
    /// Navigation succeeds (the default for unscripted URLs).
    Ok,
    /// Navigation fails with a timeout.
    Timeout,
    /// Navigation fails with a driver error.
    Error,
}

/// Blueprint for one element returned by `query_all`.
#[derive(Debug, Clone, Default)]
pub struct FakeElementSpec {
    text: String,
    attrs: HashMap<String, String>,
}

impl FakeElementSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), attrs: HashMap::new() }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }
}

#[derive(Default)]
struct SharedState {
    present: HashSet<String>,
    elements: HashMap<String, Vec<FakeElementSpec>>,
    nav_scripts: HashMap<String, NavBehavior>,
    broken_selectors: HashSet<String>,
    events: Vec<String>,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    last_url: HashMap<usize, String>,
    pages_opened: usize,
    pages_closed: usize,
}

/// Builder for a scripted browser.
#[derive(Default)]
pub struct FakeBrowserBuilder {
    state: SharedState,
}

impl FakeBrowserBuilder {
    /// Marks `selector` as present: `wait_for` on it resolves immediately.
    pub fn present(mut self, selector: &str) -> Self {
        self.state.present.insert(selector.to_string());
        self
    }

    /// Scripts the element set returned by `query_all(selector)`. Also
    /// marks the selector as present.
    pub fn elements(mut self, selector: &str, specs: Vec<FakeElementSpec>) -> Self {
        self.state.present.insert(selector.to_string());
        self.state.elements.insert(selector.to_string(), specs);
        self
    }

    /// Scripts how navigating to `url` behaves.
    pub fn nav(mut self, url: &str, behavior: NavBehavior) -> Self {
        self.state.nav_scripts.insert(url.to_string(), behavior);
        self
    }

    /// Makes `click` and `fill` on `selector` fail with a driver error.
    pub fn broken(mut self, selector: &str) -> Self {
        self.state.broken_selectors.insert(selector.to_string());
        self
    }

    pub fn build(self) -> FakeBrowser {
        FakeBrowser { state: Arc::new(Mutex::new(self.state)) }
    }
}

/// Scripted browser; clones share the same state and interaction log.
#[derive(Clone)]
pub struct FakeBrowser {
    state: Arc<Mutex<SharedState>>,
}

impl FakeBrowser {
    pub fn builder() -> FakeBrowserBuilder {
        FakeBrowserBuilder::default()
    }

    /// The page the engine treats as its authenticated session page.
    /// Not counted in [`pages_opened`](Self::pages_opened).
    pub fn primary_page(&self) -> Box<dyn PageSurface> {
        Box::new(FakePage { state: Arc::clone(&self.state), id: 0 })
    }

    /// Ordered event log: `open:<id>`, `nav:<id>:<url>`,
    /// `click:<id>:<selector>`, `fill:<id>:<selector>`, `close:<id>`.
    /// The primary page has id 0; opened pages count from 1.
    pub fn events(&self) -> Vec<String> {
        self.state.lock().events.clone()
    }

    /// Every selector clicked, across all pages, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().clicks.clone()
    }

    /// Every `(selector, value)` filled, across all pages, in order.
    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().fills.clone()
    }

    /// Number of isolated pages handed out via `open_page`.
    pub fn pages_opened(&self) -> usize {
        self.state.lock().pages_opened
    }

    /// Number of those pages closed again.
    pub fn pages_closed(&self) -> usize {
        self.state.lock().pages_closed
    }
}

#[async_trait]
impl BrowserSurface for FakeBrowser {
    async fn open_page(&self) -> SurfaceResult<Box<dyn PageSurface>> {
        let mut state = self.state.lock();
        state.pages_opened += 1;
        let id = state.pages_opened;
        state.events.push(format!("open:{id}"));
        drop(state);
        Ok(Box::new(FakePage { state: Arc::clone(&self.state), id }))
    }
}

struct FakePage {
    state: Arc<Mutex<SharedState>>,
    id: usize,
}

#[async_trait]
impl PageSurface for FakePage {
    async fn navigate(&self, url: &str) -> SurfaceResult<()> {
        let behavior = {
            let mut state = self.state.lock();
            state.events.push(format!("nav:{}:{url}", self.id));
            state.nav_scripts.get(url).copied().unwrap_or(NavBehavior::Ok)
        };
        match behavior {
            NavBehavior::Ok => {
                self.state.lock().last_url.insert(self.id, url.to_string());
                Ok(())
            }
            NavBehavior::Timeout => Err(SurfaceError::timeout(url, 0)),
            NavBehavior::Error => Err(SurfaceError::driver(format!("scripted failure for {url}"))),
        }
    }

    async fn query_all(&self, selector: &str) -> SurfaceResult<Vec<Box<dyn ElementSurface>>> {
        let specs = {
            let state = self.state.lock();
            state.elements.get(selector).cloned().unwrap_or_default()
        };
        Ok(specs
            .into_iter()
            .map(|spec| {
                Box::new(FakeElement { spec, state: Arc::clone(&self.state) })
                    as Box<dyn ElementSurface>
            })
            .collect())
    }

    async fn click(&self, selector: &str) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        if state.broken_selectors.contains(selector) {
            return Err(SurfaceError::driver(format!("scripted click failure on {selector}")));
        }
        state.clicks.push(selector.to_string());
        state.events.push(format!("click:{}:{selector}", self.id));
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        if state.broken_selectors.contains(selector) {
            return Err(SurfaceError::driver(format!("scripted fill failure on {selector}")));
        }
        state.fills.push((selector.to_string(), value.to_string()));
        state.events.push(format!("fill:{}:{selector}", self.id));
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> SurfaceResult<()> {
        let state = self.state.lock();
        if state.present.contains(selector) {
            Ok(())
        } else {
            Err(SurfaceError::timeout(selector, timeout.as_millis() as u64))
        }
    }

    async fn current_url(&self) -> SurfaceResult<String> {
        let state = self.state.lock();
        Ok(state
            .last_url
            .get(&self.id)
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn close(&self) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        if self.id > 0 {
            state.pages_closed += 1;
        }
        state.events.push(format!("close:{}", self.id));
        Ok(())
    }
}

struct FakeElement {
    spec: FakeElementSpec,
    state: Arc<Mutex<SharedState>>,
}

#[async_trait]
impl ElementSurface for FakeElement {
    async fn text(&self) -> SurfaceResult<String> {
        Ok(self.spec.text.clone())
    }

    async fn attribute(&self, name: &str) -> SurfaceResult<Option<String>> {
        Ok(self.spec.attrs.get(name).cloned())
    }

    async fn click(&self) -> SurfaceResult<()> {
        let mut state = self.state.lock();
        state.clicks.push(format!("element:{}", self.spec.text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_navigation_succeeds_and_updates_url() {
        let browser = FakeBrowser::builder().build();
        let page = browser.primary_page();

        page.navigate("https://forum.test/").await.unwrap();
        assert_eq!(page.current_url().await.unwrap(), "https://forum.test/");
    }

    #[tokio::test]
    async fn scripted_timeout_is_a_timeout() {
        let browser = FakeBrowser::builder()
            .nav("https://forum.test/t/slow", NavBehavior::Timeout)
            .build();
        let page = browser.primary_page();

        let err = page.navigate("https://forum.test/t/slow").await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn wait_for_resolves_only_for_present_selectors() {
        let browser = FakeBrowser::builder().present("#current-user").build();
        let page = browser.primary_page();

        page.wait_for("#current-user", Duration::from_secs(1)).await.unwrap();
        let err = page.wait_for("#missing", Duration::from_secs(1)).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn open_and_close_are_accounted() {
        let browser = FakeBrowser::builder().build();

        let page = browser.open_page().await.unwrap();
        assert_eq!(browser.pages_opened(), 1);
        assert_eq!(browser.pages_closed(), 0);

        page.close().await.unwrap();
        assert_eq!(browser.pages_closed(), 1);
        assert_eq!(browser.events(), ["open:1", "close:1"]);
    }

    #[tokio::test]
    async fn elements_carry_text_and_attributes() {
        let browser = FakeBrowser::builder()
            .elements(
                ".title",
                vec![FakeElementSpec::new("Hello").attr("href", "/t/hello")],
            )
            .build();
        let page = browser.primary_page();

        let elements = page.query_all(".title").await.unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text().await.unwrap(), "Hello");
        assert_eq!(
            elements[0].attribute("href").await.unwrap().as_deref(),
            Some("/t/hello")
        );
        assert_eq!(elements[0].attribute("class").await.unwrap(), None);
    }
}
