//! chromiumoxide-backed implementation of the automation surface.
//!
//! One [`ChromiumBrowser`] owns the browser process and its event loop;
//! every [`open_page`](lurker::BrowserSurface::open_page) call yields an
//! isolated tab that `close()` destroys.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use lurker::{BrowserSurface, ElementSurface, PageSurface, SurfaceError, SurfaceResult};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn driver_err(err: impl std::fmt::Display) -> SurfaceError {
    SurfaceError::driver(err.to_string())
}

/// A launched browser plus the spawned handler loop driving its events.
pub struct ChromiumBrowser {
    browser: Browser,
    handler_task: JoinHandle<()>,
    nav_timeout: Duration,
}

impl ChromiumBrowser {
    /// Launches the browser (headless unless `headful`) and starts its
    /// event loop.
    pub async fn launch(headful: bool, nav_timeout: Duration) -> anyhow::Result<Self> {
        let mut builder = BrowserConfig::builder();
        if headful {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("browser config: {e}"))?;

        debug!(target = "lurker.browser", headful, "launching browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, handler_task, nav_timeout })
    }

    /// Opens the page used for the authenticated session.
    pub async fn primary_page(&self) -> anyhow::Result<Box<dyn PageSurface>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to open primary page")?;
        Ok(Box::new(ChromiumPage { page, nav_timeout: self.nav_timeout }))
    }

    /// Closes the browser process and stops the event loop.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!(target = "lurker.browser", error = %err, "browser close failed");
        }
        if let Err(err) = self.browser.wait().await {
            warn!(target = "lurker.browser", error = %err, "browser wait failed");
        }
        self.handler_task.abort();
    }
}

#[async_trait]
impl BrowserSurface for ChromiumBrowser {
    async fn open_page(&self) -> SurfaceResult<Box<dyn PageSurface>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(driver_err)?;
        Ok(Box::new(ChromiumPage { page, nav_timeout: self.nav_timeout }))
    }
}

struct ChromiumPage {
    page: Page,
    nav_timeout: Duration,
}

#[async_trait]
impl PageSurface for ChromiumPage {
    async fn navigate(&self, url: &str) -> SurfaceResult<()> {
        match tokio::time::timeout(self.nav_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(driver_err(err)),
            Err(_) => Err(SurfaceError::timeout(url, self.nav_timeout.as_millis() as u64)),
        }
    }

    async fn query_all(&self, selector: &str) -> SurfaceResult<Vec<Box<dyn ElementSurface>>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(driver_err)?;
        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromiumElement { element }) as Box<dyn ElementSurface>)
            .collect())
    }

    async fn click(&self, selector: &str) -> SurfaceResult<()> {
        let element = self.page.find_element(selector).await.map_err(driver_err)?;
        element.click().await.map_err(driver_err)?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> SurfaceResult<()> {
        let element = self.page.find_element(selector).await.map_err(driver_err)?;
        element.click().await.map_err(driver_err)?;
        element.type_str(value).await.map_err(driver_err)?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> SurfaceResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SurfaceError::timeout(selector, timeout.as_millis() as u64));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn current_url(&self) -> SurfaceResult<String> {
        let url = self.page.url().await.map_err(driver_err)?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn close(&self) -> SurfaceResult<()> {
        self.page.clone().close().await.map_err(driver_err)
    }
}

struct ChromiumElement {
    element: Element,
}

#[async_trait]
impl ElementSurface for ChromiumElement {
    async fn text(&self) -> SurfaceResult<String> {
        let text = self.element.inner_text().await.map_err(driver_err)?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> SurfaceResult<Option<String>> {
        self.element.attribute(name).await.map_err(driver_err)
    }

    async fn click(&self) -> SurfaceResult<()> {
        self.element.click().await.map_err(driver_err)?;
        Ok(())
    }
}
