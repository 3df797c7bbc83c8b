//! Capability contract for a controllable web page/session.
//!
//! The engine depends only on these traits. Concrete drivers (a real
//! browser, or the in-memory [`fake`] used in tests) implement them
//! outside the engine's sight, so navigation and element lookup stay
//! polymorphic over the automation backend.

pub mod fake;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SurfaceResult;

/// A controllable browser able to open isolated pages.
///
/// Every page returned by [`open_page`] carries its own navigation state,
/// so a misbehaving topic cannot leak into its siblings.
///
/// [`open_page`]: BrowserSurface::open_page
#[async_trait]
pub trait BrowserSurface: Send + Sync {
    /// Opens a fresh, isolated page.
    async fn open_page(&self) -> SurfaceResult<Box<dyn PageSurface>>;
}

/// One controllable page.
///
/// All operations may signal a timeout distinctly from other failures;
/// see [`SurfaceError`](crate::error::SurfaceError).
#[async_trait]
pub trait PageSurface: Send + Sync {
    /// Navigates the page to `url`.
    async fn navigate(&self, url: &str) -> SurfaceResult<()>;

    /// Returns handles for every element matching `selector`, in document
    /// order. No match is an empty vector, not an error.
    async fn query_all(&self, selector: &str) -> SurfaceResult<Vec<Box<dyn ElementSurface>>>;

    /// Clicks the first element matching `selector`.
    async fn click(&self, selector: &str) -> SurfaceResult<()>;

    /// Types `value` into the first element matching `selector`.
    async fn fill(&self, selector: &str, value: &str) -> SurfaceResult<()>;

    /// Resolves once `selector` matches an element, or fails with a
    /// timeout after `timeout`.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> SurfaceResult<()>;

    /// The URL the page currently shows.
    async fn current_url(&self) -> SurfaceResult<String>;

    /// Releases the page. Callers treat failures as advisory; drivers must
    /// leave no live tab behind on a clean return.
    async fn close(&self) -> SurfaceResult<()>;
}

/// A handle to one element matched on a page.
#[async_trait]
pub trait ElementSurface: Send + Sync {
    /// Visible text content of the element.
    async fn text(&self) -> SurfaceResult<String>;

    /// Attribute value, or `None` when the attribute is absent.
    async fn attribute(&self, name: &str) -> SurfaceResult<Option<String>>;

    /// Clicks this element.
    async fn click(&self) -> SurfaceResult<()>;
}
