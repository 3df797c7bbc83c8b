//! Ordered traversal over the enumerated topic listing.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::SurfaceResult;
use crate::model::{Credentials, RunSummary, TopicReference};
use crate::policy::EngagementPolicy;
use crate::session::SessionManager;
use crate::surface::{BrowserSurface, PageSurface};
use crate::visitor::TopicVisitor;
use crate::{DEFAULT_NAV_TIMEOUT_MS, DEFAULT_SETTLE_MS};

/// Topic title links on the listing page.
pub const TOPIC_TITLES: &str = "#list-area .title";

/// Tunables injected once at startup; no component reads ambient state.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub home_url: String,
    pub connect_url: String,
    /// Cap on topics visited per run, bounding worst-case duration.
    pub max_topics: usize,
    /// Per-topic like probability in `[0, 1]`.
    pub like_probability: f64,
    /// Fixed post-interaction delay, doubling as render settle and
    /// anti-flood pacing.
    pub settle: Duration,
    pub nav_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            home_url: "https://linux.do/".to_string(),
            connect_url: "https://connect.linux.do/".to_string(),
            max_topics: 10,
            like_probability: 0.02,
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            nav_timeout: Duration::from_millis(DEFAULT_NAV_TIMEOUT_MS),
        }
    }
}

/// Runs one full traversal: login, enumerate, visit each topic, report.
///
/// The run moves `Init -> Authenticating -> {Aborted | Traversing} ->
/// Finalized`; there is no retry state, and failures while traversing are
/// absorbed as per-item outcomes rather than state transitions.
pub struct TraversalEngine<'a> {
    browser: &'a dyn BrowserSurface,
    page: &'a dyn PageSurface,
    config: EngineConfig,
}

impl<'a> TraversalEngine<'a> {
    /// `page` is the primary authenticated session page; `browser` opens
    /// the isolated per-topic pages.
    pub fn new(
        browser: &'a dyn BrowserSurface,
        page: &'a dyn PageSurface,
        config: EngineConfig,
    ) -> Self {
        Self { browser, page, config }
    }

    /// Executes the run. Never fails: a failed login or enumeration
    /// yields a finalized summary with zero visits, and every per-topic
    /// problem is absorbed into its outcome.
    pub async fn run(&self, credentials: &Credentials) -> RunSummary {
        let mut summary = RunSummary::begin();
        info!(
            target = "lurker.engine",
            started_at = %summary.started_at.format("%Y-%m-%d %H:%M:%S"),
            "run started"
        );

        if let Err(err) = self.page.navigate(&self.config.home_url).await {
            error!(target = "lurker.engine", url = %self.config.home_url, error = %err, "home page unreachable");
            summary.finalize();
            return summary;
        }

        let session = SessionManager::new(self.config.settle);
        if !session.login(self.page, credentials).await {
            warn!(target = "lurker.engine", "aborting run: authentication failed");
            summary.finalize();
            return summary;
        }

        let topics = match self.enumerate_topics().await {
            Ok(topics) => topics,
            Err(err) => {
                error!(target = "lurker.engine", error = %err, "listing enumeration failed");
                summary.finalize();
                return summary;
            }
        };

        let visitor = TopicVisitor::new(
            EngagementPolicy::new(self.config.like_probability),
            self.config.nav_timeout,
            self.config.settle,
        );
        for (index, topic) in topics.iter().enumerate() {
            info!(
                target = "lurker.engine",
                index = index + 1,
                total = topics.len(),
                title = %topic.title,
                "visiting topic"
            );
            summary.record(visitor.visit(self.browser, topic).await);
        }

        self.connect_info().await;

        summary.finalize();
        info!(
            target = "lurker.engine",
            visited = summary.visited.len(),
            engaged = summary.engaged_count,
            "run finished"
        );
        summary
    }

    /// Reads the topic listing from the primary page, capped at
    /// `max_topics` entries in listing order.
    async fn enumerate_topics(&self) -> SurfaceResult<Vec<TopicReference>> {
        let elements = self.page.query_all(TOPIC_TITLES).await?;
        let discovered = elements.len();
        info!(target = "lurker.engine", count = discovered, "topics discovered");

        if discovered > self.config.max_topics {
            info!(
                target = "lurker.engine",
                cap = self.config.max_topics,
                "listing exceeds cap, truncating"
            );
        }

        let mut topics = Vec::with_capacity(discovered.min(self.config.max_topics));
        for element in elements.iter().take(self.config.max_topics) {
            let title = element.text().await?.trim().to_string();
            let Some(href) = element.attribute("href").await? else {
                warn!(target = "lurker.engine", %title, "listing entry has no href, skipping");
                continue;
            };
            topics.push(TopicReference {
                title,
                url: join_url(&self.config.home_url, &href),
            });
        }
        Ok(topics)
    }

    /// Post-run connect-info check on the primary page. Runs only after
    /// traversal so it never interleaves with per-topic pages.
    async fn connect_info(&self) {
        if let Err(err) = self.page.navigate(&self.config.connect_url).await {
            warn!(target = "lurker.engine", url = %self.config.connect_url, error = %err, "connect info unavailable");
            return;
        }
        tokio::time::sleep(self.config.settle).await;
        match self.page.current_url().await {
            Ok(url) => info!(target = "lurker.engine", %url, "connect info page reached"),
            Err(err) => warn!(target = "lurker.engine", error = %err, "connect info url unreadable"),
        }
    }
}

/// Joins a listing href onto the forum base URL. Listing links are
/// site-relative; absolute hrefs pass through untouched.
fn join_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), href.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_relative_hrefs() {
        assert_eq!(
            join_url("https://forum.test/", "/t/topic-1"),
            "https://forum.test/t/topic-1"
        );
        assert_eq!(
            join_url("https://forum.test", "t/topic-1"),
            "https://forum.test/t/topic-1"
        );
    }

    #[test]
    fn join_url_passes_absolute_hrefs_through() {
        assert_eq!(
            join_url("https://forum.test/", "https://elsewhere.test/t/1"),
            "https://elsewhere.test/t/1"
        );
    }
}
