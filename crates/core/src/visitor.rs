//! Per-topic visiting with strict failure isolation.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::{SurfaceError, SurfaceResult};
use crate::model::{TopicReference, VisitOutcome, VisitStatus};
use crate::policy::{EngageOutcome, EngagementPolicy};
use crate::surface::{BrowserSurface, PageSurface};

/// Visits one topic at a time, each in a page of its own.
///
/// Every failure mode collapses into the returned [`VisitOutcome`];
/// nothing propagates past this boundary, and the page is closed on
/// every exit path.
pub struct TopicVisitor {
    policy: EngagementPolicy,
    nav_timeout: Duration,
    settle: Duration,
}

impl TopicVisitor {
    pub fn new(policy: EngagementPolicy, nav_timeout: Duration, settle: Duration) -> Self {
        Self { policy, nav_timeout, settle }
    }

    /// Opens an isolated page for `topic`, applies the engagement policy,
    /// and reports how the visit concluded.
    pub async fn visit(
        &self,
        browser: &dyn BrowserSurface,
        topic: &TopicReference,
    ) -> VisitOutcome {
        let page = match browser.open_page().await {
            Ok(page) => page,
            Err(err) => {
                error!(target = "lurker.visit", title = %topic.title, error = %err, "could not open page");
                return VisitOutcome {
                    topic: topic.clone(),
                    engaged: false,
                    status: VisitStatus::Failed,
                };
            }
        };

        let (status, engaged) = self.visit_on(page.as_ref(), topic).await;

        // Pacing between topics; also lets slow reaction updates land
        // before the page goes away.
        tokio::time::sleep(self.settle).await;

        if let Err(err) = page.close().await {
            warn!(target = "lurker.visit", title = %topic.title, error = %err, "page close failed");
        }

        VisitOutcome { topic: topic.clone(), engaged, status }
    }

    async fn visit_on(&self, page: &dyn PageSurface, topic: &TopicReference) -> (VisitStatus, bool) {
        match self.try_visit(page, topic).await {
            Ok(engaged) => (VisitStatus::Visited, engaged),
            Err(err) if err.is_timeout() => {
                warn!(target = "lurker.visit", title = %topic.title, "navigation timed out, skipping");
                (VisitStatus::TimedOut, false)
            }
            Err(err) => {
                error!(target = "lurker.visit", title = %topic.title, error = %err, "visit failed");
                (VisitStatus::Failed, false)
            }
        }
    }

    async fn try_visit(&self, page: &dyn PageSurface, topic: &TopicReference) -> SurfaceResult<bool> {
        // Hard bound on navigation even if the driver itself stalls.
        match tokio::time::timeout(self.nav_timeout, page.navigate(&topic.url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SurfaceError::timeout(
                    topic.url.as_str(),
                    self.nav_timeout.as_millis() as u64,
                ));
            }
        }
        tokio::time::sleep(self.settle).await;

        if !self.policy.should_engage() {
            debug!(target = "lurker.visit", title = %topic.title, "engagement gate closed");
            return Ok(false);
        }

        Ok(self.policy.attempt_engage(page).await == EngageOutcome::Liked)
    }
}
