//! Probabilistic engagement gate and the like action itself.

use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::surface::PageSurface;

/// Reaction control on a topic page.
pub const LIKE_CONTROL: &str = ".discourse-reactions-reaction-button button";

const LIKE_WAIT: Duration = Duration::from_secs(2);

/// How one engagement attempt concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngageOutcome {
    /// The control was found and clicked.
    Liked,
    /// The control never appeared within the bounded wait. The visit
    /// still counts; the topic simply goes un-liked.
    ControlNotFound,
    /// The driver failed mid-attempt. Non-fatal.
    Failed,
}

/// Per-topic Bernoulli gate over the like action.
///
/// Each call to [`should_engage`](Self::should_engage) draws a fresh,
/// independent trial; trials are uncorrelated across topics.
#[derive(Debug, Clone)]
pub struct EngagementPolicy {
    probability: f64,
}

impl EngagementPolicy {
    /// `probability` must already be validated into `[0, 1]` by the
    /// configuration layer.
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Draws one independent trial.
    pub fn should_engage(&self) -> bool {
        rand::rng().random_bool(self.probability)
    }

    /// Waits briefly for the like control and clicks it when present.
    pub async fn attempt_engage(&self, page: &dyn PageSurface) -> EngageOutcome {
        match page.wait_for(LIKE_CONTROL, LIKE_WAIT).await {
            Ok(()) => match page.click(LIKE_CONTROL).await {
                Ok(()) => {
                    info!(target = "lurker.policy", "topic liked");
                    EngageOutcome::Liked
                }
                Err(err) => {
                    warn!(target = "lurker.policy", error = %err, "like click failed");
                    EngageOutcome::Failed
                }
            },
            Err(err) if err.is_timeout() => {
                warn!(
                    target = "lurker.policy",
                    wait_ms = LIKE_WAIT.as_millis() as u64,
                    "like control not found"
                );
                EngageOutcome::ControlNotFound
            }
            Err(err) => {
                warn!(target = "lurker.policy", error = %err, "like attempt failed");
                EngageOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::fake::FakeBrowser;

    #[test]
    fn zero_probability_never_engages() {
        let policy = EngagementPolicy::new(0.0);
        assert!((0..1000).all(|_| !policy.should_engage()));
    }

    #[test]
    fn certain_probability_always_engages() {
        let policy = EngagementPolicy::new(1.0);
        assert!((0..1000).all(|_| policy.should_engage()));
    }

    #[tokio::test]
    async fn attempt_clicks_the_control_when_present() {
        let browser = FakeBrowser::builder().present(LIKE_CONTROL).build();
        let page = browser.primary_page();

        let outcome = EngagementPolicy::new(1.0).attempt_engage(page.as_ref()).await;
        assert_eq!(outcome, EngageOutcome::Liked);
        assert_eq!(browser.clicks(), [LIKE_CONTROL]);
    }

    #[tokio::test]
    async fn missing_control_is_not_found_not_failed() {
        let browser = FakeBrowser::builder().build();
        let page = browser.primary_page();

        let outcome = EngagementPolicy::new(1.0).attempt_engage(page.as_ref()).await;
        assert_eq!(outcome, EngageOutcome::ControlNotFound);
        assert!(browser.clicks().is_empty());
    }

    #[tokio::test]
    async fn driver_fault_during_click_is_failed() {
        let browser = FakeBrowser::builder()
            .present(LIKE_CONTROL)
            .broken(LIKE_CONTROL)
            .build();
        let page = browser.primary_page();

        let outcome = EngagementPolicy::new(1.0).attempt_engage(page.as_ref()).await;
        assert_eq!(outcome, EngageOutcome::Failed);
    }
}
