//! Login orchestration for the authenticated session.

use std::time::Duration;

use tracing::{error, info};

use crate::error::SurfaceResult;
use crate::model::Credentials;
use crate::surface::PageSurface;

/// Header control that opens the login form.
pub const LOGIN_BUTTON: &str = ".login-button .d-button-label";
/// Identifier field of the login form.
pub const USERNAME_FIELD: &str = "#login-account-name";
/// Secret field of the login form.
pub const PASSWORD_FIELD: &str = "#login-account-password";
/// Submit control of the login form.
pub const SUBMIT_BUTTON: &str = "#login-button";
/// Present only while a user session is active.
pub const SESSION_MARKER: &str = "#current-user";

const FORM_TIMEOUT: Duration = Duration::from_secs(5);
const MARKER_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives the fixed login sequence on the primary page.
///
/// Authentication is a precondition for the whole run, not a per-item
/// step: it is attempted once and never retried.
pub struct SessionManager {
    settle: Duration,
}

impl SessionManager {
    /// `settle` is the pacing delay between form interactions, for page
    /// scripts that react to input asynchronously.
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    /// Attempts to authenticate.
    ///
    /// Returns true iff the post-login marker is present after
    /// submission. Every failure mode — an element that never becomes
    /// ready, a driver fault, an absent marker — collapses to false; the
    /// caller aborts the run on false rather than on an error.
    pub async fn login(&self, page: &dyn PageSurface, credentials: &Credentials) -> bool {
        match self.try_login(page, credentials).await {
            Ok(authenticated) => authenticated,
            Err(err) if err.is_timeout() => {
                error!(target = "lurker.session", error = %err, "login failed: element never became ready");
                false
            }
            Err(err) => {
                error!(target = "lurker.session", error = %err, "login failed");
                false
            }
        }
    }

    async fn try_login(
        &self,
        page: &dyn PageSurface,
        credentials: &Credentials,
    ) -> SurfaceResult<bool> {
        info!(target = "lurker.session", username = %credentials.username, "attempting login");

        page.click(LOGIN_BUTTON).await?;
        page.wait_for(USERNAME_FIELD, FORM_TIMEOUT).await?;
        page.fill(USERNAME_FIELD, &credentials.username).await?;
        tokio::time::sleep(self.settle).await;
        page.fill(PASSWORD_FIELD, &credentials.password).await?;
        tokio::time::sleep(self.settle).await;
        page.click(SUBMIT_BUTTON).await?;

        match page.wait_for(SESSION_MARKER, MARKER_TIMEOUT).await {
            Ok(()) => {
                info!(target = "lurker.session", "login succeeded");
                Ok(true)
            }
            Err(err) if err.is_timeout() => {
                error!(target = "lurker.session", "login failed: session marker absent after submit");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::fake::FakeBrowser;

    fn credentials() -> Credentials {
        Credentials { username: "alice".to_string(), password: "hunter2".to_string() }
    }

    fn session() -> SessionManager {
        SessionManager::new(Duration::ZERO)
    }

    #[tokio::test]
    async fn login_succeeds_when_marker_appears() {
        let browser = FakeBrowser::builder()
            .present(USERNAME_FIELD)
            .present(SESSION_MARKER)
            .build();
        let page = browser.primary_page();

        assert!(session().login(page.as_ref(), &credentials()).await);
        assert_eq!(
            browser.fills(),
            [
                (USERNAME_FIELD.to_string(), "alice".to_string()),
                (PASSWORD_FIELD.to_string(), "hunter2".to_string()),
            ]
        );
        assert_eq!(browser.clicks(), [LOGIN_BUTTON, SUBMIT_BUTTON]);
    }

    #[tokio::test]
    async fn login_fails_when_marker_never_appears() {
        let browser = FakeBrowser::builder().present(USERNAME_FIELD).build();
        let page = browser.primary_page();

        assert!(!session().login(page.as_ref(), &credentials()).await);
    }

    #[tokio::test]
    async fn login_fails_when_form_never_becomes_ready() {
        let browser = FakeBrowser::builder().build();
        let page = browser.primary_page();

        assert!(!session().login(page.as_ref(), &credentials()).await);
        assert!(browser.fills().is_empty());
    }

    #[tokio::test]
    async fn login_fails_on_driver_fault_instead_of_erroring() {
        let browser = FakeBrowser::builder()
            .present(USERNAME_FIELD)
            .broken(SUBMIT_BUTTON)
            .build();
        let page = browser.primary_page();

        assert!(!session().login(page.as_ref(), &credentials()).await);
    }
}
