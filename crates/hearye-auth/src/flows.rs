//! App-level flows built on the session manager.

use crate::collaborators::{Modal, NavigationRoot};
use crate::session::{Authentication, SessionManager};
use crate::tasks::{derive_outstanding_tasks, OutstandingTask};
use crate::tokens::TokenKind;
use crate::AuthResult;
use tracing::info;

const LOGIN_FAILED_TITLE: &str = "Error";
const LOGIN_FAILED_MESSAGE: &str = "Failed to login";

impl SessionManager {
    /// Startup: re-establish the session with a full identity exchange and
    /// route the user accordingly.
    pub async fn on_app_launched(&self) -> Authentication {
        let outcome = self.authenticate(true).await;

        let root = if outcome.succeeded() {
            NavigationRoot::Dashboard
        } else {
            NavigationRoot::Login
        };
        self.navigator().set_root(root);

        if derive_outstanding_tasks(&outcome).contains(OutstandingTask::SelectDistrict) {
            info!("District selection outstanding");
            self.navigator().show_modal(Modal::SelectDistrict);
        }

        outcome
    }

    /// Store tokens handed back by the identity provider and sign in with
    /// them.
    pub async fn login_with_identity(
        &self,
        identity_access: &str,
        identity_refresh: &str,
    ) -> AuthResult<Authentication> {
        self.tokens().set(TokenKind::IdentityAccess, identity_access)?;
        self.tokens().set(TokenKind::IdentityRefresh, identity_refresh)?;

        let outcome = self.authenticate(false).await;
        if outcome.succeeded() {
            self.navigator().set_root(NavigationRoot::Dashboard);
        } else {
            self.alerter().alert(LOGIN_FAILED_TITLE, LOGIN_FAILED_MESSAGE);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::collaborators::{Modal, NavigationRoot};
    use crate::session::tests::{harness, mount_obtain, mount_refresh, seed_tokens};
    use serde_json::json;

    #[tokio::test]
    async fn test_launch_with_session_and_district() {
        let h = harness().await;
        seed_tokens(&h.manager);
        mount_refresh(&h.server, 200, 1).await;
        mount_obtain(&h.server, json!(3), 1).await;

        assert!(h.manager.on_app_launched().await.succeeded());
        assert_eq!(*h.navigator.roots.lock(), vec![NavigationRoot::Dashboard]);
        assert!(h.navigator.modals.lock().is_empty());
    }

    #[tokio::test]
    async fn test_launch_without_district_shows_selection() {
        let h = harness().await;
        seed_tokens(&h.manager);
        mount_refresh(&h.server, 200, 1).await;
        mount_obtain(&h.server, json!(null), 1).await;

        h.manager.on_app_launched().await;
        assert_eq!(*h.navigator.roots.lock(), vec![NavigationRoot::Dashboard]);
        assert_eq!(*h.navigator.modals.lock(), vec![Modal::SelectDistrict]);
    }

    #[tokio::test]
    async fn test_launch_logged_out_goes_to_login() {
        let h = harness().await;
        mount_refresh(&h.server, 200, 0).await;

        assert!(!h.manager.on_app_launched().await.succeeded());
        assert_eq!(*h.navigator.roots.lock(), vec![NavigationRoot::Login]);
    }

    #[tokio::test]
    async fn test_login_with_identity_success() {
        let h = harness().await;
        mount_obtain(&h.server, json!(5), 1).await;

        let outcome = h
            .manager
            .login_with_identity("id-access", "id-refresh")
            .await
            .unwrap();

        assert_eq!(outcome.profile().map(|p| p.district), Some(Some(5)));
        assert_eq!(
            h.manager.get_token("access").unwrap(),
            Some("minted-access".to_string())
        );
        assert_eq!(*h.navigator.roots.lock(), vec![NavigationRoot::Dashboard]);
        assert!(h.alerter.alerts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_login_with_identity_failure_alerts() {
        let h = harness().await;
        // No obtain mock mounted: wiremock answers 404.

        let outcome = h
            .manager
            .login_with_identity("id-access", "id-refresh")
            .await
            .unwrap();

        assert!(!outcome.succeeded());
        assert!(h.navigator.roots.lock().is_empty());
        assert_eq!(
            *h.alerter.alerts.lock(),
            vec![("Error".to_string(), "Failed to login".to_string())]
        );
    }
}
