//! Account deletion.

use crate::{ApiClient, RequestOptions, RequestResult};
use hearye_auth::TokenKind;
use reqwest::Method;
use tracing::{info, warn};

const DELETE_ACCOUNT_PATH: &str = "users/delete-account/";

const DELETE_FAILED_TITLE: &str = "Account deletion failed";
const DELETE_FAILED_MESSAGE: &str =
    "You have been logged out, but we could not delete your account. Please try again later.";

impl ApiClient {
    /// Log out, then ask the backend to delete the account.
    ///
    /// The access token is captured before logout clears it and is sent
    /// explicitly. Deletion only happens after a successful logout; a failed
    /// deletion is alerted but leaves the completed logout in place.
    /// Returns whether the account was deleted.
    pub async fn delete_account(&self) -> bool {
        let access_token = match self.session().tokens().get(TokenKind::Access) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read access token before account deletion");
                None
            }
        };

        if !self.session().logout().await {
            warn!("Logout failed; account deletion not attempted");
            return false;
        }

        let Some(access_token) = access_token else {
            warn!("No access token captured; cannot delete account");
            self.session()
                .alerter()
                .alert(DELETE_FAILED_TITLE, DELETE_FAILED_MESSAGE);
            return false;
        };

        match self.send_delete_account(&access_token).await {
            Ok(()) => {
                info!("Account deleted");
                true
            }
            Err(e) => {
                warn!(error = %e, "Account deletion failed");
                self.session()
                    .alerter()
                    .alert(DELETE_FAILED_TITLE, DELETE_FAILED_MESSAGE);
                false
            }
        }
    }

    async fn send_delete_account(&self, access_token: &str) -> RequestResult<()> {
        // The session is already over; a 401 here is a failed deletion.
        let options = RequestOptions::new()
            .anonymous()
            .without_reauthentication()
            .bearer(access_token)?;
        self.request(DELETE_ACCOUNT_PATH, Method::POST, options)
            .await?;
        Ok(())
    }
}
