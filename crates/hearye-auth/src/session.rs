//! Session management with FSM-based state tracking.
//!
//! `SessionManager` owns the credential lifecycle: it exchanges the stored
//! refresh token for a fresh one, trades identity provider tokens for a
//! backend session, and tears everything down on logout. Stored tokens are
//! the durable truth; the FSM only tracks what is happening in-process.

use crate::collaborators::{Alerter, NavigationRoot, Navigator};
use crate::session_fsm::{SessionMachine, SessionMachineInput, SessionState};
use crate::tokens::{TokenKind, TokenStore};
use crate::{AuthError, AuthResult};
use hearye_config_and_utils::{Config, CoreResult, DEFAULT_REQUEST_TIMEOUT_SECS};
use parking_lot::Mutex;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const REFRESH_PATH: &str = "users/v1/token/refresh/";
const OBTAIN_PATH: &str = "users/v1/token/obtain/";

const LOGOUT_FAILED_TITLE: &str = "Logout failed";
const LOGOUT_FAILED_MESSAGE: &str = "We could not log you out completely. Please try again later.";

/// Backend refresh request.
#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// Backend refresh response. Some deployments also rotate the access token.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    refresh: String,
    #[serde(default)]
    access: Option<String>,
}

/// Identity token exchange request.
#[derive(Debug, Serialize)]
struct ObtainRequest<'a> {
    access_token: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ObtainResponse {
    access_token: String,
    refresh_token: String,
    #[serde(flatten)]
    profile: UserProfile,
}

/// OAuth token revocation form.
#[derive(Debug, Serialize)]
struct RevokeRequest<'a> {
    token: &'a str,
    token_type_hint: &'a str,
    client_id: &'a str,
}

/// Profile returned by the identity exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub district: Option<i64>,
    /// Remaining profile fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Outcome of [`SessionManager::authenticate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    /// Neither refresh nor identity exchange produced a session.
    Failed,
    /// The stored refresh token was accepted; no profile was fetched.
    SessionValid,
    /// A full identity exchange completed.
    Established(Box<UserProfile>),
}

impl Authentication {
    pub fn succeeded(&self) -> bool {
        !matches!(self, Authentication::Failed)
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Authentication::Established(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Endpoints the session manager talks to.
#[derive(Debug, Clone)]
pub struct SessionEndpoints {
    /// Backend base, ending in `/api/`.
    pub api_base_url: Url,
    /// Identity provider token revocation endpoint.
    pub revocation_url: Url,
    /// OAuth client id for revocation. Empty disables revocation.
    pub client_id: String,
}

impl SessionEndpoints {
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        Ok(Self {
            api_base_url: config.api_base_url()?,
            revocation_url: config.identity_revocation_url()?,
            client_id: config.identity_client_id.clone(),
        })
    }
}

/// Callback type for session state change notifications.
pub type SessionStateCallback = Box<dyn Fn(SessionState) + Send + Sync>;

/// Session manager with FSM-based state tracking.
pub struct SessionManager {
    tokens: TokenStore,
    endpoints: SessionEndpoints,
    http_client: Client,
    navigator: Arc<dyn Navigator>,
    alerter: Arc<dyn Alerter>,
    fsm: Mutex<SessionMachine>,
    state_callback: Mutex<Option<SessionStateCallback>>,
}

/// HTTP client that gives up on requests after `timeout`.
pub fn http_client_with_timeout(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!(error = %e, "Could not build HTTP client; falling back to defaults");
        Client::new()
    })
}

impl SessionManager {
    pub fn new(
        tokens: TokenStore,
        endpoints: SessionEndpoints,
        navigator: Arc<dyn Navigator>,
        alerter: Arc<dyn Alerter>,
    ) -> Self {
        Self {
            tokens,
            endpoints,
            http_client: http_client_with_timeout(Duration::from_secs(
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            navigator,
            alerter,
            fsm: Mutex::new(SessionMachine::new()),
            state_callback: Mutex::new(None),
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn set_state_callback(&self, callback: SessionStateCallback) {
        *self.state_callback.lock() = Some(callback);
    }

    pub fn state(&self) -> SessionState {
        SessionState::from(self.fsm.lock().state())
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn api_base_url(&self) -> &Url {
        &self.endpoints.api_base_url
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn alerter(&self) -> &Arc<dyn Alerter> {
        &self.alerter
    }

    /// Stored token of the named kind (`access`, `refresh`,
    /// `external_access`, `external_refresh`).
    pub fn get_token(&self, kind: &str) -> AuthResult<Option<String>> {
        self.tokens.get_token(kind)
    }

    pub fn set_token(&self, kind: &str, value: &str) -> AuthResult<()> {
        self.tokens.set_token(kind, value)
    }

    /// Transition the FSM and notify the callback if the state changed.
    fn transition(&self, input: &SessionMachineInput) -> AuthResult<SessionState> {
        let mut fsm = self.fsm.lock();
        let old_state = SessionState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = SessionState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = ?old_state,
                new_state = ?new_state,
                "Session state transition"
            );
            if let Some(callback) = self.state_callback.lock().as_ref() {
                callback(new_state);
            }
        }

        Ok(new_state)
    }

    /// Exchange the stored refresh token for a new one.
    ///
    /// Returns `false` on any failure; the stored tokens are only replaced
    /// after a 2xx response decodes.
    pub async fn refresh_session(&self) -> bool {
        match self.try_refresh().await {
            Ok(()) => {
                info!("Session refreshed");
                true
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed");
                false
            }
        }
    }

    async fn try_refresh(&self) -> AuthResult<()> {
        let refresh_token = self
            .tokens
            .get(TokenKind::Refresh)?
            .ok_or(AuthError::MissingCredential("refresh token"))?;

        let url = self.endpoints.api_base_url.join(REFRESH_PATH)?;
        debug!(url = %url, "Refreshing session");

        let response = self
            .http_client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&RefreshRequest {
                refresh: &refresh_token,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                operation: "token refresh",
                status: status.as_u16(),
            });
        }

        let data: RefreshResponse = response.json().await?;
        self.tokens.set(TokenKind::Refresh, &data.refresh)?;
        if let Some(access) = data.access {
            self.tokens.set(TokenKind::Access, &access)?;
        }
        Ok(())
    }

    /// Establish a session.
    ///
    /// Refreshes first. If that fails, or `force_identity_exchange` is set,
    /// the identity provider tokens are exchanged for a new backend session
    /// and the user's profile. Never returns an error; failures become
    /// [`Authentication::Failed`].
    pub async fn authenticate(&self, force_identity_exchange: bool) -> Authentication {
        let _ = self.transition(&SessionMachineInput::Authenticate);

        let refreshed = self.refresh_session().await;

        let outcome = if !refreshed || force_identity_exchange {
            match self.exchange_identity_tokens().await {
                Ok(profile) => {
                    info!(user_id = profile.id, "Identity exchange succeeded");
                    Authentication::Established(Box::new(profile))
                }
                Err(e) => {
                    warn!(error = %e, "Identity exchange failed");
                    Authentication::Failed
                }
            }
        } else {
            Authentication::SessionValid
        };

        let input = if outcome.succeeded() {
            SessionMachineInput::AuthenticateSucceeded
        } else {
            SessionMachineInput::AuthenticateFailed
        };
        let _ = self.transition(&input);

        outcome
    }

    async fn exchange_identity_tokens(&self) -> AuthResult<UserProfile> {
        let identity_access = self
            .tokens
            .get(TokenKind::IdentityAccess)?
            .ok_or(AuthError::MissingCredential("identity access token"))?;
        let identity_refresh = self
            .tokens
            .get(TokenKind::IdentityRefresh)?
            .ok_or(AuthError::MissingCredential("identity refresh token"))?;

        let url = self.endpoints.api_base_url.join(OBTAIN_PATH)?;
        debug!(url = %url, "Exchanging identity tokens");

        let response = self
            .http_client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&ObtainRequest {
                access_token: &identity_access,
                refresh_token: &identity_refresh,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                operation: "identity exchange",
                status: status.as_u16(),
            });
        }

        let data: ObtainResponse = response.json().await?;
        self.tokens.set(TokenKind::Access, &data.access_token)?;
        self.tokens.set(TokenKind::Refresh, &data.refresh_token)?;
        Ok(data.profile)
    }

    /// Log out.
    ///
    /// Local credentials are cleared before the identity provider is asked to
    /// revoke its tokens, so a failed revocation never leaves a usable
    /// session behind. Returns `false` (after alerting) if clearing or
    /// revocation failed.
    pub async fn logout(&self) -> bool {
        let _ = self.transition(&SessionMachineInput::LogoutRequested);

        // Captured before clearing; revocation needs them.
        let identity_access = self.tokens.get(TokenKind::IdentityAccess);
        let identity_refresh = self.tokens.get(TokenKind::IdentityRefresh);

        let cleared = match self.tokens.clear() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to clear local credentials");
                false
            }
        };

        let revoked = match (identity_access, identity_refresh) {
            (Ok(access), Ok(refresh)) => {
                self.revoke_identity_tokens(access.as_deref(), refresh.as_deref())
                    .await
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Could not read identity tokens for revocation");
                false
            }
        };

        if cleared {
            self.navigator.set_root(NavigationRoot::Login);
        }
        let _ = self.transition(&SessionMachineInput::LogoutComplete);

        let ok = cleared && revoked;
        if ok {
            info!("Logged out");
        } else {
            self.alerter.alert(LOGOUT_FAILED_TITLE, LOGOUT_FAILED_MESSAGE);
        }
        ok
    }

    /// Revoke both identity tokens concurrently. Absent tokens count as
    /// revoked.
    async fn revoke_identity_tokens(&self, access: Option<&str>, refresh: Option<&str>) -> bool {
        if access.is_none() && refresh.is_none() {
            return true;
        }
        if self.endpoints.client_id.is_empty() {
            warn!("No identity client id configured; skipping token revocation");
            return true;
        }

        let (access_result, refresh_result) = tokio::join!(
            self.revoke_token(access, "access_token"),
            self.revoke_token(refresh, "refresh_token"),
        );

        let mut ok = true;
        for (hint, result) in [("access_token", access_result), ("refresh_token", refresh_result)] {
            if let Err(e) = result {
                warn!(token_type_hint = hint, error = %e, "Token revocation failed");
                ok = false;
            }
        }
        ok
    }

    async fn revoke_token(&self, token: Option<&str>, token_type_hint: &str) -> AuthResult<()> {
        let Some(token) = token else {
            return Ok(());
        };

        let response = self
            .http_client
            .post(self.endpoints.revocation_url.clone())
            .form(&RevokeRequest {
                token,
                token_type_hint,
                client_id: &self.endpoints.client_id,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                operation: "token revocation",
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("endpoints", &self.endpoints)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
