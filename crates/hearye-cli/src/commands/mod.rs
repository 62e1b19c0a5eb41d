//! CLI command implementations.

mod auth;
mod content;
mod district;
mod personal;


pub use auth::{delete_account, launch, login, logout, refresh, status, token_get};
pub use content::{register_district, request, topic, topics, vote};
pub use personal::{contributions, profile};

use crate::output::OutputFormat;
use anyhow::{Context as _, Result};
use hearye_api::ApiClient;
use hearye_auth::{
    http_client_with_timeout, Alerter, Modal, NavigationRoot, Navigator, SessionEndpoints,
    SessionManager, TokenStore,
};
use hearye_config_and_utils::{Config, Paths};
use hearye_storage::{FileStore, Storage};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs.
pub struct Context {
    pub config: Config,
    pub paths: Paths,
    pub session: Arc<SessionManager>,
    pub client: ApiClient,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(config: Config, paths: Paths, format: OutputFormat) -> Result<Self> {
        paths.ensure_dirs()?;

        let fast = FileStore::open(paths.storage_file())
            .with_context(|| format!("opening {}", paths.storage_file().display()))?;
        let secure = FileStore::open(paths.secrets_file())
            .with_context(|| format!("opening {}", paths.secrets_file().display()))?;
        let tokens = TokenStore::new(Storage::new(Arc::new(fast)), Arc::new(secure));

        let endpoints = SessionEndpoints::from_config(&config)?;
        let http_client = http_client_with_timeout(config.request_timeout());

        let session = SessionManager::new(
            tokens,
            endpoints,
            Arc::new(TerminalNavigator { format }),
            Arc::new(TerminalAlerter { format }),
        )
        .with_http_client(http_client);

        Ok(Self::with_session(config, paths, format, session))
    }

    /// Wrap an already configured session.
    pub fn with_session(
        config: Config,
        paths: Paths,
        format: OutputFormat,
        session: SessionManager,
    ) -> Self {
        session.set_state_callback(Box::new(|state| {
            debug!(state = %state, "Session state changed");
        }));

        let session = Arc::new(session);
        let client = ApiClient::new(session.clone());

        Self {
            config,
            paths,
            session,
            client,
            format,
        }
    }

    /// Fast key-value store shared with the session.
    pub fn storage(&self) -> &Storage {
        self.session.tokens().fast()
    }
}

/// Navigation for a terminal: there are no screens, so the destination is
/// reported as a hint.
struct TerminalNavigator {
    format: OutputFormat,
}

impl Navigator for TerminalNavigator {
    fn set_root(&self, root: NavigationRoot) {
        debug!(root = ?root, "Navigation root changed");
        if let OutputFormat::Text = self.format {
            match root {
                NavigationRoot::Login => {
                    println!("Signed out. Run 'hearye login' to sign in again.")
                }
                NavigationRoot::Dashboard => println!("Signed in."),
            }
        }
    }

    fn show_modal(&self, modal: Modal) {
        debug!(modal = ?modal, "Modal requested");
        if let (OutputFormat::Text, Modal::SelectDistrict) = (self.format, modal) {
            println!("Your district is not set. Run 'hearye register-district <STATE-NN>'.");
        }
    }

    fn dismiss_modal(&self, modal: Modal) {
        debug!(modal = ?modal, "Modal dismissed");
    }
}

struct TerminalAlerter {
    format: OutputFormat,
}

impl Alerter for TerminalAlerter {
    fn alert(&self, title: &str, message: &str) {
        crate::output::print_error(&format!("{}: {}", title, message), &self.format);
    }
}
