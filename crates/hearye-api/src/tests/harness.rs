//! Test harness: a wiremock backend plus a session wired to in-memory
//! storage and recording collaborators.

use crate::ApiClient;
use hearye_auth::{
    Alerter, Modal, NavigationRoot, Navigator, SessionEndpoints, SessionManager, TokenStore,
};
use hearye_storage::{MemoryStorage, Storage};
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
pub struct RecordingNavigator {
    pub roots: Mutex<Vec<NavigationRoot>>,
}

impl Navigator for RecordingNavigator {
    fn set_root(&self, root: NavigationRoot) {
        self.roots.lock().push(root);
    }
    fn show_modal(&self, _modal: Modal) {}
    fn dismiss_modal(&self, _modal: Modal) {}
}

#[derive(Default)]
pub struct RecordingAlerter {
    pub alerts: Mutex<Vec<String>>,
}

impl Alerter for RecordingAlerter {
    fn alert(&self, title: &str, _message: &str) {
        self.alerts.lock().push(title.to_string());
    }
}

pub struct TestHarness {
    pub server: MockServer,
    pub client: ApiClient,
    pub navigator: Arc<RecordingNavigator>,
    pub alerter: Arc<RecordingAlerter>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_http_client(Client::new()).await
    }

    pub async fn with_http_client(http_client: Client) -> Self {
        let server = MockServer::start().await;
        let endpoints = SessionEndpoints {
            api_base_url: Url::parse(&format!("{}/api/", server.uri())).unwrap(),
            revocation_url: Url::parse(&format!("{}/oauth/v1/revoke_token/", server.uri()))
                .unwrap(),
            client_id: "test-client".to_string(),
        };
        let tokens = TokenStore::new(
            Storage::new(Arc::new(MemoryStorage::new())),
            Arc::new(MemoryStorage::new()),
        );
        let navigator = Arc::new(RecordingNavigator::default());
        let alerter = Arc::new(RecordingAlerter::default());
        let session = SessionManager::new(tokens, endpoints, navigator.clone(), alerter.clone())
            .with_http_client(http_client);
        let client = ApiClient::new(Arc::new(session));

        Self {
            server,
            client,
            navigator,
            alerter,
        }
    }

    /// A logged-in session with backend and identity tokens.
    pub async fn logged_in() -> Self {
        let harness = Self::new().await;
        let session = harness.client.session();
        session.set_token("access", "access-1").unwrap();
        session.set_token("refresh", "refresh-1").unwrap();
        session.set_token("velnota_access", "id-access").unwrap();
        session.set_token("velnota_refresh", "id-refresh").unwrap();
        harness
    }

    pub fn token(&self, kind: &str) -> Option<String> {
        self.client.session().get_token(kind).unwrap()
    }

    /// Refresh endpoint answering `status`, rotating the access token on
    /// success.
    pub async fn mount_refresh(&self, status: u16, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/users/v1/token/refresh/"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "refresh": "refresh-2",
                "access": "access-2"
            })))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_obtain_rejected(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/users/v1/token/obtain/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_revocation(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/oauth/v1/revoke_token/"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the backend saw for `request_path`.
    pub async fn calls_to(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}
