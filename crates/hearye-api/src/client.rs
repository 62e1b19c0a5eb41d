//! Authenticated request pipeline.

use crate::{RequestError, RequestResult};
use hearye_auth::{SessionManager, TokenKind};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized as JSON.
    Json(serde_json::Value),
    /// Sent as-is.
    Text(String),
}

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Attach the stored access token.
    pub authenticated: bool,
    /// Merged over the default headers; these win.
    pub headers: HeaderMap,
    pub body: Option<Body>,
    /// Answer a 401 by re-authenticating once and retrying. When off, the
    /// 401 is returned as [`RequestError::Api`] and the session is left alone.
    pub reauthenticate: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            authenticated: true,
            headers: HeaderMap::new(),
            body: None,
            reauthenticate: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not attach the stored access token.
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Report a 401 to the caller instead of re-authenticating.
    pub fn without_reauthentication(mut self) -> Self {
        self.reauthenticate = false;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Send an explicit bearer token instead of the stored one.
    pub fn bearer(self, token: &str) -> RequestResult<Self> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        Ok(self.header(AUTHORIZATION, value))
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> RequestResult<Self> {
        self.body = Some(Body::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Text(body.into()));
        self
    }
}

/// Statuses handed back to the caller untouched.
fn is_ok_status(status: StatusCode) -> bool {
    (200..=302).contains(&status.as_u16())
}

/// Client for the Hear Ye backend.
#[derive(Clone)]
pub struct ApiClient {
    session: Arc<SessionManager>,
    http_client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Shares the session's HTTP client and base URL.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            http_client: session.http_client().clone(),
            base_url: session.api_base_url().clone(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Absolute URLs pass through; anything else is relative to the API base.
    pub fn resolve_url(&self, path: &str) -> RequestResult<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        let relative = path.strip_prefix('/').unwrap_or(path);
        Ok(self.base_url.join(relative)?)
    }

    /// Perform a request.
    ///
    /// Statuses 200 through 302 return the raw response. A 401 triggers one
    /// silent re-authentication and one retry; if re-authentication fails or
    /// the retry is also rejected, the user is logged out and
    /// [`RequestError::SessionEnded`] is returned. Other statuses, and a 401
    /// when [`RequestOptions::reauthenticate`] is off, map to
    /// [`RequestError::Api`].
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        options: RequestOptions,
    ) -> RequestResult<Response> {
        let url = self.resolve_url(path)?;
        let mut retried = false;

        loop {
            let response = self.send(&url, &method, &options).await?;
            let status = response.status();

            if is_ok_status(status) {
                return Ok(response);
            }

            if status != StatusCode::UNAUTHORIZED || !options.reauthenticate {
                warn!(status = %status, method = %method, path = %path, "Request failed");
                return Err(RequestError::from_response(response).await);
            }

            if !retried {
                debug!(path = %path, "Access rejected, re-authenticating");
                if self.session.authenticate(false).await.succeeded() {
                    retried = true;
                    continue;
                }
            } else {
                warn!(path = %path, "Access rejected after re-authentication");
            }

            info!("Ending session after rejected credentials");
            self.session.logout().await;
            return Err(RequestError::SessionEnded);
        }
    }

    async fn send(
        &self,
        url: &Url,
        method: &Method,
        options: &RequestOptions,
    ) -> RequestResult<Response> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Looked up per attempt so a retry picks up a refreshed token.
        if options.authenticated {
            match self.session.tokens().get(TokenKind::Access)? {
                Some(token) => {
                    headers.insert(
                        AUTHORIZATION,
                        HeaderValue::from_str(&format!("Bearer {}", token))?,
                    );
                }
                None => debug!("No access token stored; sending without Authorization"),
            }
        }

        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self
            .http_client
            .request(method.clone(), url.clone())
            .headers(headers);

        builder = match &options.body {
            Some(Body::Json(value)) => builder.body(serde_json::to_vec(value)?),
            Some(Body::Text(text)) => builder.body(text.clone()),
            None => builder,
        };

        debug!(method = %method, url = %url, "Sending request");
        Ok(builder.send().await?)
    }

    pub async fn get(&self, path: &str) -> RequestResult<Response> {
        self.request(path, Method::GET, RequestOptions::new()).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> RequestResult<Response> {
        self.request(path, Method::POST, RequestOptions::new().json(body)?)
            .await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
