//! Request error taxonomy.

use hearye_auth::AuthError;
use reqwest::header::InvalidHeaderValue;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Classification of a non-success response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApiErrorKind {
    BadRequest,
    Forbidden,
    NotFound,
    Server,
    /// Any other non-success status.
    Api,
}

impl ApiErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => ApiErrorKind::BadRequest,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            s if s >= 500 => ApiErrorKind::Server,
            _ => ApiErrorKind::Api,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApiErrorKind::BadRequest => "Bad request",
            ApiErrorKind::Forbidden => "Forbidden",
            ApiErrorKind::NotFound => "Not found",
            ApiErrorKind::Server => "Server error",
            ApiErrorKind::Api => "API error",
        };
        f.write_str(label)
    }
}

/// The response that caused an [`RequestError::Api`], read to completion.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    pub async fn capture(response: Response) -> Self {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await.unwrap_or_default();
        Self {
            status,
            url,
            headers,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Request pipeline error type.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The backend answered with a non-success status
    #[error("{kind}: HTTP {}", .response.status)]
    Api {
        kind: ApiErrorKind,
        response: Box<ApiResponse>,
    },

    /// The backend rejected the session and re-authentication failed; the
    /// user has been logged out
    #[error("Session ended")]
    SessionEnded,

    /// No response within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Request body could not be serialized
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Path could not be resolved against the base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Header value contains characters HTTP does not allow
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    /// Token lookup failed
    #[error("Session error: {0}")]
    Auth(#[from] AuthError),
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RequestError::Timeout
        } else {
            RequestError::Network(e)
        }
    }
}

impl RequestError {
    pub(crate) async fn from_response(response: Response) -> Self {
        let kind = ApiErrorKind::from_status(response.status());
        RequestError::Api {
            kind,
            response: Box::new(ApiResponse::capture(response).await),
        }
    }

    /// Taxonomy kind, if the backend answered.
    pub fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            RequestError::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            RequestError::Api { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Result type alias using RequestError.
pub type RequestResult<T> = Result<T, RequestError>;
