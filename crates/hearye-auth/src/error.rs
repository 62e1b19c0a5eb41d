//! Session error types.

use thiserror::Error;

/// Session error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token kind string not recognised
    #[error("Invalid token type: {0}")]
    InvalidTokenKind(String),

    /// A credential required for the operation is not stored
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Backend or identity provider answered with a non-success status
    #[error("{operation} rejected with HTTP {status}")]
    Rejected { operation: &'static str, status: u16 },

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] hearye_storage::StorageError),

    /// HTTP request error (network, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_includes_status() {
        let err = AuthError::Rejected {
            operation: "token refresh",
            status: 401,
        };
        assert_eq!(err.to_string(), "token refresh rejected with HTTP 401");
    }

    #[test]
    fn test_invalid_token_kind_message() {
        let err = AuthError::InvalidTokenKind("bogus".to_string());
        assert_eq!(err.to_string(), "Invalid token type: bogus");
    }
}
