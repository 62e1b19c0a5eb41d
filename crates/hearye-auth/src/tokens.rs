//! Token persistence split across the fast store and the secure store.
//!
//! The short-lived backend access token lives in fast storage; the backend
//! refresh token and both identity provider tokens live in secure storage.

use crate::{AuthError, AuthResult};
use hearye_storage::{SecureStorage, Storage, StorageKeys};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// The four credentials the client persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Backend access token (fast storage).
    Access,
    /// Backend refresh token.
    Refresh,
    /// Identity provider access token.
    IdentityAccess,
    /// Identity provider refresh token.
    IdentityRefresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 4] = [
        TokenKind::Access,
        TokenKind::Refresh,
        TokenKind::IdentityAccess,
        TokenKind::IdentityRefresh,
    ];

    /// Canonical kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::IdentityAccess => "velnota_access",
            TokenKind::IdentityRefresh => "velnota_refresh",
        }
    }

    fn storage_key(&self) -> &'static str {
        match self {
            TokenKind::Access => StorageKeys::ACCESS_TOKEN,
            TokenKind::Refresh => StorageKeys::REFRESH_TOKEN,
            TokenKind::IdentityAccess => StorageKeys::IDENTITY_ACCESS_TOKEN,
            TokenKind::IdentityRefresh => StorageKeys::IDENTITY_REFRESH_TOKEN,
        }
    }

    fn is_secure(&self) -> bool {
        !matches!(self, TokenKind::Access)
    }
}

impl FromStr for TokenKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            "velnota_access" | "external_access" => Ok(TokenKind::IdentityAccess),
            "velnota_refresh" | "external_refresh" => Ok(TokenKind::IdentityRefresh),
            other => Err(AuthError::InvalidTokenKind(other.to_string())),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads and writes session credentials.
#[derive(Clone)]
pub struct TokenStore {
    fast: Storage,
    secure: Arc<dyn SecureStorage>,
}

impl TokenStore {
    pub fn new(fast: Storage, secure: Arc<dyn SecureStorage>) -> Self {
        Self { fast, secure }
    }

    /// Fast store handle, shared with callers that persist preferences.
    pub fn fast(&self) -> &Storage {
        &self.fast
    }

    pub fn get(&self, kind: TokenKind) -> AuthResult<Option<String>> {
        let key = kind.storage_key();
        let value = if kind.is_secure() {
            self.secure.get(key)?
        } else {
            self.fast.get_string(key)?
        };
        Ok(value)
    }

    pub fn set(&self, kind: TokenKind, value: &str) -> AuthResult<()> {
        let key = kind.storage_key();
        if kind.is_secure() {
            self.secure.set(key, value)?;
        } else {
            self.fast.set_string(key, value)?;
        }
        debug!(kind = %kind, "Stored token");
        Ok(())
    }

    /// Look up a token by kind name.
    pub fn get_token(&self, kind: &str) -> AuthResult<Option<String>> {
        self.get(kind.parse()?)
    }

    /// Store a token by kind name.
    pub fn set_token(&self, kind: &str, value: &str) -> AuthResult<()> {
        self.set(kind.parse()?, value)
    }

    pub fn delete(&self, kind: TokenKind) -> AuthResult<bool> {
        let key = kind.storage_key();
        let existed = if kind.is_secure() {
            self.secure.delete(key)?
        } else {
            self.fast.delete(key)?
        };
        Ok(existed)
    }

    /// Delete every stored credential.
    ///
    /// Each deletion is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub fn clear(&self) -> AuthResult<()> {
        let mut first_error = None;
        for kind in TokenKind::ALL {
            if let Err(e) = self.delete(kind) {
                warn!(kind = %kind, error = %e, "Failed to delete token");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearye_storage::{KeyValueStore, MemoryStorage, StorageError, StorageResult};

    fn stores() -> (Arc<MemoryStorage>, Arc<MemoryStorage>, TokenStore) {
        let fast = Arc::new(MemoryStorage::new());
        let secure = Arc::new(MemoryStorage::new());
        let tokens = TokenStore::new(Storage::new(fast.clone()), secure.clone());
        (fast, secure, tokens)
    }

    #[test]
    fn test_access_token_lives_in_fast_storage() {
        let (fast, secure, tokens) = stores();
        tokens.set_token("access", "a1").unwrap();

        assert_eq!(
            KeyValueStore::get_string(fast.as_ref(), StorageKeys::ACCESS_TOKEN).unwrap(),
            Some("a1".to_string())
        );
        assert!(secure.is_empty());
        assert_eq!(tokens.get_token("access").unwrap(), Some("a1".to_string()));
    }

    #[test]
    fn test_secure_kinds_live_in_secure_storage() {
        let (fast, secure, tokens) = stores();
        tokens.set_token("refresh", "r1").unwrap();
        tokens.set_token("velnota_access", "va").unwrap();
        tokens.set_token("external_refresh", "vr").unwrap();

        assert!(fast.is_empty());
        assert_eq!(secure.len(), 3);
        assert_eq!(
            SecureStorage::get(secure.as_ref(), StorageKeys::IDENTITY_REFRESH_TOKEN).unwrap(),
            Some("vr".to_string())
        );
        assert_eq!(
            tokens.get_token("external_access").unwrap(),
            Some("va".to_string())
        );
    }

    #[test]
    fn test_missing_token_is_none() {
        let (_, _, tokens) = stores();
        assert_eq!(tokens.get_token("refresh").unwrap(), None);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let (_, _, tokens) = stores();
        assert!(matches!(
            tokens.get_token("session"),
            Err(AuthError::InvalidTokenKind(kind)) if kind == "session"
        ));
        assert!(matches!(
            tokens.set_token("", "x"),
            Err(AuthError::InvalidTokenKind(_))
        ));
    }

    #[test]
    fn test_clear_removes_everything() {
        let (fast, secure, tokens) = stores();
        for kind in TokenKind::ALL {
            tokens.set(kind, "v").unwrap();
        }
        tokens.clear().unwrap();
        assert!(fast.is_empty());
        assert!(secure.is_empty());
    }

    struct FailingSecure;

    impl SecureStorage for FailingSecure {
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Backend("locked".into()))
        }
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }
        fn delete(&self, _key: &str) -> StorageResult<bool> {
            Err(StorageError::Backend("locked".into()))
        }
    }

    #[test]
    fn test_clear_keeps_going_after_failure() {
        let fast = Arc::new(MemoryStorage::new());
        let tokens = TokenStore::new(Storage::new(fast.clone()), Arc::new(FailingSecure));
        tokens.set(TokenKind::Access, "a").unwrap();

        assert!(matches!(tokens.clear(), Err(AuthError::Storage(_))));
        assert!(fast.is_empty());
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in TokenKind::ALL {
            assert_eq!(kind.as_str().parse::<TokenKind>().unwrap(), kind);
        }
    }
}
