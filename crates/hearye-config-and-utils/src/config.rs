//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Backend used when running against a local development server.
pub const DEFAULT_LOCAL_API_URL: &str = "http://localhost:8001";

/// Production backend origin.
pub const DEFAULT_PRODUCTION_API_URL: &str = "https://hearye.us";

/// External identity provider issuer.
pub const DEFAULT_IDENTITY_ISSUER_URL: &str = "https://velnota.com";

/// Upper bound on a single HTTP round trip.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Every backend route lives under this prefix.
const API_PREFIX: &str = "/api/";

/// Which backend the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" | "local" => Some(Self::Development),
            "prod" | "production" => Some(Self::Production),
            _ => None,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Selects the local or production backend.
    #[serde(default = "default_environment")]
    pub environment: Environment,
    /// Local development backend origin.
    #[serde(default = "default_local_api_url")]
    pub local_api_url: String,
    /// Production backend origin.
    #[serde(default = "default_production_api_url")]
    pub production_api_url: String,
    /// Issuer URL of the external identity provider.
    #[serde(default = "default_identity_issuer_url")]
    pub identity_issuer_url: String,
    /// OAuth client id registered with the identity provider.
    #[serde(default)]
    pub identity_client_id: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> Environment {
    Environment::Production
}

fn default_local_api_url() -> String {
    DEFAULT_LOCAL_API_URL.to_string()
}

fn default_production_api_url() -> String {
    DEFAULT_PRODUCTION_API_URL.to_string()
}

fn default_identity_issuer_url() -> String {
    DEFAULT_IDENTITY_ISSUER_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            environment: default_environment(),
            local_api_url: default_local_api_url(),
            production_api_url: default_production_api_url(),
            identity_issuer_url: default_identity_issuer_url(),
            identity_client_id: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the config file (if any), then apply
    /// environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        if config.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(level) = get("HEARYE_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(env) = get("HEARYE_ENV") {
            match Environment::parse(&env) {
                Some(parsed) => self.environment = parsed,
                None => tracing::warn!(value = %env, "Ignoring unknown HEARYE_ENV"),
            }
        }
        if let Some(url) = get("LOCAL_API_URL") {
            self.local_api_url = url;
        }
        if let Some(url) = get("VELNOTA_ISSUER_URL") {
            self.identity_issuer_url = url;
        }
        if let Some(client_id) = get("VELNOTA_CLIENT_ID") {
            self.identity_client_id = client_id;
        }
        if let Some(raw) = get("HEARYE_REQUEST_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid HEARYE_REQUEST_TIMEOUT_SECS"),
            }
        }
    }

    /// Absolute base for relative API paths, always ending in `/api/`.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        let origin = match self.environment {
            Environment::Development => self.local_api_url.as_str(),
            Environment::Production => self.production_api_url.as_str(),
        };
        let origin = origin.strip_suffix('/').unwrap_or(origin);
        Url::parse(&format!("{}{}", origin, API_PREFIX)).map_err(CoreError::from)
    }

    /// Token revocation endpoint of the identity provider.
    pub fn identity_revocation_url(&self) -> CoreResult<Url> {
        let issuer = self.identity_issuer_url.trim_end_matches('/');
        Url::parse(&format!("{}/oauth/v1/revoke_token/", issuer)).map_err(CoreError::from)
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "https://hearye.us/api/"
        );
    }

    #[test]
    fn test_development_base_url_strips_trailing_slash() {
        let mut config = Config::default();
        config.environment = Environment::Development;
        config.local_api_url = "http://10.0.2.2:8001/".to_string();

        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "http://10.0.2.2:8001/api/"
        );
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("HEARYE_LOG_LEVEL", "debug"),
            ("HEARYE_ENV", "dev"),
            ("LOCAL_API_URL", "http://127.0.0.1:9000"),
            ("VELNOTA_ISSUER_URL", "https://id.example.com/"),
            ("VELNOTA_CLIENT_ID", "client-1"),
            ("HEARYE_REQUEST_TIMEOUT_SECS", "5"),
        ]));

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "http://127.0.0.1:9000/api/"
        );
        assert_eq!(config.identity_client_id, "client-1");
        assert_eq!(
            config.identity_revocation_url().unwrap().as_str(),
            "https://id.example.com/oauth/v1/revoke_token/"
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("HEARYE_ENV", "staging"),
            ("HEARYE_REQUEST_TIMEOUT_SECS", "0"),
            ("HEARYE_LOG_LEVEL", "   "),
        ]));

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_config_load_from_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "environment": "development" }"#).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.local_api_url, DEFAULT_LOCAL_API_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_zero_timeout_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "request_timeout_secs": 0 }"#).unwrap();

        assert!(matches!(
            Config::load_from_file(&config_path),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_config_save_and_reload() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = Config::default();
        config.identity_client_id = "saved-client".to_string();
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded.identity_client_id, "saved-client");
    }

    #[test]
    fn test_config_invalid_url() {
        let mut config = Config::default();
        config.production_api_url = "not a valid url".to_string();

        assert!(config.api_base_url().is_err());
    }
}
