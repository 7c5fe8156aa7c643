//! Configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::store::TokenStoreConfig;
use crate::error::ClientError;

pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for an [`AuthClient`](crate::client::AuthClient).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub login_path: String,
    pub refresh_path: String,
    /// Per-request transport timeout.
    pub request_timeout: Duration,
    /// Upper bound on a single refresh call. `None` waits for the server.
    pub refresh_timeout: Option<Duration>,
    pub token_dir: PathBuf,
    pub profile: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            refresh_timeout: None,
            token_dir: TokenStoreConfig::default_dir(),
            profile: "default".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load from environment variables, reading `.env` if present.
    ///
    /// Unparseable numeric values are reported rather than ignored.
    pub fn from_env() -> Result<Self, ClientError> {
        let _ = dotenvy::dotenv(); // missing .env is fine
        let mut config = Self::default();

        if let Some(url) = env_var("AUTHFLIGHT_BASE_URL") {
            config.base_url = url;
        }
        if let Some(path) = env_var("AUTHFLIGHT_LOGIN_PATH") {
            config.login_path = path;
        }
        if let Some(path) = env_var("AUTHFLIGHT_REFRESH_PATH") {
            config.refresh_path = path;
        }
        if let Some(secs) = env_secs("AUTHFLIGHT_TIMEOUT_SECS")? {
            config.request_timeout = secs;
        }
        if let Some(secs) = env_secs("AUTHFLIGHT_REFRESH_TIMEOUT_SECS")? {
            config.refresh_timeout = Some(secs);
        }
        if let Some(dir) = env_var("AUTHFLIGHT_TOKEN_DIR") {
            config.token_dir = PathBuf::from(dir);
        }
        if let Some(profile) = env_var("AUTHFLIGHT_PROFILE") {
            config.profile = profile;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_paths(mut self, login: impl Into<String>, refresh: impl Into<String>) -> Self {
        self.login_path = login.into();
        self.refresh_path = refresh.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn with_token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = dir.into();
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn token_store_config(&self) -> TokenStoreConfig {
        TokenStoreConfig::new(self.token_dir.clone()).with_profile(self.profile.clone())
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        for (name, path) in [("login", &self.login_path), ("refresh", &self.refresh_path)] {
            if !path.starts_with('/') {
                return Err(ClientError::Configuration(format!(
                    "{name} path must start with '/', got '{path}'"
                )));
            }
        }
        if self.login_path == self.refresh_path {
            return Err(ClientError::Configuration(
                "login and refresh paths must differ".to_string(),
            ));
        }
        if self.request_timeout.is_zero() || self.refresh_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ClientError::Configuration(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(key: &str) -> Result<Option<Duration>, ClientError> {
    env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ClientError::Configuration(format!("{key} must be whole seconds, got '{raw}'")))
        })
        .transpose()
}
