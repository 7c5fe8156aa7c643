//! Tests for configuration loading and validation.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use authflight::config::{ClientConfig, DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH};
use authflight::ClientError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 7] = [
    "AUTHFLIGHT_BASE_URL",
    "AUTHFLIGHT_LOGIN_PATH",
    "AUTHFLIGHT_REFRESH_PATH",
    "AUTHFLIGHT_TIMEOUT_SECS",
    "AUTHFLIGHT_REFRESH_TIMEOUT_SECS",
    "AUTHFLIGHT_TOKEN_DIR",
    "AUTHFLIGHT_PROFILE",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in keys {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn defaults_are_valid() {
    let config = ClientConfig::default();
    assert_eq!(config.login_path, DEFAULT_LOGIN_PATH);
    assert_eq!(config.refresh_path, DEFAULT_REFRESH_PATH);
    assert!(config.refresh_timeout.is_none());
    assert_eq!(config.profile, "default");
    config.validate().expect("defaults validate");
}

#[test]
fn from_env_reads_every_override() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);

    std::env::set_var("AUTHFLIGHT_BASE_URL", "https://api.example.com");
    std::env::set_var("AUTHFLIGHT_LOGIN_PATH", "/v2/login");
    std::env::set_var("AUTHFLIGHT_REFRESH_PATH", "/v2/refresh");
    std::env::set_var("AUTHFLIGHT_TIMEOUT_SECS", "12");
    std::env::set_var("AUTHFLIGHT_REFRESH_TIMEOUT_SECS", "4");
    std::env::set_var("AUTHFLIGHT_TOKEN_DIR", "/tmp/authflight-test");
    std::env::set_var("AUTHFLIGHT_PROFILE", "work");

    let config = ClientConfig::from_env().expect("config");
    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.login_path, "/v2/login");
    assert_eq!(config.refresh_path, "/v2/refresh");
    assert_eq!(config.request_timeout, Duration::from_secs(12));
    assert_eq!(config.refresh_timeout, Some(Duration::from_secs(4)));
    assert_eq!(config.token_dir, PathBuf::from("/tmp/authflight-test"));
    assert_eq!(config.profile, "work");
}

#[test]
fn from_env_rejects_non_numeric_timeout() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);

    std::env::set_var("AUTHFLIGHT_TIMEOUT_SECS", "soon");
    let err = ClientConfig::from_env().unwrap_err();
    assert!(matches!(err, ClientError::Configuration(msg) if msg.contains("AUTHFLIGHT_TIMEOUT_SECS")));
}

#[test]
fn validate_rejects_bad_settings() {
    assert!(ClientConfig::new("ftp://x").validate().is_err());
    assert!(ClientConfig::new("http://x")
        .with_paths("auth/login", "/auth/refresh")
        .validate()
        .is_err());
    assert!(ClientConfig::new("http://x")
        .with_paths("/same", "/same")
        .validate()
        .is_err());
    assert!(ClientConfig::new("http://x")
        .with_refresh_timeout(Some(Duration::ZERO))
        .validate()
        .is_err());
}

#[test]
fn token_store_config_follows_profile() {
    let config = ClientConfig::new("http://x")
        .with_token_dir("/tmp/tokens")
        .with_profile("phone");
    let store_config = config.token_store_config();
    assert_eq!(store_config.base_dir, PathBuf::from("/tmp/tokens"));
    assert_eq!(store_config.profile, "phone");
}
