//! Error types for authflight.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

use crate::auth::error::StoreError;

/// Primary error type for all client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The session is unusable; it has already been cleared.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Any 4xx other than 401, passed through untouched.
    #[error("Request rejected (status {status}): {body}")]
    Validation { status: u16, body: String },

    #[error("Server error (status {status}): {body}")]
    Server { status: u16, body: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else {
            Self::Network(error)
        }
    }
}

impl ClientError {
    /// Shorthand for an authentication failure.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Map a transport failure, reporting timeouts with the configured limit.
    pub fn from_transport(error: reqwest::Error, timeout: std::time::Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout.as_millis() as u64)
        } else {
            error.into()
        }
    }

    /// Map a non-success, non-401 HTTP status to its error class.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            500..=599 => Self::Server { status, body },
            _ => Self::Validation { status, body },
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Server { .. } => ErrorCategory::Server,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Serialization(_) | Self::InvalidResponse(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether the caller must log in again before further requests.
    pub fn requires_reauthentication(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::Reauthenticate,
            ErrorCategory::Network | ErrorCategory::Server => RecoverySuggestion::RetryLater,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Validation => RecoverySuggestion::FixRequest,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Storage => RecoverySuggestion::CheckStorage,
            ErrorCategory::Serialization => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ClientError>;
