use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials held between login and logout.
///
/// # Example
/// ```
/// use authflight::auth::Session;
///
/// let session = Session::new("access", "refresh");
/// assert_eq!(session.access_token, "access");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Build a session stamped with the current time.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            issued_at: Utc::now(),
        }
    }

    /// Successor session after a refresh. Keeps the current refresh token
    /// when the server did not rotate it.
    pub fn refreshed(&self, access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token: refresh_token.unwrap_or_else(|| self.refresh_token.clone()),
            issued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refreshed_keeps_refresh_token_without_rotation() {
        let session = Session::new("a1", "r1");
        let next = session.refreshed("a2".to_string(), None);
        assert_eq!(next.access_token, "a2");
        assert_eq!(next.refresh_token, "r1");
        assert!(next.issued_at >= session.issued_at);
    }

    #[test]
    fn refreshed_adopts_rotated_refresh_token() {
        let session = Session::new("a1", "r1");
        let next = session.refreshed("a2".to_string(), Some("r2".to_string()));
        assert_eq!(next.refresh_token, "r2");
    }
}
