//! HTTP transport: request values, client construction, and the dispatcher.

pub mod dispatcher;
pub mod request;

pub use dispatcher::{Dispatch, RequestDispatcher};
pub use request::{ApiRequest, ApiResponse, Attempt, RequestBody};

use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::error::ClientError;

/// Build the reqwest client shared by the dispatcher and the auth endpoints.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// `Authorization: Bearer <token>` header value, if the token is header-safe.
pub fn bearer_value(token: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {token}")).ok()
}

/// Join a base URL and an absolute path without doubling the slash.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Path component used to identify an endpoint: no query or fragment, a
/// single leading `/`, no trailing `/`, repeated slashes collapsed.
pub fn route_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("http://h/", "/a"), "http://h/a");
        assert_eq!(join_url("http://h", "a"), "http://h/a");
        assert_eq!(join_url("http://h/api", "/auth/login"), "http://h/api/auth/login");
    }

    #[test]
    fn route_path_normalizes_spellings() {
        assert_eq!(route_path("auth/refresh"), "/auth/refresh");
        assert_eq!(route_path("/auth/refresh/"), "/auth/refresh");
        assert_eq!(route_path("//auth//refresh?x=1#frag"), "/auth/refresh");
        assert_eq!(route_path(""), "/");
        assert_eq!(route_path("/"), "/");
    }

    #[test]
    fn bearer_value_rejects_control_characters() {
        assert_eq!(bearer_value("abc").unwrap(), "Bearer abc");
        assert!(bearer_value("bad\ntoken").is_none());
    }
}
