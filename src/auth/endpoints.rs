//! Direct, unauthenticated calls to the login and refresh endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::coordinator::SessionRefresher;
use super::token::Session;
use crate::error::ClientError;
use crate::http::{join_url, route_path};

/// Login and refresh endpoint client.
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    client: reqwest::Client,
    base_url: String,
    login_path: String,
    refresh_path: String,
    timeout: Duration,
}

impl AuthEndpoints {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        login_path: impl Into<String>,
        refresh_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            login_path: login_path.into(),
            refresh_path: refresh_path.into(),
            timeout,
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    /// Whether `path` names the login or refresh endpoint, however it is spelled.
    pub fn is_auth_path(&self, path: &str) -> bool {
        let path = route_path(path);
        path == route_path(&self.login_path) || path == route_path(&self.refresh_path)
    }

    /// Exchange credentials for a new session.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session, ClientError> {
        let resp = self
            .client
            .post(join_url(&self.base_url, &self.login_path))
            .header("Accept", "application/json")
            .form(&[("username", identifier), ("password", secret)])
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        let status = resp.status();
        if status.is_client_error() {
            tracing::info!(status = status.as_u16(), "login rejected");
            return Err(ClientError::auth(format!(
                "login rejected with status {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), body));
        }

        let payload: LoginResponse = resp.json().await?;
        Ok(Session::new(payload.access_token, payload.refresh_token))
    }

    /// Exchange the session's refresh token for a new access token.
    pub async fn refresh_session(&self, session: &Session) -> Result<Session, ClientError> {
        let resp = self
            .client
            .post(join_url(&self.base_url, &self.refresh_path))
            .header("Accept", "application/json")
            .json(&RefreshRequest {
                refresh_token: &session.refresh_token,
            })
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::auth("refresh token rejected"));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), body));
        }

        let payload: RefreshResponse = resp.json().await?;
        if payload.access_token.is_empty() {
            return Err(ClientError::InvalidResponse(
                "refresh response carried an empty access token".to_string(),
            ));
        }
        Ok(session.refreshed(payload.access_token, payload.refresh_token))
    }
}

#[async_trait]
impl SessionRefresher for AuthEndpoints {
    async fn refresh(&self, session: &Session) -> Result<Session, ClientError> {
        self.refresh_session(session).await
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> AuthEndpoints {
        AuthEndpoints::new(
            reqwest::Client::new(),
            "http://localhost",
            "/auth/login",
            "/auth/refresh",
            Duration::from_secs(1),
        )
    }

    #[test]
    fn auth_paths_are_recognized() {
        let ep = endpoints();
        assert!(ep.is_auth_path("/auth/login"));
        assert!(ep.is_auth_path("/auth/refresh?x=1"));
        assert!(ep.is_auth_path("auth/refresh"));
        assert!(ep.is_auth_path("/auth/login/"));
        assert!(!ep.is_auth_path("/auth/me"));
        assert!(!ep.is_auth_path("/items"));
    }

    #[test]
    fn refresh_payload_without_rotation_parses() {
        let payload: RefreshResponse = serde_json::from_str(r#"{"access_token":"a2"}"#).unwrap();
        assert_eq!(payload.access_token, "a2");
        assert!(payload.refresh_token.is_none());
    }
}
