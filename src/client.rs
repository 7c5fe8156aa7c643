//! The façade UI collaborators talk to.

use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::coordinator::{RefreshCoordinator, RefreshState};
use crate::auth::endpoints::AuthEndpoints;
use crate::auth::store::{FileTokenStore, TokenStore};
use crate::auth::token::Session;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::{build_client, ApiRequest, ApiResponse, Attempt, Dispatch, RequestDispatcher};

/// Authenticated HTTP client with single-flight token refresh.
///
/// Cheap to clone; clones share one session and one refresh coordinator.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use authflight::auth::MemoryTokenStore;
/// use authflight::{AuthClient, ClientConfig};
///
/// # async fn example() -> authflight::error::Result<()> {
/// let client = AuthClient::new(
///     ClientConfig::new("https://api.example.com"),
///     Arc::new(MemoryTokenStore::new()),
/// )?;
/// client.login("1234@1234.com", "hunter2").await?;
/// let profile = client.get("/users/me").await?;
/// println!("{}", profile.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuthClient {
    dispatcher: RequestDispatcher,
    endpoints: Arc<AuthEndpoints>,
    coordinator: RefreshCoordinator,
}

impl AuthClient {
    /// Build a client over `store`, resuming any session it already holds.
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        config.validate()?;
        let http = build_client(config.request_timeout)?;
        let endpoints = Arc::new(AuthEndpoints::new(
            http.clone(),
            config.base_url.clone(),
            config.login_path.clone(),
            config.refresh_path.clone(),
            config.request_timeout,
        ));
        let coordinator =
            RefreshCoordinator::new(store, endpoints.clone(), config.refresh_timeout)?;
        Ok(Self {
            dispatcher: RequestDispatcher::new(http, config.base_url, config.request_timeout),
            endpoints,
            coordinator,
        })
    }

    /// Build a client persisting its session in the configured token directory.
    pub fn with_file_store(config: ClientConfig) -> Result<Self> {
        let store = FileTokenStore::new(config.token_store_config());
        Self::new(config, Arc::new(store))
    }

    /// Log in with credentials. A rejection never enters the refresh path.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session> {
        let session = self.endpoints.login(identifier, secret).await?;
        self.coordinator.install(session.clone())?;
        tracing::info!("logged in");
        Ok(session)
    }

    /// Forget the session regardless of any refresh in flight.
    pub fn logout(&self) -> Result<()> {
        self.coordinator.clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Send `request` with the current access token, refreshing it at most
    /// once if the server answers 401.
    pub async fn authenticated_request(&self, request: ApiRequest) -> Result<ApiResponse> {
        let span = tracing::debug_span!(
            "authenticated_request",
            request_id = %Uuid::new_v4(),
            method = %request.method,
            path = %request.path,
        );
        self.drive(&request).instrument(span).await
    }

    async fn drive(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let sent_with = self.coordinator.access_token();
        let auth_endpoint = self.endpoints.is_auth_path(&request.path);

        match self
            .dispatcher
            .send(request, sent_with.as_deref(), Attempt::First)
            .await?
        {
            Dispatch::Response(response) => return Ok(response),
            Dispatch::AuthRequired => {}
        }

        let fresh = self
            .coordinator
            .on_unauthorized(auth_endpoint, Attempt::First, sent_with.as_deref())
            .await?;

        match self
            .dispatcher
            .send(request, Some(&fresh), Attempt::Retried)
            .await?
        {
            Dispatch::Response(response) => Ok(response),
            Dispatch::AuthRequired => match self
                .coordinator
                .on_unauthorized(auth_endpoint, Attempt::Retried, Some(&fresh))
                .await
            {
                Err(error) => Err(error),
                Ok(_) => Err(ClientError::auth("request rejected again after token refresh")),
            },
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.authenticated_request(ApiRequest::get(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.authenticated_request(ApiRequest::delete(path)).await
    }

    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.authenticated_request(ApiRequest::post(path).with_json(body)?)
            .await
    }

    pub async fn put_json<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.authenticated_request(ApiRequest::put(path).with_json(body)?)
            .await
    }

    /// Current access token, for display only.
    pub fn access_token(&self) -> Option<String> {
        self.coordinator.access_token()
    }

    /// Current refresh token, for display only.
    pub fn refresh_token(&self) -> Option<String> {
        self.coordinator.refresh_token()
    }

    pub fn is_logged_in(&self) -> bool {
        self.coordinator.session().is_some()
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.coordinator.state()
    }
}
