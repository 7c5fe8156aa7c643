//! Transport wrapper: one HTTP call, classified. No retry or refresh here.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;

use super::request::{ApiRequest, ApiResponse, Attempt, RequestBody};
use super::{bearer_value, join_url};
use crate::error::ClientError;

/// Classified result of a single send.
#[derive(Debug)]
pub enum Dispatch {
    Response(ApiResponse),
    /// The server answered 401.
    AuthRequired,
}

/// Issues requests against the configured base URL.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RequestDispatcher {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `request`, attaching `access_token` as a bearer credential when present.
    pub async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
        attempt: Attempt,
    ) -> Result<Dispatch, ClientError> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if let Some(token) = access_token {
            match bearer_value(token) {
                Some(value) => builder = builder.header(AUTHORIZATION, value),
                None => tracing::warn!(
                    path = %request.path,
                    "access token is not a valid header value; sending unauthenticated"
                ),
            }
        }

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            attempt = %attempt,
            authenticated = access_token.is_some(),
            "dispatching request"
        );

        let resp = builder
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(path = %request.path, attempt = %attempt, "request rejected with 401");
            return Ok(Dispatch::AuthRequired);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        if status.is_client_error() || status.is_server_error() {
            return Err(ClientError::from_status(status.as_u16(), body));
        }

        Ok(Dispatch::Response(ApiResponse {
            status: status.as_u16(),
            body,
        }))
    }
}
