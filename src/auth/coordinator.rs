//! Single-flight refresh of the access token.
//!
//! The first request to observe a 401 while the coordinator is idle starts one
//! refresh on a spawned task; every other request that observes a 401 before
//! that refresh resolves is queued and receives the same outcome. Session,
//! refresh state and the waiter queue live behind one lock that is never held
//! across an `.await`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use strum::Display;
use tokio::sync::oneshot;

use super::error::StoreError;
use super::store::TokenStore;
use super::token::Session;
use crate::error::ClientError;
use crate::http::Attempt;
use crate::util::timeout::with_timeout;

/// Exchanges a session's refresh token for a successor session.
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    async fn refresh(&self, session: &Session) -> Result<Session, ClientError>;
}

/// Whether a refresh is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Why a 401 is not eligible for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The request targeted the login or refresh endpoint.
    AuthEndpoint,
    /// The request was already retried once after a refresh.
    AlreadyRetried,
    NoSession,
}

impl RejectReason {
    fn message(self) -> &'static str {
        match self {
            Self::AuthEndpoint => "authentication endpoint rejected the credentials",
            Self::AlreadyRetried => "request rejected again after token refresh",
            Self::NoSession => "not logged in",
        }
    }
}

/// What to do about a 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Clear the session and fail this request alone.
    Reject(RejectReason),
    /// A refresh already replaced the token the request was sent with; retry with this one.
    Reuse(String),
    /// Start the refresh for this session.
    Lead(Session),
    /// Queue behind the refresh in flight.
    Join,
}

/// Decide how to handle a 401 given the coordinator's current state.
///
/// `sent_with` is the access token the rejected request carried.
pub fn decide(
    auth_endpoint: bool,
    attempt: Attempt,
    state: RefreshState,
    sent_with: Option<&str>,
    current: Option<&Session>,
) -> RefreshDecision {
    if auth_endpoint {
        return RefreshDecision::Reject(RejectReason::AuthEndpoint);
    }
    if attempt == Attempt::Retried {
        return RefreshDecision::Reject(RejectReason::AlreadyRetried);
    }
    let Some(session) = current else {
        return RefreshDecision::Reject(RejectReason::NoSession);
    };
    match state {
        RefreshState::Refreshing => RefreshDecision::Join,
        RefreshState::Idle if sent_with != Some(session.access_token.as_str()) => {
            RefreshDecision::Reuse(session.access_token.clone())
        }
        RefreshState::Idle => RefreshDecision::Lead(session.clone()),
    }
}

/// Outcome delivered to each waiter.
#[derive(Debug, Clone)]
enum RefreshFailure {
    Rejected(String),
    Storage(StoreError),
}

impl From<RefreshFailure> for ClientError {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::Rejected(message) => ClientError::Authentication(message),
            RefreshFailure::Storage(error) => ClientError::Storage(error),
        }
    }
}

type Waiter = oneshot::Sender<Result<String, RefreshFailure>>;

struct CoordinatorState {
    refresh: RefreshState,
    session: Option<Session>,
    waiters: VecDeque<Waiter>,
    /// Bumped whenever login or logout replaces the session, so a refresh
    /// started under an older session cannot install its result.
    epoch: u64,
}

impl CoordinatorState {
    fn release(&mut self, reply: Result<String, RefreshFailure>) -> usize {
        let mut delivered = 0;
        for waiter in self.waiters.drain(..) {
            if waiter.send(reply.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}

struct Shared {
    state: Mutex<CoordinatorState>,
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn SessionRefresher>,
    refresh_timeout: Option<Duration>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start one refresh of `session` on its own task. The caller has
    /// already set the state to `Refreshing`.
    fn spawn_refresh(self: &Arc<Self>, session: Session, epoch: u64) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            tracing::info!("refreshing access token");
            let outcome = match shared.refresh_timeout {
                Some(limit) => with_timeout(limit, shared.refresher.refresh(&session)).await,
                None => shared.refresher.refresh(&session).await,
            };
            shared.finish(outcome, epoch);
        });
    }

    fn finish(self: &Arc<Self>, outcome: Result<Session, ClientError>, epoch: u64) {
        let mut state = self.lock();
        state.refresh = RefreshState::Idle;

        if state.epoch != epoch {
            match state.session.clone() {
                // Requests rejected under the session installed since then
                // queued behind this refresh; give that session its own.
                Some(current) if !state.waiters.is_empty() => {
                    tracing::info!(
                        waiting = state.waiters.len(),
                        "discarded refresh result for a replaced session; refreshing again"
                    );
                    state.refresh = RefreshState::Refreshing;
                    let current_epoch = state.epoch;
                    drop(state);
                    self.spawn_refresh(current, current_epoch);
                }
                Some(_) => tracing::info!("discarded refresh result for a replaced session"),
                None => {
                    let rejected = state.release(Err(RefreshFailure::Rejected(
                        "session ended during token refresh".to_string(),
                    )));
                    tracing::info!(rejected, "discarded refresh result after logout");
                }
            }
            return;
        }

        let failure = match outcome {
            Ok(fresh) => match self.store.write(&fresh) {
                Ok(()) => {
                    let token = fresh.access_token.clone();
                    state.session = Some(fresh);
                    let delivered = state.release(Ok(token));
                    tracing::info!(delivered, "access token refreshed");
                    return;
                }
                Err(error) => {
                    tracing::warn!(%error, "could not persist refreshed session");
                    RefreshFailure::Storage(error)
                }
            },
            Err(error) => {
                tracing::warn!(%error, "token refresh failed");
                RefreshFailure::Rejected(format!("token refresh failed: {error}"))
            }
        };

        state.session = None;
        if let Err(error) = self.store.clear() {
            tracing::warn!(%error, "could not clear stored session");
        }
        let rejected = state.release(Err(failure));
        tracing::warn!(rejected, "session cleared after failed refresh");
    }
}

/// Owns the session, the refresh state and the waiter queue of one client.
#[derive(Clone)]
pub struct RefreshCoordinator {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("RefreshCoordinator")
            .field("refresh", &state.refresh)
            .field("has_session", &state.session.is_some())
            .field("waiters", &state.waiters.len())
            .field("refresh_timeout", &self.shared.refresh_timeout)
            .finish()
    }
}

impl RefreshCoordinator {
    /// Create a coordinator seeded with whatever session `store` holds.
    pub fn new(
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn SessionRefresher>,
        refresh_timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let session = store.read()?;
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CoordinatorState {
                    refresh: RefreshState::Idle,
                    session,
                    waiters: VecDeque::new(),
                    epoch: 0,
                }),
                store,
                refresher,
                refresh_timeout,
            }),
        })
    }

    pub fn state(&self) -> RefreshState {
        self.shared.lock().refresh
    }

    pub fn session(&self) -> Option<Session> {
        self.shared.lock().session.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.shared
            .lock()
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.shared
            .lock()
            .session
            .as_ref()
            .map(|s| s.refresh_token.clone())
    }

    /// Number of requests suspended on the refresh in flight.
    pub fn waiting(&self) -> usize {
        self.shared.lock().waiters.len()
    }

    /// Install a session obtained by login. Waiters already queued are
    /// released with the new access token.
    pub fn install(&self, session: Session) -> Result<(), ClientError> {
        let mut state = self.shared.lock();
        self.shared.store.write(&session)?;
        let token = session.access_token.clone();
        state.session = Some(session);
        state.epoch += 1;
        state.release(Ok(token));
        Ok(())
    }

    /// Drop the session in any state. Queued waiters are rejected now; a
    /// refresh in flight keeps running but its result is discarded.
    pub fn clear(&self) -> Result<(), ClientError> {
        let mut state = self.shared.lock();
        state.session = None;
        state.epoch += 1;
        let rejected = state.release(Err(RefreshFailure::Rejected("logged out".to_string())));
        if rejected > 0 {
            tracing::info!(rejected, "rejected queued requests on logout");
        }
        self.shared.store.clear()?;
        Ok(())
    }

    /// Resolve a 401: returns the access token to retry with, or the error to
    /// surface. Suspends while a refresh is in flight.
    pub async fn on_unauthorized(
        &self,
        auth_endpoint: bool,
        attempt: Attempt,
        sent_with: Option<&str>,
    ) -> Result<String, ClientError> {
        let receiver = {
            let mut state = self.shared.lock();
            let decision = decide(
                auth_endpoint,
                attempt,
                state.refresh,
                sent_with,
                state.session.as_ref(),
            );
            match decision {
                RefreshDecision::Reject(reason) => {
                    tracing::warn!(?reason, %attempt, "clearing session after unrecoverable 401");
                    if state.session.take().is_some() {
                        state.epoch += 1;
                    }
                    state.release(Err(RefreshFailure::Rejected(reason.message().to_string())));
                    if let Err(error) = self.shared.store.clear() {
                        tracing::warn!(%error, "could not clear stored session");
                    }
                    return Err(ClientError::auth(reason.message()));
                }
                RefreshDecision::Reuse(token) => {
                    tracing::debug!("token already refreshed; retrying with current token");
                    return Ok(token);
                }
                RefreshDecision::Join => {
                    let (tx, rx) = oneshot::channel();
                    state.waiters.push_back(tx);
                    tracing::debug!(position = state.waiters.len(), "waiting for token refresh");
                    rx
                }
                RefreshDecision::Lead(session) => {
                    let (tx, rx) = oneshot::channel();
                    state.refresh = RefreshState::Refreshing;
                    state.waiters.push_back(tx);
                    let epoch = state.epoch;
                    drop(state);
                    self.shared.spawn_refresh(session, epoch);
                    rx
                }
            }
        };

        let token = match receiver.await {
            Ok(reply) => reply.map_err(ClientError::from)?,
            Err(_) => return Err(ClientError::auth("token refresh was abandoned")),
        };

        // Logout or login may have run between the broadcast and this resume.
        match self.access_token() {
            Some(current) => {
                if current != token {
                    tracing::debug!("session replaced after refresh; retrying with current token");
                }
                Ok(current)
            }
            None => Err(ClientError::auth("session ended during token refresh")),
        }
    }
}
