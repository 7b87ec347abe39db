//! Token refresh coordination
//!
//! Any number of requests may fail with 401 at the same moment. The
//! [`RefreshCoordinator`] makes sure they share a single refresh call: the
//! first caller to find the coordinator idle starts the refresh and publishes
//! it as a shared future, and everyone arriving before it settles awaits that
//! same future. Success replaces the stored credential; failure clears it.
//! Either way the coordinator returns to idle and every waiter sees the same
//! outcome.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use productwhisper_domain::constants::AUTH_REFRESH_PATH;
use productwhisper_domain::{RefreshRequest, RefreshResponse};
use reqwest::{Method, StatusCode};
use tracing::{debug, info, warn};

use super::errors::ApiError;
use crate::credentials::{Credential, CredentialStore};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Exchanges a refresh token for a new token pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// # Errors
    /// Returns an [`ApiError`] if the refresh token is rejected or the call
    /// fails.
    async fn refresh(&self, refresh_token: &str) -> Result<Credential, ApiError>;
}

/// [`TokenRefresher`] that calls `POST /auth/refresh`.
///
/// Sent without a bearer header and outside the request pipeline, so a
/// rejected refresh can never recurse into another refresh.
pub struct HttpTokenRefresher {
    http: HttpClient,
    url: String,
}

impl HttpTokenRefresher {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self { http, url: format!("{}{}", base_url.trim_end_matches('/'), AUTH_REFRESH_PATH) }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<Credential, ApiError> {
        let request = self
            .http
            .request(Method::POST, &self.url)
            .json(&RefreshRequest { refresh_token });

        let response = self.http.send(request).await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(InfraError::from(e).into()))?;

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        let parsed: RefreshResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::invalid_body(StatusCode::OK, e))?;

        Ok(parsed.tokens.into())
    }
}

type RefreshOutcome = Result<Credential, ApiError>;

/// The in-flight refresh every concurrent caller subscribes to.
pub type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
    Idle,
    Refreshing(PendingRefresh),
}

/// Observable coordinator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

/// De-duplicates concurrent token refreshes.
pub struct RefreshCoordinator {
    state: Arc<Mutex<RefreshState>>,
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    timeout: Duration,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        timeout: Duration,
    ) -> Self {
        Self { state: Arc::new(Mutex::new(RefreshState::Idle)), store, refresher, timeout }
    }

    pub fn phase(&self) -> RefreshPhase {
        match &*self.state.lock() {
            RefreshState::Idle => RefreshPhase::Idle,
            RefreshState::Refreshing(_) => RefreshPhase::Refreshing,
        }
    }

    /// Obtain a fresh credential after a request failed with 401.
    ///
    /// `stale_access` is the access token the failed request was sent with.
    /// If the store already holds a different one, a refresh finished after
    /// that request went out and the stored pair is returned without another
    /// network call.
    ///
    /// # Errors
    /// Returns the shared refresh failure. The credential store has been
    /// cleared by the time any caller observes it.
    pub async fn refresh(&self, stale_access: Option<&str>) -> Result<Credential, ApiError> {
        let pending = {
            let mut state = self.state.lock();
            match &*state {
                RefreshState::Refreshing(pending) => {
                    debug!("joining in-flight token refresh");
                    pending.clone()
                }
                RefreshState::Idle => {
                    if let Some(current) = self.store.get() {
                        if stale_access != Some(current.access_token.as_str()) {
                            debug!("credential already rotated; skipping refresh");
                            return Ok(current);
                        }
                    }

                    let pending = run_refresh(
                        Arc::clone(&self.state),
                        Arc::clone(&self.store),
                        Arc::clone(&self.refresher),
                        self.timeout,
                    )
                    .boxed()
                    .shared();
                    *state = RefreshState::Refreshing(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }
}

async fn run_refresh(
    state: Arc<Mutex<RefreshState>>,
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    timeout: Duration,
) -> RefreshOutcome {
    info!("refreshing access token");

    let outcome = match store.get() {
        None => Err(ApiError::unauthorized("No refresh token available")),
        Some(current) => {
            match tokio::time::timeout(timeout, refresher.refresh(&current.refresh_token)).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::unauthorized(format!(
                    "Token refresh timed out after {timeout:?}"
                ))),
            }
        }
    };

    match &outcome {
        Ok(credential) => {
            store.set(credential.clone());
            info!("access token refreshed");
        }
        Err(e) => {
            store.clear();
            warn!(code = %e.code(), error = %e, "token refresh failed; credentials cleared");
        }
    }

    *state.lock() = RefreshState::Idle;
    outcome
}
