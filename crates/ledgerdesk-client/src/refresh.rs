//! Single-flight access-token refresh.
//!
//! When a request is rejected with 401 and a refresh token is held, exactly
//! one refresh call goes out no matter how many requests fail concurrently.
//! The request that finds the coordinator idle starts the refresh and waits
//! for it directly; requests that arrive while it is in flight are queued
//! and replayed in arrival order once the new access token is stored.
//!
//! ```text
//!   Idle --401--> Refreshing --ok--> (replay queue, FIFO) --> Idle
//!                     |
//!                     +--err--> (clear tokens, reject queue) --> Idle
//! ```
//!
//! Every request is retried at most once and retries are never intercepted
//! again, so a backend that keeps rejecting the new token cannot cause a
//! refresh loop.
//!
//! Replays run one at a time: a waiter's retry is not sent until the previous
//! waiter has its answer, so the backend sees them in arrival order. The cost
//! is latency. A slow replay delays every later waiter, each of which is still
//! bounded by the client's per-request timeout.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::request::{ApiRequest, Payload, read_payload};

/// Path of the refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "auth/refresh";

/// What to do with a refresh token returned by the refresh endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshRotation {
    /// Keep the current refresh token even if the backend sends a new one.
    Keep,
    /// Store a rotated refresh token when the response includes one.
    #[default]
    AcceptIfPresent,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Response from `POST auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// A request parked behind an in-flight refresh.
struct Waiter {
    request: ApiRequest,
    reply: oneshot::Sender<Result<Payload>>,
}

/// Outcome of the state check for one rejected request.
enum Decision {
    /// Queued behind the in-flight refresh.
    Wait(oneshot::Receiver<Result<Payload>>),
    /// No refresh token; surface the original 401.
    Reject,
    /// Tokens already rotated since the request was sent.
    Retry { request: ApiRequest, access: String },
    /// This request starts the refresh.
    Refresh {
        request: ApiRequest,
        refresh_token: String,
    },
}

enum RefreshState {
    Idle,
    Refreshing { waiters: VecDeque<Waiter> },
}

/// Tracks whether a refresh is in flight and who is waiting on it.
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    timeout: Duration,
    rotation: RefreshRotation,
}

impl RefreshCoordinator {
    pub(crate) fn new(timeout: Duration, rotation: RefreshRotation) -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            timeout,
            rotation,
        }
    }

    /// True while a refresh call is in flight.
    pub(crate) fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::Refreshing { .. })
    }

    /// Recover a request that was rejected with 401.
    ///
    /// `sent_with` is the access token the rejected attempt carried and
    /// `unauthorized` the error it produced.
    pub(crate) async fn recover(
        &self,
        client: &ApiClient,
        request: ApiRequest,
        sent_with: Option<String>,
        unauthorized: Error,
    ) -> Result<Payload> {
        match self.decide(client, request, sent_with) {
            Decision::Wait(rx) => rx.await.unwrap_or(Err(Error::RefreshAborted)),
            Decision::Reject => Err(unauthorized),
            Decision::Retry { request, access } => {
                tracing::debug!("Retrying with access token from a completed refresh");
                client.send_once(&request, Some(&access)).await
            }
            Decision::Refresh {
                request,
                refresh_token,
            } => {
                let (trigger, outcome) = oneshot::channel();
                // Spawned so that dropping the triggering caller cannot strand the queue.
                tokio::spawn(drive_refresh(client.clone(), refresh_token, trigger));

                match outcome.await {
                    Ok(Ok(access)) => client.send_once(&request, Some(&access)).await,
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(Error::RefreshAborted),
                }
            }
        }
    }

    /// Check-and-set of the refresh state, under one lock acquisition.
    fn decide(
        &self,
        client: &ApiClient,
        request: ApiRequest,
        sent_with: Option<String>,
    ) -> Decision {
        let tokens = client.tokens();
        let mut state = self.state.lock();

        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (reply, rx) = oneshot::channel();
            waiters.push_back(Waiter { request, reply });
            tracing::debug!(queued = waiters.len(), "Request queued behind token refresh");
            return Decision::Wait(rx);
        }

        let Some(refresh_token) = tokens.refresh_token() else {
            return Decision::Reject;
        };

        // A refresh finished after this request went out.
        if let Some(access) = tokens.access_token()
            && sent_with.as_deref() != Some(access.as_str())
        {
            return Decision::Retry { request, access };
        }

        *state = RefreshState::Refreshing {
            waiters: VecDeque::new(),
        };
        Decision::Refresh {
            request,
            refresh_token,
        }
    }

    /// Return to idle and hand back the queued waiters.
    fn finish(&self) -> VecDeque<Waiter> {
        match std::mem::replace(&mut *self.state.lock(), RefreshState::Idle) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => VecDeque::new(),
        }
    }

    async fn call_refresh_endpoint(
        &self,
        client: &ApiClient,
        refresh_token: &str,
    ) -> Result<RefreshResponse> {
        let request = async {
            let url = client.url(REFRESH_PATH)?;
            let response = client
                .http()
                .post(url)
                .json(&RefreshRequest { refresh_token })
                .send()
                .await?;
            read_payload(response).await?.decode::<RefreshResponse>()
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }

    fn store_refreshed(&self, client: &ApiClient, refreshed: &RefreshResponse) {
        let tokens = client.tokens();
        let result = match (&refreshed.refresh_token, self.rotation) {
            (Some(rotated), RefreshRotation::AcceptIfPresent) => {
                tokens.set_tokens(refreshed.access_token.as_str(), rotated.as_str())
            }
            _ => tokens.set_access_token(refreshed.access_token.as_str()),
        };
        // Memory is already updated; only persistence failed.
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist refreshed tokens");
        }
    }
}

/// Run one refresh and settle everyone waiting on it.
async fn drive_refresh(
    client: ApiClient,
    refresh_token: String,
    trigger: oneshot::Sender<Result<String>>,
) {
    let coordinator = client.refresh_coordinator();
    tracing::debug!("Refreshing access token");

    match coordinator
        .call_refresh_endpoint(&client, &refresh_token)
        .await
    {
        Ok(refreshed) => {
            coordinator.store_refreshed(&client, &refreshed);
            let waiters = coordinator.finish();
            tracing::info!(
                replaying = waiters.len(),
                expires_in = refreshed.expires_in,
                "Access token refreshed"
            );

            let access = refreshed.access_token;
            let _ = trigger.send(Ok(access.clone()));

            // The next retry goes out only after this one settles.
            for waiter in waiters {
                let outcome = client.send_once(&waiter.request, Some(&access)).await;
                let _ = waiter.reply.send(outcome);
            }
        }
        Err(e) => {
            if let Err(clear_err) = client.tokens().clear_tokens() {
                tracing::warn!(error = %clear_err, "Failed to clear tokens after refresh failure");
            }
            let waiters = coordinator.finish();
            tracing::warn!(error = %e, rejected = waiters.len(), "Token refresh failed, session cleared");

            let cause = Arc::new(e);
            let _ = trigger.send(Err(Error::RefreshFailed(Arc::clone(&cause))));
            for waiter in waiters {
                let _ = waiter.reply.send(Err(Error::RefreshFailed(Arc::clone(&cause))));
            }
        }
    }
}
