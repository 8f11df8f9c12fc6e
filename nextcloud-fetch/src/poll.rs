//! Bounded polling for out-of-band confirmation.
//!
//! A confirmation is something that happens outside this process, for
//! example a user approving a login in their browser. The server exposes an
//! endpoint that answers with a "not ready" status until then. The
//! [`PollingConfirmation`] loop issues one attempt at a time, sleeps between
//! attempts, and stops on the first success, the first fatal failure, the
//! timeout or cancellation.
//!
//! ## Timing
//!
//! Elapsed time is measured on the monotonic clock. The timeout check runs
//! after each pending attempt and before sleeping, so a session that never
//! succeeds returns after at least `timeout` and at most
//! `timeout + delay + one request latency`.
//!
//! ## Example
//!
//! ```ignore
//! let poller = PollingConfirmation::new(requester);
//! let request = PollRequest::new(token, ApiRequest::post(endpoint).form([("token", token)]));
//! let credentials: LoginCredentials = poller
//!     .wait_for_confirmation(&request, Duration::from_secs(60), Duration::from_secs(1))
//!     .await?;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::backoff::Backoff;
use crate::error::{PollError, TransportError};
use crate::transport::{ApiRequest, ApiResponse, Requester};

/// Status the login flow uses to signal "not confirmed yet".
pub const NOT_FOUND_PENDING: u16 = 404;

// ============================================================================
// Poll Request
// ============================================================================

/// Immutable description of the attempt repeated during a session.
#[derive(Clone)]
pub struct PollRequest {
    target: String,
    request: ApiRequest,
}

impl PollRequest {
    /// Creates a poll request for the given target (e.g. a login token).
    pub fn new(target: impl Into<String>, request: ApiRequest) -> Self {
        Self {
            target: target.into(),
            request,
        }
    }

    /// Identifier of the thing being confirmed.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The request sent on each attempt.
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }
}

impl fmt::Debug for PollRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollRequest")
            .field("target", &"<redacted>")
            .field("method", &self.request.method)
            .field("url", &self.request.url)
            .finish()
    }
}

// ============================================================================
// Outcome and Session
// ============================================================================

/// Result of a single attempt.
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// The not-ready signal was observed.
    Pending,
    /// The confirmation arrived and its body decoded.
    Success(T),
    /// A non-retryable failure.
    Failed(PollError),
}

/// Per-call loop state. Never shared between calls.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationSession {
    started: Instant,
    attempts: u32,
}

impl ConfirmationSession {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            attempts: 0,
        }
    }

    /// Attempts that produced a result so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn timeout(&self) -> PollError {
        PollError::Timeout {
            attempts: self.attempts,
            elapsed: self.elapsed(),
        }
    }

    fn cancelled(&self) -> PollError {
        PollError::Cancelled {
            attempts: self.attempts,
            elapsed: self.elapsed(),
        }
    }
}

// ============================================================================
// Polling Confirmation
// ============================================================================

/// Repeats a request until the server confirms, fails, or time runs out.
///
/// One instance can drive any number of concurrent sessions; each call to
/// [`wait_for_confirmation`](Self::wait_for_confirmation) owns its own
/// [`ConfirmationSession`].
#[derive(Clone)]
pub struct PollingConfirmation {
    requester: Arc<dyn Requester>,
    pending_statuses: Vec<u16>,
    backoff: Backoff,
}

impl PollingConfirmation {
    /// Creates a poller that treats 404 as pending and keeps the interval fixed.
    pub fn new(requester: Arc<dyn Requester>) -> Self {
        Self {
            requester,
            pending_statuses: vec![NOT_FOUND_PENDING],
            backoff: Backoff::default(),
        }
    }

    /// Replaces the set of statuses that mean "not ready yet".
    pub fn with_pending_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.pending_statuses = statuses.into_iter().collect();
        self
    }

    /// Sets the delay schedule between attempts.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Statuses treated as pending.
    pub fn pending_statuses(&self) -> &[u16] {
        &self.pending_statuses
    }

    /// Classifies the result of one attempt.
    pub fn classify<T: DeserializeOwned>(
        &self,
        result: Result<ApiResponse, TransportError>,
    ) -> PollOutcome<T> {
        let response = match result {
            Ok(response) => response,
            Err(e) => return PollOutcome::Failed(PollError::Transport(e)),
        };

        if self.pending_statuses.contains(&response.status) {
            return PollOutcome::Pending;
        }

        if !response.is_success() {
            return PollOutcome::Failed(PollError::UnexpectedStatus {
                status: response.status,
                reason: response.reason_excerpt(),
            });
        }

        match response.json::<T>() {
            Ok(payload) => PollOutcome::Success(payload),
            Err(e) => PollOutcome::Failed(PollError::Transport(e)),
        }
    }

    /// Polls until the confirmation arrives or `timeout` elapses.
    ///
    /// With `timeout` zero exactly one attempt is made.
    ///
    /// # Errors
    ///
    /// - [`PollError::InvalidInterval`] if `interval` is zero; no attempt is made.
    /// - [`PollError::Timeout`] if every attempt was pending.
    /// - [`PollError::UnexpectedStatus`] or [`PollError::Transport`] on the
    ///   first fatal attempt.
    pub async fn wait_for_confirmation<T: DeserializeOwned>(
        &self,
        request: &PollRequest,
        timeout: Duration,
        interval: Duration,
    ) -> Result<T, PollError> {
        self.run(request, timeout, interval, None).await
    }

    /// Like [`wait_for_confirmation`](Self::wait_for_confirmation), but stops
    /// with [`PollError::Cancelled`] as soon as `cancel` fires.
    ///
    /// Cancellation interrupts the sleep between attempts and drops an
    /// in-flight request; its result is never observed.
    ///
    /// # Errors
    ///
    /// As [`wait_for_confirmation`](Self::wait_for_confirmation), plus
    /// [`PollError::Cancelled`].
    pub async fn wait_for_confirmation_until_cancelled<T: DeserializeOwned>(
        &self,
        request: &PollRequest,
        timeout: Duration,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<T, PollError> {
        self.run(request, timeout, interval, Some(cancel)).await
    }

    #[instrument(skip(self, request, cancel), fields(url = %request.request.url))]
    async fn run<T: DeserializeOwned>(
        &self,
        request: &PollRequest,
        timeout: Duration,
        interval: Duration,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, PollError> {
        if interval.is_zero() {
            return Err(PollError::InvalidInterval);
        }

        let mut session = ConfirmationSession::start();

        loop {
            trace!(attempt = session.attempts + 1, "Sending poll attempt");

            let result = until_cancelled(cancel, self.requester.call(&request.request))
                .await
                .ok_or_else(|| session.cancelled())?;
            session.attempts += 1;

            match self.classify(result) {
                PollOutcome::Success(payload) => {
                    debug!(
                        attempts = session.attempts,
                        elapsed_ms = session.elapsed().as_millis() as u64,
                        "Confirmation received"
                    );
                    return Ok(payload);
                }
                PollOutcome::Failed(err) => {
                    debug!(attempts = session.attempts, error = %err, "Poll attempt failed");
                    return Err(err);
                }
                PollOutcome::Pending => {}
            }

            if session.elapsed() >= timeout {
                debug!(attempts = session.attempts, "Confirmation timed out");
                return Err(session.timeout());
            }

            let delay = self.backoff.delay_for_attempt(interval, session.attempts);
            trace!(delay_ms = delay.as_millis() as u64, "Confirmation pending");

            until_cancelled(cancel, tokio::time::sleep(delay))
                .await
                .ok_or_else(|| session.cancelled())?;
        }
    }
}

impl fmt::Debug for PollingConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingConfirmation")
            .field("pending_statuses", &self.pending_statuses)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

/// Runs `fut` to completion unless the token fires first.
async fn until_cancelled<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Option<F::Output> {
    match cancel {
        None => Some(fut.await),
        Some(token) => {
            tokio::select! {
                biased;
                () = token.cancelled() => None,
                out = fut => Some(out),
            }
        }
    }
}
