//! In-memory [`Requester`] that replays a script of responses.
//!
//! Used by tests in this workspace to drive API modules and the polling core
//! without a network. Every call is recorded, and the number of concurrent
//! calls is tracked so tests can assert that a session never overlaps its
//! own requests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::transport::{ApiRequest, ApiResponse, Requester};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// A response with any status.
    Response(ApiResponse),
    /// The request timed out.
    Timeout,
    /// The connection failed.
    Connection(String),
}

impl ScriptedReply {
    fn into_result(self) -> Result<ApiResponse, TransportError> {
        match self {
            Self::Response(response) => Ok(response),
            Self::Timeout => Err(TransportError::Timeout),
            Self::Connection(reason) => Err(TransportError::Connection(reason)),
        }
    }
}

impl From<ApiResponse> for ScriptedReply {
    fn from(response: ApiResponse) -> Self {
        Self::Response(response)
    }
}

/// Replays queued replies, then a repeating fallback.
#[derive(Debug, Default)]
pub struct ScriptedRequester {
    script: Mutex<VecDeque<ScriptedReply>>,
    fallback: Option<ScriptedReply>,
    latency: Duration,
    calls: Mutex<Vec<ApiRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRequester {
    /// Creates an empty script. Calls fail with a connection error once the
    /// script runs out and no fallback is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply.
    pub fn then(self, reply: impl Into<ScriptedReply>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply.into());
        self
    }

    /// Queues a response with an empty body.
    pub fn then_status(self, status: u16) -> Self {
        self.then(ApiResponse::empty(status))
    }

    /// Queues a JSON response.
    pub fn then_json(self, status: u16, body: &serde_json::Value) -> Self {
        self.then(ApiResponse::json_body(status, body))
    }

    /// Reply used for every call after the queue is drained.
    pub fn repeat(mut self, reply: impl Into<ScriptedReply>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    /// Simulated latency for every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Calls currently awaiting their reply.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> ScriptedReply {
        let queued = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        queued
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| ScriptedReply::Connection("script exhausted".to_string()))
    }
}

/// Decrements the in-flight counter even if the call future is dropped.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Requester for ScriptedRequester {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.next_reply().into_result()
    }
}
