//! Fetch error types.

use std::time::Duration;

use nextcloud_core::NextcloudError;
use thiserror::Error;

// ============================================================================
// Transport Error
// ============================================================================

/// Failure below the HTTP status level: the request never produced a usable
/// response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request error from the HTTP client.
    #[error("Request error: {0}")]
    Request(reqwest::Error),

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Response body could not be decoded.
    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Request(err)
        }
    }
}

// ============================================================================
// Fetch Error
// ============================================================================

/// Error type for single-shot API requests.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not produce a response.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with an error.
    #[error("Nextcloud error: {0}")]
    Api(#[from] NextcloudError),

    /// The client was configured incorrectly.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FetchError {
    /// Returns the server-side error, if this is one.
    pub fn api_error(&self) -> Option<&NextcloudError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the server reported 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(NextcloudError::NotFound(_)))
    }

    /// Returns true if a capability check rejected the operation.
    pub fn is_not_capable(&self) -> bool {
        matches!(self, Self::Api(NextcloudError::NotCapable(_)))
    }
}

// ============================================================================
// Poll Error
// ============================================================================

/// Error type for confirmation polling.
#[derive(Debug, Error)]
pub enum PollError {
    /// The status stayed pending until the timeout elapsed.
    #[error("Confirmation still pending after {attempts} attempts ({elapsed:?})")]
    Timeout {
        /// Attempts made during the session.
        attempts: u32,
        /// Time since the session started.
        elapsed: Duration,
    },

    /// An attempt failed below the HTTP level.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a status that is neither pending nor success.
    #[error("Unexpected status {status}: {reason}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        reason: String,
    },

    /// The caller cancelled the session.
    #[error("Confirmation cancelled after {attempts} attempts")]
    Cancelled {
        /// Attempts made during the session.
        attempts: u32,
        /// Time since the session started.
        elapsed: Duration,
    },

    /// The poll interval was zero.
    #[error("Poll interval must be positive")]
    InvalidInterval,
}

impl PollError {
    /// Returns true if the session ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if the session was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Maps an unexpected status onto the server error taxonomy.
    pub fn to_api_error(&self) -> Option<NextcloudError> {
        match self {
            Self::UnexpectedStatus { status, reason } => {
                Some(NextcloudError::from_status(*status, reason.clone()))
            }
            _ => None,
        }
    }
}
