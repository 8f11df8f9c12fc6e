//! Login flow errors.

use std::time::Duration;

use nextcloud_core::NextcloudError;
use nextcloud_fetch::{FetchError, PollError};
use thiserror::Error;

/// Login flow errors.
#[derive(Debug, Error)]
pub enum LoginFlowError {
    /// The user did not confirm in time. Calling the wait again with the
    /// same poll target resumes waiting.
    #[error("Login was not confirmed after {attempts} attempts ({elapsed:?})")]
    Timeout {
        /// Poll attempts made.
        attempts: u32,
        /// Time spent waiting.
        elapsed: Duration,
    },

    /// The wait was cancelled.
    #[error("Login cancelled")]
    Cancelled {
        /// Poll attempts made before cancellation.
        attempts: u32,
    },

    /// The server refused the poll with an error status.
    #[error("Login rejected: {0}")]
    Rejected(NextcloudError),

    /// A request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The poll interval was zero.
    #[error("Poll interval must be positive")]
    InvalidInterval,
}

impl LoginFlowError {
    /// Returns true if waiting again may still succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Rejected(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl From<PollError> for LoginFlowError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Timeout { attempts, elapsed } => Self::Timeout { attempts, elapsed },
            PollError::Cancelled { attempts, .. } => Self::Cancelled { attempts },
            PollError::UnexpectedStatus { status, reason } => {
                Self::Rejected(NextcloudError::from_status(status, reason))
            }
            PollError::Transport(e) => Self::Fetch(FetchError::Transport(e)),
            PollError::InvalidInterval => Self::InvalidInterval,
        }
    }
}

#[cfg(test)]
mod tests {
    use nextcloud_fetch::TransportError;

    use super::*;

    #[test]
    fn test_from_poll_error() {
        let err = LoginFlowError::from(PollError::Timeout {
            attempts: 61,
            elapsed: Duration::from_secs(60),
        });
        assert!(matches!(err, LoginFlowError::Timeout { attempts: 61, .. }));
        assert!(err.is_retryable());

        let err = LoginFlowError::from(PollError::UnexpectedStatus {
            status: 403,
            reason: String::new(),
        });
        assert!(matches!(
            err,
            LoginFlowError::Rejected(NextcloudError::Forbidden(_))
        ));
        assert!(!err.is_retryable());

        let err = LoginFlowError::from(PollError::Transport(TransportError::Timeout));
        assert!(matches!(
            err,
            LoginFlowError::Fetch(FetchError::Transport(TransportError::Timeout))
        ));
    }
}
