//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The settings key does not exist.
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    /// The value is not valid for the key.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Settings key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if the settings file is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
