//! Server-side error taxonomy.

use thiserror::Error;

/// Errors reported by a Nextcloud server, or raised client-side before a
/// request is dispatched.
#[derive(Debug, Error)]
pub enum NextcloudError {
    /// 304 - content not modified.
    #[error("[304] Not modified")]
    NotModified,

    /// 400 - the request was invalid.
    #[error("[400] {0}")]
    BadRequest(String),

    /// 401 - the credentials were rejected.
    #[error("[401] {0}")]
    Unauthorized(String),

    /// 403 - the action is forbidden for this account.
    #[error("[403] {0}")]
    Forbidden(String),

    /// 404 - the object does not exist.
    #[error("[404] {0}")]
    NotFound(String),

    /// 405 - the method is not allowed for the object.
    #[error("[405] {0}")]
    MethodNotAllowed(String),

    /// 406 - the server does not support the request (e.g. federation disabled).
    #[error("[406] {0}")]
    NotSupported(String),

    /// 408 - the server timed out the request.
    #[error("[408] {0}")]
    RequestTimeout(String),

    /// 409 - the current state disallows the action.
    #[error("[409] {0}")]
    Conflict(String),

    /// 412 - a precondition of the action failed.
    #[error("[412] {0}")]
    PreconditionFailed(String),

    /// 422 - a remote federation peer failed.
    #[error("[422] {0}")]
    FederationRemote(String),

    /// 426 - the client must be upgraded.
    #[error("[426] {0}")]
    UpgradeRequired(String),

    /// 429 - rate limited.
    #[error("[429] {0}")]
    TooManyRequests(String),

    /// 503 - the service is unavailable.
    #[error("[503] {0}")]
    ServiceUnavailable(String),

    /// Any other unsuccessful status code.
    #[error("[{status}] {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason text from the server, if any.
        reason: String,
    },

    /// The server lacks a capability the operation requires.
    ///
    /// Raised client-side by the capability guard; no request is sent.
    #[error("Server does not support required capability: {0}")]
    NotCapable(String),

    /// The OCS envelope reported a failure despite a successful HTTP status.
    #[error("OCS error {statuscode}: {message}")]
    Ocs {
        /// OCS status code from `ocs.meta.statuscode`.
        statuscode: u16,
        /// Message from `ocs.meta.message`.
        message: String,
    },

    /// An argument was rejected before sending the request.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The response could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NextcloudError {
    /// Maps an unsuccessful HTTP status onto the error taxonomy.
    ///
    /// An empty `reason` is replaced by the standard description for the
    /// status code.
    pub fn from_status(status: u16, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            default_reason(status).to_string()
        } else {
            reason
        };

        match status {
            304 => Self::NotModified,
            400 => Self::BadRequest(reason),
            401 => Self::Unauthorized(reason),
            403 => Self::Forbidden(reason),
            404 => Self::NotFound(reason),
            405 => Self::MethodNotAllowed(reason),
            406 => Self::NotSupported(reason),
            408 => Self::RequestTimeout(reason),
            409 => Self::Conflict(reason),
            412 => Self::PreconditionFailed(reason),
            422 => Self::FederationRemote(reason),
            426 => Self::UpgradeRequired(reason),
            429 => Self::TooManyRequests(reason),
            503 => Self::ServiceUnavailable(reason),
            _ => Self::Status { status, reason },
        }
    }

    /// Returns the HTTP status code this error corresponds to, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotModified => Some(304),
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::MethodNotAllowed(_) => Some(405),
            Self::NotSupported(_) => Some(406),
            Self::RequestTimeout(_) => Some(408),
            Self::Conflict(_) => Some(409),
            Self::PreconditionFailed(_) => Some(412),
            Self::FederationRemote(_) => Some(422),
            Self::UpgradeRequired(_) => Some(426),
            Self::TooManyRequests(_) => Some(429),
            Self::ServiceUnavailable(_) => Some(503),
            Self::Status { status, .. } => Some(*status),
            Self::NotCapable(_)
            | Self::Ocs { .. }
            | Self::InvalidArgument(_)
            | Self::InvalidResponse(_)
            | Self::Serialization(_) => None,
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeout(_) | Self::TooManyRequests(_) | Self::ServiceUnavailable(_)
        )
    }
}

/// Standard description for a status code.
fn default_reason(status: u16) -> &'static str {
    match status {
        304 => "Not modified.",
        400 => "Bad request.",
        401 => "Invalid credentials.",
        403 => "Forbidden action due to permissions.",
        404 => "Object not found.",
        405 => "Method not allowed for object.",
        406 => "Federation not supported.",
        408 => "Request timed out.",
        409 => "Current state disallows the action.",
        412 => "Precondition of action failed.",
        422 => "Remote federation peer error.",
        426 => "Client software update is required.",
        429 => "Too many requests. Try again later.",
        503 => "Service is not available.",
        _ => "Unexpected response status.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_known_codes() {
        assert!(matches!(
            NextcloudError::from_status(401, ""),
            NextcloudError::Unauthorized(_)
        ));
        assert!(matches!(
            NextcloudError::from_status(404, "gone"),
            NextcloudError::NotFound(ref r) if r == "gone"
        ));
        assert!(matches!(
            NextcloudError::from_status(304, "ignored"),
            NextcloudError::NotModified
        ));
        assert!(matches!(
            NextcloudError::from_status(418, "teapot"),
            NextcloudError::Status { status: 418, .. }
        ));
    }

    #[test]
    fn test_empty_reason_uses_default() {
        let err = NextcloudError::from_status(429, "  ");
        assert_eq!(err.to_string(), "[429] Too many requests. Try again later.");
    }

    #[test]
    fn test_status_code_roundtrip() {
        for code in [400, 401, 403, 404, 405, 406, 408, 409, 412, 422, 426, 429, 503, 500] {
            assert_eq!(NextcloudError::from_status(code, "x").status_code(), Some(code));
        }
        assert_eq!(NextcloudError::NotCapable("avatar".into()).status_code(), None);
    }

    #[test]
    fn test_transient() {
        assert!(NextcloudError::from_status(503, "").is_transient());
        assert!(NextcloudError::from_status(429, "").is_transient());
        assert!(!NextcloudError::from_status(403, "").is_transient());
    }
}
