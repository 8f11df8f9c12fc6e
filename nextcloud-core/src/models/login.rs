//! Login flow v2 types.
//!
//! The login flow is a server-mediated handshake: the client initiates it,
//! the user approves the login in a browser, and the client polls until the
//! server hands out an app password.
//!
//! - [`LoginFlowStart`] - Initiation response
//! - [`LoginPoll`] - Where and with what token to poll
//! - [`LoginCredentials`] - Result of a confirmed login

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Login Flow Start
// ============================================================================

/// Response of `POST /index.php/login/v2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFlowStart {
    /// Polling target for confirmation.
    pub poll: LoginPoll,
    /// URL the user must open to approve the login.
    pub login: String,
}

// ============================================================================
// Login Poll
// ============================================================================

/// Token and endpoint used to poll for login confirmation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPoll {
    /// Poll token. Treat as secret.
    pub token: String,
    /// Absolute poll endpoint URL.
    pub endpoint: String,
}

impl LoginPoll {
    /// Builds a poll target for `server` when only the token is known.
    pub fn for_server(server: &str, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: format!("{}/login/v2/poll", server.trim_end_matches('/')),
        }
    }
}

impl fmt::Debug for LoginPoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPoll")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// ============================================================================
// Login Credentials
// ============================================================================

/// Credentials returned once the user confirms the login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    /// Server base URL to use with these credentials.
    pub server: String,
    /// Login name of the confirming user.
    pub login_name: String,
    /// Generated app password.
    pub app_password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("server", &self.server)
            .field("login_name", &self.login_name)
            .field("app_password", &"<redacted>")
            .finish()
    }
}
