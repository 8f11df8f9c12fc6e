//! Login flow v2 requests.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument};

use nextcloud_core::{LoginCredentials, LoginFlowStart, LoginPoll};
use nextcloud_fetch::{
    ApiRequest, CancellationToken, FetchError, Method, NextcloudClient, PollRequest,
};

use super::error::LoginFlowError;

// ============================================================================
// Constants
// ============================================================================

/// Route that starts a login flow.
const INITIATE_PATH: &str = "/index.php/login/v2";

/// OCS route that revokes the app password in use.
const APP_PASSWORD_PATH: &str = "/ocs/v2.php/core/apppassword";

// ============================================================================
// Login Flow
// ============================================================================

/// Browser-confirmed login that yields an app password.
///
/// 1. [`initiate`](Self::initiate) returns a login URL and a poll target
/// 2. The user opens the URL and approves the login
/// 3. [`wait_for_confirmation`](Self::wait_for_confirmation) polls until the
///    server hands out the credentials
#[derive(Debug, Clone, Copy)]
pub struct LoginFlow<'a> {
    client: &'a NextcloudClient,
}

impl<'a> LoginFlow<'a> {
    /// Creates a login flow against the client's server.
    pub fn new(client: &'a NextcloudClient) -> Self {
        Self { client }
    }

    /// Starts a login flow.
    ///
    /// The user agent names the app password the server creates; the
    /// client's configured agent is used when `None`.
    ///
    /// # Errors
    ///
    /// Request errors, or a decode error if the response is malformed.
    #[instrument(skip(self))]
    pub async fn initiate(&self, user_agent: Option<&str>) -> Result<LoginFlowStart, LoginFlowError> {
        let user_agent = user_agent.unwrap_or(&self.client.settings().user_agent);
        let request =
            ApiRequest::post(self.client.url(INITIATE_PATH)).header("User-Agent", user_agent);

        let response = self.client.send_checked(&request).await?;
        let start: LoginFlowStart = response.json().map_err(FetchError::from)?;

        debug!(poll_endpoint = %start.poll.endpoint, "Login flow started");
        Ok(start)
    }

    /// Waits for the user to confirm, polling every `interval`.
    ///
    /// A timeout leaves the flow open on the server; calling this again with
    /// the same `poll` keeps waiting.
    ///
    /// # Errors
    ///
    /// [`LoginFlowError::Timeout`] if the user did not confirm in time, or
    /// the first fatal poll error.
    #[instrument(skip(self, poll))]
    pub async fn wait_for_confirmation(
        &self,
        poll: &LoginPoll,
        timeout: Duration,
        interval: Duration,
    ) -> Result<LoginCredentials, LoginFlowError> {
        let credentials: LoginCredentials = self
            .client
            .poller()
            .wait_for_confirmation(&Self::poll_request(poll), timeout, interval)
            .await?;

        info!(login_name = %credentials.login_name, "Login confirmed");
        Ok(credentials)
    }

    /// Like [`wait_for_confirmation`](Self::wait_for_confirmation), but
    /// returns [`LoginFlowError::Cancelled`] once `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`wait_for_confirmation`](Self::wait_for_confirmation), plus
    /// cancellation.
    #[instrument(skip(self, poll, cancel))]
    pub async fn wait_for_confirmation_until_cancelled(
        &self,
        poll: &LoginPoll,
        timeout: Duration,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<LoginCredentials, LoginFlowError> {
        let credentials: LoginCredentials = self
            .client
            .poller()
            .wait_for_confirmation_until_cancelled(&Self::poll_request(poll), timeout, interval, cancel)
            .await?;

        info!(login_name = %credentials.login_name, "Login confirmed");
        Ok(credentials)
    }

    /// Waits using the client's configured timeout and interval.
    ///
    /// # Errors
    ///
    /// As [`wait_for_confirmation`](Self::wait_for_confirmation).
    pub async fn wait_with_defaults(
        &self,
        poll: &LoginPoll,
    ) -> Result<LoginCredentials, LoginFlowError> {
        let settings = self.client.settings();
        self.wait_for_confirmation(poll, settings.login_timeout, settings.poll_interval)
            .await
    }

    /// Revokes the app password the client is authenticated with.
    ///
    /// # Errors
    ///
    /// Request or OCS errors.
    #[instrument(skip(self))]
    pub async fn destroy_app_password(&self) -> Result<(), LoginFlowError> {
        self.client
            .ocs(Method::DELETE, APP_PASSWORD_PATH, Value::Null)
            .await?;
        info!("App password revoked");
        Ok(())
    }

    fn poll_request(poll: &LoginPoll) -> PollRequest {
        PollRequest::new(
            poll.token.as_str(),
            ApiRequest::post(poll.endpoint.as_str()).form([("token", poll.token.as_str())]),
        )
    }
}
