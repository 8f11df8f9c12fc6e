//! Client context shared by all API modules.
//!
//! A [`NextcloudClient`] bundles the server endpoint, optional credentials,
//! settings and the [`Requester`] used for every call. API modules borrow it
//! and build requests through the helpers here so that OCS headers, basic
//! auth and status mapping are applied consistently.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;
use crate::host::http::{HttpRequester, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::ocs::{self, OCS_API_HEADER};
use crate::poll::PollingConfirmation;
use crate::transport::{ApiRequest, ApiResponse, Method, Payload, Requester};

// ============================================================================
// Client Settings
// ============================================================================

/// Timing and identification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
    /// How long to wait for a login to be confirmed.
    pub login_timeout: Duration,
    /// Delay between login confirmation polls.
    pub poll_interval: Duration,
    /// User agent for requests and for naming the generated app password.
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            login_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Basic auth credentials. The password is an account or app password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub user: String,
    /// Password. Never logged.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Nextcloud Client
// ============================================================================

/// Connection to one Nextcloud server.
pub struct NextcloudClient {
    endpoint: String,
    credentials: Option<Credentials>,
    settings: ClientSettings,
    requester: Arc<dyn Requester>,
    pub(crate) capabilities: OnceCell<Value>,
}

impl NextcloudClient {
    /// Creates a builder for the given server URL.
    pub fn builder(endpoint: impl Into<String>) -> NextcloudClientBuilder {
        NextcloudClientBuilder::new(endpoint)
    }

    /// Server base URL without trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Absolute URL for a server path starting with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Configured credentials, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Client settings.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Shared requester.
    pub fn requester(&self) -> Arc<dyn Requester> {
        Arc::clone(&self.requester)
    }

    /// Creates a confirmation poller over this client's requester.
    pub fn poller(&self) -> PollingConfirmation {
        PollingConfirmation::new(self.requester())
    }

    /// Adds basic auth if credentials are configured.
    pub fn authenticated(&self, request: ApiRequest) -> ApiRequest {
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.user, &creds.password),
            None => request,
        }
    }

    /// Sends a request as-is.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if no response was received.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        Ok(self.requester.call(request).await?)
    }

    /// Sends a request and maps non-2xx statuses onto errors.
    ///
    /// # Errors
    ///
    /// Transport errors, or [`FetchError::Api`] for an unsuccessful status.
    pub async fn send_checked(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let response = self.send(request).await?;
        ocs::check_status(&response)?;
        Ok(response)
    }

    /// Calls an OCS endpoint and returns `ocs.data`.
    ///
    /// # Errors
    ///
    /// Transport errors, status errors, or an OCS failure in the envelope.
    #[instrument(skip(self, params))]
    pub async fn ocs(&self, method: Method, path: &str, params: Value) -> Result<Value, FetchError> {
        let request = self.authenticated(ocs::ocs_request(method, self.url(path), params));
        let response = self.send(&request).await?;
        debug!(status = response.status, "OCS response");
        Ok(ocs::parse_envelope(&response)?)
    }

    /// Calls an OCS endpoint with an arbitrary body (e.g. a file upload).
    ///
    /// # Errors
    ///
    /// As [`ocs`](Self::ocs).
    #[instrument(skip(self, payload))]
    pub async fn ocs_payload(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<Value, FetchError> {
        let request = self.authenticated(
            ApiRequest::new(method, self.url(path))
                .header(OCS_API_HEADER, "true")
                .header("Accept", "application/json")
                .query("format", "json")
                .payload(payload),
        );
        let response = self.send(&request).await?;
        debug!(status = response.status, "OCS response");
        Ok(ocs::parse_envelope(&response)?)
    }

    /// Fetches a binary resource from an OCS route (e.g. an avatar image).
    ///
    /// # Errors
    ///
    /// Transport errors, or a status error.
    #[instrument(skip(self, params))]
    pub async fn ocs_bytes(&self, path: &str, params: Value) -> Result<Vec<u8>, FetchError> {
        let mut request = ocs::ocs_request(Method::GET, self.url(path), params);
        // Image bodies
        request = request.header("Accept", "*/*");
        let response = self.send_checked(&self.authenticated(request)).await?;
        debug!(bytes = response.body.len(), "Binary response");
        Ok(response.body)
    }
}

impl fmt::Debug for NextcloudClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NextcloudClient")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client Builder
// ============================================================================

/// Builder for [`NextcloudClient`].
pub struct NextcloudClientBuilder {
    endpoint: String,
    credentials: Option<Credentials>,
    settings: ClientSettings,
    requester: Option<Arc<dyn Requester>>,
}

impl NextcloudClientBuilder {
    /// Creates a builder for the given server URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials: None,
            settings: ClientSettings::default(),
            requester: None,
        }
    }

    /// Sets basic auth credentials.
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(user, password));
        self
    }

    /// Replaces all settings.
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.user_agent = user_agent.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.settings.request_timeout = timeout;
        self
    }

    /// Sets the login confirmation timeout.
    pub fn login_timeout(mut self, timeout: Duration) -> Self {
        self.settings.login_timeout = timeout;
        self
    }

    /// Sets the login poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.settings.poll_interval = interval;
        self
    }

    /// Uses a custom requester instead of the HTTP one.
    pub fn requester(mut self, requester: Arc<dyn Requester>) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] if the endpoint is not an
    /// absolute http(s) URL, or a transport error if the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<NextcloudClient, FetchError> {
        let parsed = Url::parse(self.endpoint.trim())
            .map_err(|e| FetchError::InvalidConfig(format!("invalid server URL: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(FetchError::InvalidConfig(format!(
                "server URL must be http(s) with a host: {}",
                self.endpoint
            )));
        }

        let requester = match self.requester {
            Some(requester) => requester,
            None => Arc::new(HttpRequester::with_options(
                self.settings.request_timeout,
                &self.settings.user_agent,
            )?),
        };

        Ok(NextcloudClient {
            endpoint: parsed.as_str().trim_end_matches('/').to_string(),
            credentials: self.credentials,
            settings: self.settings,
            requester,
            capabilities: OnceCell::new(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
