//! Transport seam between API modules and the network.
//!
//! Every request in this workspace is described by an [`ApiRequest`] and
//! executed by a [`Requester`]. The production implementation is
//! [`crate::host::http::HttpRequester`]; tests substitute their own.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::TransportError;

pub use reqwest::Method;

/// Longest body excerpt carried in error messages.
const REASON_EXCERPT_LEN: usize = 200;

// ============================================================================
// Payload
// ============================================================================

/// Request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// JSON document.
    Json(serde_json::Value),
    /// Single file as `multipart/form-data`.
    File {
        /// Form field name.
        field: String,
        /// File name reported to the server.
        file_name: String,
        /// MIME type, if known.
        content_type: Option<String>,
        /// File content.
        bytes: Vec<u8>,
    },
}

// ============================================================================
// Request
// ============================================================================

/// One network call: method, URL, headers, credentials and body.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL without query string.
    pub url: String,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Basic auth user and password.
    pub basic_auth: Option<(String, String)>,
    /// Request body.
    pub payload: Payload,
}

impl ApiRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            basic_auth: None,
            payload: Payload::Empty,
        }
    }

    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Creates a DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Adds a header, replacing an existing one with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Appends a query string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets basic auth credentials.
    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((user.into(), password.into()));
        self
    }

    /// Sets a form body.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.payload = Payload::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    /// Sets any body.
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Looks up a header value, case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a query value.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a form field value.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        match &self.payload {
            Payload::Form(fields) => fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field(
                "basic_auth",
                &self.basic_auth.as_ref().map(|(user, _)| (user, "<redacted>")),
            )
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Response
// ============================================================================

/// Status, content type and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Creates a response with a raw body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// Creates a response with an empty body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    /// Creates a JSON response.
    pub fn json_body(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Decode`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns a short, trimmed excerpt of the body for error messages.
    pub fn reason_excerpt(&self) -> String {
        let text = self.text();
        let text = text.trim();
        match text.char_indices().nth(REASON_EXCERPT_LEN) {
            Some((idx, _)) => format!("{}…", &text[..idx]),
            None => text.to_string(),
        }
    }
}

// ============================================================================
// Requester Trait
// ============================================================================

/// Performs a single network call.
///
/// Implementations must be safe to share across concurrent sessions and must
/// not retry internally: one call yields one outcome.
#[async_trait]
pub trait Requester: Send + Sync {
    /// Sends the request and returns the response, whatever its status.
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[async_trait]
impl<R: Requester + ?Sized> Requester for Arc<R> {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).call(request).await
    }
}

// ============================================================================
// Tests
// ============================================================================
