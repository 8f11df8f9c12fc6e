//! reqwest-backed [`Requester`] with tracing and a domain allowlist.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, multipart, Client, RequestBuilder};
use tracing::{debug, instrument};
use url::Url;

use crate::error::TransportError;
use crate::transport::{ApiRequest, ApiResponse, Payload, Requester};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent when the caller does not choose one.
pub const DEFAULT_USER_AGENT: &str = concat!("nextcloud-rs/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Requester
// ============================================================================

/// Production transport: one reqwest call per [`ApiRequest`], no retries.
#[derive(Debug, Clone)]
pub struct HttpRequester {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpRequester {
    /// Creates a requester with the default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_options(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Creates a requester with a custom timeout and user agent.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            inner,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), TransportError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(());
        };

        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| TransportError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(TransportError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Translates an [`ApiRequest`] into a reqwest builder.
    fn build_request(&self, request: &ApiRequest) -> Result<RequestBuilder, TransportError> {
        self.is_domain_allowed(&request.url)?;

        let mut builder = self.inner.request(request.method.clone(), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some((user, password)) = &request.basic_auth {
            builder = builder.basic_auth(user, Some(password));
        }

        builder = match &request.payload {
            Payload::Empty => builder,
            Payload::Form(fields) => builder.form(fields),
            Payload::Json(body) => builder.json(body),
            Payload::File {
                field,
                file_name,
                content_type,
                bytes,
            } => {
                let mut part = multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = content_type {
                    part = part.mime_str(mime)?;
                }
                builder.multipart(multipart::Form::new().part(field.clone(), part))
            }
        };

        Ok(builder)
    }

    /// Returns the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Requester for HttpRequester {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let response = self.build_request(request)?.send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(status, bytes = body.len(), "Response received");

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn requester() -> HttpRequester {
        HttpRequester::new().unwrap()
    }

    #[test]
    fn test_domain_allowlist() {
        let client = requester().with_allowed_domains(vec![
            "cloud.example.com".to_string(),
            "nextcloud.org".to_string(),
        ]);

        assert!(client.is_domain_allowed("https://cloud.example.com/ocs/v2.php").is_ok());
        assert!(client.is_domain_allowed("https://nextcloud.org").is_ok());

        // Subdomain matching
        assert!(client.is_domain_allowed("https://demo.nextcloud.org").is_ok());

        assert!(matches!(
            client.is_domain_allowed("https://evil.com/steal"),
            Err(TransportError::DomainNotAllowed(_))
        ));
        assert!(matches!(
            client.is_domain_allowed("not-a-valid-url"),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_no_domain_restrictions() {
        assert!(requester().is_domain_allowed("https://any.domain.com").is_ok());
    }

    #[test]
    fn test_build_form_request() {
        let request = ApiRequest::post("https://cloud.example.com/login/v2/poll")
            .form([("token", "abc")]);
        let built = requester().build_request(&request).unwrap().build().unwrap();

        assert_eq!(built.method(), reqwest::Method::POST);
        assert_eq!(
            built.headers()[header::CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(built.body().and_then(|b| b.as_bytes()), Some(&b"token=abc"[..]));
    }

    #[test]
    fn test_build_ocs_get_request() {
        let request = ApiRequest::get("https://cloud.example.com/ocs/v1.php/cloud/capabilities")
            .query("format", "json")
            .header("OCS-APIRequest", "true")
            .basic_auth("alice", "secret");
        let built = requester().build_request(&request).unwrap().build().unwrap();

        assert_eq!(built.url().query(), Some("format=json"));
        assert_eq!(built.headers()["ocs-apirequest"], "true");
        let auth = built.headers()[header::AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("Basic "));
    }

    #[test]
    fn test_build_multipart_request() {
        let request = ApiRequest::post("https://cloud.example.com/avatar").payload(Payload::File {
            field: "file".to_string(),
            file_name: "avatar.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        });
        let built = requester().build_request(&request).unwrap().build().unwrap();

        let content_type = built.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn test_invalid_mime_is_rejected() {
        let request = ApiRequest::post("https://cloud.example.com/avatar").payload(Payload::File {
            field: "file".to_string(),
            file_name: "avatar.png".to_string(),
            content_type: Some("not a mime".to_string()),
            bytes: Vec::new(),
        });
        assert!(requester().build_request(&request).is_err());
    }
}
