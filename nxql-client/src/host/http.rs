//! Authenticated HTTP client with tracing.
//!
//! One [`HttpClient`] is built per connection and reused for the directory
//! lookup and every query batch. It adds:
//! - Basic authentication on every request
//! - Per-client certificate verification policy
//! - Request/response tracing

use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode, header, header::HeaderValue};
use tracing::{debug, instrument, warn};

use crate::error::QueryError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User agent string.
const USER_AGENT: &str = concat!("nxql/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Credential
// ============================================================================

/// Username and secret sent as HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Account name.
    pub username: String,
    secret: String,
}

impl Credential {
    /// Creates a credential.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Returns the `Authorization` header value.
    pub fn basic_auth_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.secret));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Scheme
// ============================================================================

/// URL scheme used to reach the portal and engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    /// TLS, the only scheme real deployments serve.
    #[default]
    Https,
    /// Plain HTTP, for local test rigs and TLS-terminating proxies.
    Http,
}

impl Scheme {
    /// Returns the scheme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Http => "http",
        }
    }

    /// Builds an absolute URL from an authority and an absolute path.
    pub fn url(&self, authority: &str, path: &str) -> String {
        format!("{}://{}{}", self.as_str(), authority, path)
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response body as text.
    pub body: String,
}

/// HTTP client wrapper carrying the connection's credential.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    auth_header: HeaderValue,
    accepts_invalid_certs: bool,
}

impl HttpClient {
    /// Creates a client for a credential.
    ///
    /// When `skip_cert_validation` is set, certificate verification is
    /// disabled for this client only.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cannot form a header value or the
    /// TLS backend fails to initialize.
    pub fn new(
        credential: &Credential,
        timeout: Duration,
        skip_cert_validation: bool,
    ) -> Result<Self, QueryError> {
        if skip_cert_validation {
            warn!(
                "Certificate validation is disabled for this connection; \
                 traffic can be intercepted by anyone on the network path"
            );
        }

        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(skip_cert_validation)
            .build()?;

        let mut auth_header = HeaderValue::from_str(&credential.basic_auth_header())
            .map_err(|e| QueryError::Encoding(format!("Invalid credential: {e}")))?;
        auth_header.set_sensitive(true);

        Ok(Self {
            inner,
            auth_header,
            accepts_invalid_certs: skip_cert_validation,
        })
    }

    /// Returns true if certificate verification is disabled.
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accepts_invalid_certs
    }

    /// Performs an authenticated GET request and reads the body.
    ///
    /// Non-success statuses are returned, not raised: error pages carry
    /// information the classifier needs.
    #[instrument(skip(self, url, timeout), fields(url = %url))]
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, reqwest::Error> {
        debug!("GET request");

        let response = self
            .inner
            .get(url)
            .header(header::AUTHORIZATION, self.auth_header.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, len = body.len(), "Response received");

        Ok(HttpResponse { status, body })
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("accepts_invalid_certs", &self.accepts_invalid_certs)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
