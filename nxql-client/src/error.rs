//! Query error types.

use nxql_core::ErrorDetail;
use thiserror::Error;

// ============================================================================
// Query Error
// ============================================================================

/// Error type for connect and query operations.
///
/// `NotConnected`, `InvalidHost` and `UnsupportedMethod` are raised before
/// any network I/O. The response errors abort the whole batch: no partial
/// aggregation is ever returned alongside them.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No active connection, or no engines resolved for it.
    #[error("Not connected: call connect() with a portal host first")]
    NotConnected,

    /// Portal host could not be parsed.
    #[error("Invalid portal host: {0}")]
    InvalidHost(String),

    /// The portal's engine listing failed or was empty.
    #[error("Engine directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// Only GET is implemented.
    #[error("HTTP method not implemented: {0}")]
    UnsupportedMethod(String),

    /// The backend rejected the query with an error page.
    #[error("{}", format_backend_error(.0))]
    BackendQuery(ErrorDetail),

    /// Body was neither JSON nor a recognizable error page.
    #[error("Unexpected response from {target}: {reason}")]
    UnexpectedResponse {
        /// Portal or engine that sent the response.
        target: String,
        /// Why the body could not be used.
        reason: String,
    },

    /// Body looked like HTML but carried no error element.
    #[error("Unexpected HTML response from {target}: no error message found")]
    MalformedHtmlResponse {
        /// Portal or engine that sent the response.
        target: String,
    },

    /// Credentials were rejected.
    #[error("Authentication failed at {target}")]
    AuthenticationFailed {
        /// Portal or engine that rejected the credentials.
        target: String,
    },

    /// Request to a target failed at the transport level (includes timeouts).
    #[error("Request to {target} failed: {source}")]
    Transport {
        /// Portal or engine the request was sent to.
        target: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request path or header could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl QueryError {
    /// Returns the backend's error detail, if this is a backend query error.
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Self::BackendQuery(detail) => Some(detail),
            _ => None,
        }
    }
}

fn format_backend_error(detail: &ErrorDetail) -> String {
    if detail.options.is_empty() {
        format!("Query rejected by backend: {}", detail.message)
    } else {
        format!(
            "Query rejected by backend: {} (options: {})",
            detail.message,
            detail.options.join(", ")
        )
    }
}
