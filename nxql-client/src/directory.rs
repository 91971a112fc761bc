//! Engine directory resolver.
//!
//! The portal lists its engines at a single configuration endpoint:
//!
//! ```text
//! GET https://<portal>:<port>/api/configuration/v1/engines
//! Authorization: Basic <base64(user:password)>
//! ```
//!
//! ```json
//! [
//!   {"address": "engine-1.corp.local", "name": "EMEA"},
//!   {"address": "engine-2.corp.local:1671"}
//! ]
//! ```

use std::time::Duration;

use nxql_core::Engine;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::connection::PortalAddress;
use crate::error::QueryError;
use crate::host::http::{HttpClient, Scheme};

/// Engine listing endpoint.
pub const ENGINES_ENDPOINT: &str = "/api/configuration/v1/engines";

/// Fetches the engine list from the portal.
///
/// # Errors
///
/// Every failure, including an empty list, is reported as
/// [`QueryError::DirectoryUnavailable`].
#[instrument(skip(http, portal, timeout), fields(portal = %portal))]
pub async fn resolve_engines(
    http: &HttpClient,
    scheme: Scheme,
    portal: &PortalAddress,
    timeout: Duration,
) -> Result<Vec<Engine>, QueryError> {
    let url = scheme.url(&portal.to_string(), ENGINES_ENDPOINT);
    debug!(url = %url, "Resolving engines");

    let response = http
        .get(&url, timeout)
        .await
        .map_err(|e| QueryError::DirectoryUnavailable(format!("request to {portal} failed: {e}")))?;

    if response.status == StatusCode::UNAUTHORIZED || response.status == StatusCode::FORBIDDEN {
        return Err(QueryError::DirectoryUnavailable(format!(
            "credentials rejected by {portal} ({})",
            response.status
        )));
    }

    if !response.status.is_success() {
        warn!(status = %response.status, "Engine listing failed");
        return Err(QueryError::DirectoryUnavailable(format!(
            "{portal} returned status {}",
            response.status
        )));
    }

    let engines = parse_engine_list(&response.body)?;
    debug!(count = engines.len(), "Engines resolved");
    Ok(engines)
}

/// Parses an engine listing body; an empty list is an error.
///
/// # Errors
///
/// Returns [`QueryError::DirectoryUnavailable`] for invalid JSON or an
/// empty list.
pub fn parse_engine_list(body: &str) -> Result<Vec<Engine>, QueryError> {
    let engines: Vec<Engine> = serde_json::from_str(body)
        .map_err(|e| QueryError::DirectoryUnavailable(format!("invalid engine listing: {e}")))?;

    if engines.is_empty() {
        return Err(QueryError::DirectoryUnavailable(
            "portal returned no engines".to_string(),
        ));
    }

    Ok(engines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_list_keeps_order() {
        let body = r#"[{"address":"e2.corp.local"},{"address":"e1.corp.local","name":"one"}]"#;
        let engines = parse_engine_list(body).unwrap();
        assert_eq!(engines[0].address, "e2.corp.local");
        assert_eq!(engines[1].label(), "one");
    }

    #[test]
    fn test_empty_engine_list_is_unavailable() {
        let err = parse_engine_list("[]").unwrap_err();
        assert!(matches!(err, QueryError::DirectoryUnavailable(_)));
    }

    #[test]
    fn test_html_engine_list_is_unavailable() {
        let err = parse_engine_list("<html><body>Login</body></html>").unwrap_err();
        assert!(err.to_string().contains("invalid engine listing"));
    }
}
