//! Fan-out executor.
//!
//! One request per target, all in flight at once, joined before anything is
//! classified. Responses are returned in target order, not completion order.

use std::time::Duration;

use futures::future::join_all;
use reqwest::{Method, StatusCode};
use tokio::time::{Instant, interval_at};
use tracing::{debug, instrument, warn};

use crate::connection::Connection;
use crate::error::QueryError;
use crate::host::http::HttpClient;

/// Interval between "still waiting" diagnostics for a slow target.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Targets
// ============================================================================

/// Which hosts a request is sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    /// The portal only.
    Portal,
    /// Every resolved engine.
    #[default]
    Engines,
}

/// A resolved request destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Name used in logs and errors.
    pub label: String,
    /// `host:port` the request goes to.
    pub authority: String,
}

/// Resolves the endpoints for a target.
///
/// # Errors
///
/// Returns [`QueryError::NotConnected`] if the target has no hosts.
pub fn endpoints(connection: &Connection, target: Target) -> Result<Vec<Endpoint>, QueryError> {
    let endpoints: Vec<Endpoint> = match target {
        Target::Portal => {
            let portal = connection.portal();
            if portal.host.is_empty() {
                Vec::new()
            } else {
                vec![Endpoint {
                    label: portal.to_string(),
                    authority: portal.to_string(),
                }]
            }
        }
        Target::Engines => connection
            .engines()
            .iter()
            .map(|engine| Endpoint {
                label: engine.label().to_string(),
                authority: engine.authority(connection.engine_port()),
            })
            .collect(),
    };

    if endpoints.is_empty() {
        return Err(QueryError::NotConnected);
    }
    Ok(endpoints)
}

// ============================================================================
// Execution
// ============================================================================

/// Body received from one endpoint.
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    /// Endpoint label.
    pub label: String,
    /// HTTP status.
    pub status: StatusCode,
    /// Response body.
    pub body: String,
}

/// Sends `path` to every endpoint of `target` and waits for all responses.
///
/// # Errors
///
/// Fails before any I/O for non-GET methods or an empty target. After the
/// join, a transport failure or rejected credentials on any endpoint fails
/// the batch.
pub async fn execute(
    connection: &Connection,
    path: &str,
    target: Target,
    method: &Method,
    timeout: Duration,
) -> Result<Vec<EndpointResponse>, QueryError> {
    execute_with_progress(connection, path, target, method, timeout, PROGRESS_INTERVAL).await
}

/// Like [`execute`], warning every `progress_interval` a request stays
/// pending.
///
/// # Errors
///
/// Same as [`execute`].
#[instrument(skip(connection, target, timeout, progress_interval), fields(target = ?target))]
pub async fn execute_with_progress(
    connection: &Connection,
    path: &str,
    target: Target,
    method: &Method,
    timeout: Duration,
    progress_interval: Duration,
) -> Result<Vec<EndpointResponse>, QueryError> {
    if *method != Method::GET {
        return Err(QueryError::UnsupportedMethod(method.to_string()));
    }

    let endpoints = endpoints(connection, target)?;
    debug!(count = endpoints.len(), "Fanning out request");

    let requests = endpoints.iter().map(|endpoint| {
        let url = connection.scheme().url(&endpoint.authority, path);
        fetch_with_progress(connection.http(), &endpoint.label, url, timeout, progress_interval)
    });

    join_all(requests).await.into_iter().collect()
}

/// Runs one request, logging a warning every `progress_interval` it stays
/// pending. The request itself is bounded only by `timeout`.
async fn fetch_with_progress(
    http: &HttpClient,
    label: &str,
    url: String,
    timeout: Duration,
    progress_interval: Duration,
) -> Result<EndpointResponse, QueryError> {
    let started = Instant::now();
    let request = http.get(&url, timeout);
    tokio::pin!(request);
    let mut progress = interval_at(started + progress_interval, progress_interval);

    let result = loop {
        tokio::select! {
            result = &mut request => break result,
            _ = progress.tick() => {
                warn!(
                    endpoint = %label,
                    elapsed_secs = started.elapsed().as_secs(),
                    timeout_secs = timeout.as_secs(),
                    "Still waiting for response"
                );
            }
        }
    };

    let response = result.map_err(|source| QueryError::Transport {
        target: label.to_string(),
        source,
    })?;

    if response.status == StatusCode::UNAUTHORIZED {
        return Err(QueryError::AuthenticationFailed {
            target: label.to_string(),
        });
    }

    debug!(
        endpoint = %label,
        status = %response.status,
        elapsed_ms = started.elapsed().as_millis(),
        "Endpoint answered"
    );

    Ok(EndpointResponse {
        label: label.to_string(),
        status: response.status,
        body: response.body,
    })
}
