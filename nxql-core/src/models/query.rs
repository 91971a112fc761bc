//! Query requests and structured error detail.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// Default request timeout for a query batch.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Query Request
// ============================================================================

/// A single NXQL query, fanned out to every engine.
///
/// Platforms keep their input order; adding a platform twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// The NXQL query text. Not validated client-side.
    pub nxql: String,
    /// Platform filters, in the order they were added.
    pub platforms: Vec<Platform>,
    /// Positional parameters, sent as `p1`, `p2`, ...
    pub parameters: Vec<String>,
    /// Request timeout applied to each engine request.
    pub timeout: Duration,
}

impl QueryRequest {
    /// Creates a request with no filters, no parameters and the default timeout.
    pub fn new(nxql: impl Into<String>) -> Self {
        Self {
            nxql: nxql.into(),
            platforms: Vec::new(),
            parameters: Vec::new(),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Adds a platform filter.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        if !self.platforms.contains(&platform) {
            self.platforms.push(platform);
        }
        self
    }

    /// Adds several platform filters, in order.
    #[must_use]
    pub fn with_platforms(self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        platforms.into_iter().fold(self, Self::with_platform)
    }

    /// Appends a positional parameter.
    #[must_use]
    pub fn with_parameter(mut self, value: impl Into<String>) -> Self {
        self.parameters.push(value.into());
        self
    }

    /// Appends several positional parameters, in order.
    #[must_use]
    pub fn with_parameters<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters.extend(values.into_iter().map(Into::into));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Field List Request
// ============================================================================

/// Input to field-list discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldListRequest {
    /// Table (object) whose fields are listed, e.g. `device`.
    pub table: String,
    /// Aggregate table (event) to compute over, e.g. `execution`.
    pub aggregate_table: Option<String>,
    /// Platform the probe query runs against.
    pub platform: Platform,
    /// List dynamic fields (categories and scores) instead of static ones.
    pub dynamic: bool,
}

impl FieldListRequest {
    /// Creates a request for the static fields of a table on Windows.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            aggregate_table: None,
            platform: Platform::default(),
            dynamic: false,
        }
    }

    /// Lists the fields computable from an aggregate table instead.
    #[must_use]
    pub fn with_aggregate(mut self, aggregate_table: impl Into<String>) -> Self {
        self.aggregate_table = Some(aggregate_table.into());
        self
    }

    /// Sets the platform.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Lists dynamic fields.
    #[must_use]
    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }
}

// ============================================================================
// Error Detail
// ============================================================================

/// Structured error parsed out of a backend HTML error page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetail {
    /// The error message text.
    #[serde(rename = "Error")]
    pub message: String,
    /// Suggested valid names (fields, tables), when the backend lists them.
    #[serde(default)]
    pub options: Vec<String>,
}

impl ErrorDetail {
    /// Creates an error detail without options.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            options: Vec::new(),
        }
    }

    /// Returns true if the backend suggested valid options.
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}
