//! Field-list and data-model discovery.
//!
//! The backend has no metadata endpoint. Field lists are obtained by sending
//! a query that references a field which cannot exist and reading the valid
//! alternatives out of the error page the engine answers with. That
//! technique lives in [`ErrorPageCatalog`]; everything else only sees
//! [`FieldCatalog`].

use std::collections::BTreeMap;

use futures::future::join_all;
use nxql_core::{FieldCatalog, FieldListRequest, Platform, QueryRequest};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::classifier::{self, ErrorMode, QueryOutput};
use crate::connection::Connection;
use crate::encoder;
use crate::error::QueryError;
use crate::fanout::{self, Target};

/// Field name that no NXQL table defines.
pub const PROBE_FIELD: &str = "nxql_field_catalog_probe";

/// Object tables included in the data model.
pub const BUILTIN_TABLES: &[&str] = &[
    "device",
    "user",
    "application",
    "binary",
    "executable",
    "package",
    "port",
    "printer",
    "domain",
    "destination",
    "service",
];

// ============================================================================
// Probe Queries
// ============================================================================

/// Builds the deliberately invalid query for a field-list request.
pub fn probe_query(request: &FieldListRequest) -> String {
    let table = &request.table;

    match &request.aggregate_table {
        Some(aggregate) => format!(
            "(select (id) (from {table} (with {aggregate} (compute {PROBE_FIELD}) (between now-1d now))) (limit 1))"
        ),
        None if request.dynamic => {
            format!("(select (#\"{PROBE_FIELD}\") (from {table}) (limit 1))")
        }
        None => format!("(select ({PROBE_FIELD}) (from {table}) (limit 1))"),
    }
}

// ============================================================================
// Error Page Catalog
// ============================================================================

/// [`FieldCatalog`] that reads field lists from engine error pages.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPageCatalog<'a> {
    connection: &'a Connection,
}

impl<'a> ErrorPageCatalog<'a> {
    /// Creates a catalog backed by `connection`'s engines.
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }
}

impl FieldCatalog for ErrorPageCatalog<'_> {
    type Error = QueryError;

    #[instrument(skip(self, request), fields(table = %request.table))]
    async fn describe_table(&self, request: &FieldListRequest) -> Result<Vec<String>, QueryError> {
        let query = QueryRequest::new(probe_query(request)).with_platform(request.platform);
        let path = encoder::encode_query_path(&query);

        let responses = fanout::execute(
            self.connection,
            &path,
            Target::Engines,
            &Method::GET,
            query.timeout,
        )
        .await?;

        let output = classifier::aggregate(
            responses.iter().map(|r| (r.label.as_str(), r.body.as_str())),
            ErrorMode::Structured,
        )?;

        match output {
            QueryOutput::Error(detail) if detail.has_options() => {
                debug!(count = detail.options.len(), "Field list discovered");
                Ok(detail.options)
            }
            // Rejected for another reason, e.g. an unknown table.
            QueryOutput::Error(detail) => Err(QueryError::BackendQuery(detail)),
            QueryOutput::Records(_) => Err(QueryError::UnexpectedResponse {
                target: "engines".to_string(),
                reason: format!("probe query on {} returned records", request.table),
            }),
        }
    }
}

// ============================================================================
// Data Model
// ============================================================================

/// Field lists of the built-in object tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DataModel {
    /// Table name to field names.
    pub tables: BTreeMap<String, Vec<String>>,
}

impl DataModel {
    /// Describes every table in [`BUILTIN_TABLES`] for `platform`.
    ///
    /// Tables the catalog cannot describe are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first table's error only if no table could be described.
    pub async fn discover<C: FieldCatalog>(
        catalog: &C,
        platform: Platform,
    ) -> Result<Self, C::Error> {
        let requests: Vec<FieldListRequest> = BUILTIN_TABLES
            .iter()
            .map(|table| FieldListRequest::new(*table).with_platform(platform))
            .collect();

        let results = join_all(requests.iter().map(|r| catalog.describe_table(r))).await;

        let mut model = Self::default();
        let mut first_error = None;

        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(fields) => {
                    model.tables.insert(request.table.clone(), fields);
                }
                Err(e) => {
                    warn!(table = %request.table, error = %e, "Skipping table");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if model.tables.is_empty() => Err(e),
            _ => Ok(model),
        }
    }

    /// Fields of `table`, if it was described.
    pub fn fields(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Number of described tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no table was described.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use nxql_core::ErrorDetail;

    use super::*;

    #[test]
    fn test_plain_probe() {
        let request = FieldListRequest::new("device");
        assert_eq!(
            probe_query(&request),
            "(select (nxql_field_catalog_probe) (from device) (limit 1))"
        );
    }

    #[test]
    fn test_dynamic_probe() {
        let request = FieldListRequest::new("user").dynamic(true);
        assert_eq!(
            probe_query(&request),
            "(select (#\"nxql_field_catalog_probe\") (from user) (limit 1))"
        );
    }

    #[test]
    fn test_aggregate_probe_ignores_dynamic() {
        let request = FieldListRequest::new("device")
            .with_aggregate("execution")
            .dynamic(true);
        assert_eq!(
            probe_query(&request),
            "(select (id) (from device (with execution (compute nxql_field_catalog_probe) (between now-1d now))) (limit 1))"
        );
    }

    /// Catalog that knows a fixed set of tables.
    struct StaticCatalog(BTreeMap<&'static str, Vec<String>>);

    impl FieldCatalog for StaticCatalog {
        type Error = QueryError;

        async fn describe_table(&self, request: &FieldListRequest) -> Result<Vec<String>, QueryError> {
            self.0
                .get(request.table.as_str())
                .cloned()
                .ok_or_else(|| QueryError::BackendQuery(ErrorDetail::new("Unknown table")))
        }
    }

    #[tokio::test]
    async fn test_discover_skips_failing_tables() {
        let catalog = StaticCatalog(BTreeMap::from([
            ("device", vec!["name".to_string(), "platform".to_string()]),
            ("user", vec!["name".to_string()]),
        ]));

        let model = DataModel::discover(&catalog, Platform::Windows).await.unwrap();
        assert_eq!(model.len(), 2);
        assert_eq!(model.fields("device").unwrap(), ["name", "platform"]);
        assert!(model.fields("printer").is_none());
    }

    #[tokio::test]
    async fn test_discover_fails_when_nothing_is_described() {
        let catalog = StaticCatalog(BTreeMap::new());
        let err = DataModel::discover(&catalog, Platform::Windows).await.unwrap_err();
        assert!(matches!(err, QueryError::BackendQuery(_)));
    }

    #[test]
    fn test_data_model_serializes_as_mapping() {
        let mut model = DataModel::default();
        model.tables.insert("device".to_string(), vec!["name".to_string()]);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#"{"device":["name"]}"#);
    }
}
