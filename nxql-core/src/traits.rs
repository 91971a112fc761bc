//! Trait definitions for the NXQL client.

use std::future::Future;

use crate::models::FieldListRequest;

/// Source of field catalogs for NXQL tables.
///
/// Today the only implementation derives the catalog from the backend's
/// error page for an invalid field; a metadata endpoint can replace it
/// behind this trait without touching callers.
pub trait FieldCatalog: Send + Sync {
    /// Error returned when the catalog cannot be obtained.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the valid field names for a table.
    fn describe_table(
        &self,
        request: &FieldListRequest,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;
}
