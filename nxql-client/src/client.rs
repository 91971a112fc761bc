//! The NXQL client handle.

use nxql_core::{Engine, FieldCatalog, FieldListRequest, Platform, QueryRequest, Record};
use reqwest::Method;
use tracing::{info, instrument};

use crate::classifier::{self, ErrorMode, QueryOutput};
use crate::connection::{ConnectOptions, Connection, PortalAddress};
use crate::encoder;
use crate::error::QueryError;
use crate::fanout::{self, Target};
use crate::fields::{DataModel, ErrorPageCatalog};

/// Client for a portal and its engines.
///
/// Connecting and disconnecting take `&mut self`; queries take `&self`, so a
/// reconnect can never overlap a query batch in flight.
///
/// ```ignore
/// let mut client = NxqlClient::new();
/// client
///     .connect(ConnectOptions::new("demo.pac.nexthink.cloud", credential))
///     .await?;
///
/// let records = client
///     .query(&QueryRequest::new("(select (name) (from device) (limit 10))"))
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct NxqlClient {
    connection: Option<Connection>,
}

impl NxqlClient {
    /// Creates a disconnected client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects to a portal and resolves its engines.
    ///
    /// Any previous connection is dropped first, so a failed connect leaves
    /// the client disconnected.
    ///
    /// # Errors
    ///
    /// Fails if the host is invalid or the engine list cannot be resolved.
    pub async fn connect(&mut self, options: ConnectOptions) -> Result<(), QueryError> {
        self.connection = None;
        self.connection = Some(Connection::establish(options).await?);
        Ok(())
    }

    /// Drops the connection.
    pub fn disconnect(&mut self) {
        if self.connection.take().is_some() {
            info!("Disconnected");
        }
    }

    /// Returns true if connected.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The active connection, if any.
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Normalized portal address of the active connection.
    pub fn portal(&self) -> Option<&PortalAddress> {
        self.connection.as_ref().map(Connection::portal)
    }

    /// Engine port of the active connection.
    pub fn engine_port(&self) -> Option<u16> {
        self.connection.as_ref().map(Connection::engine_port)
    }

    /// Resolved engines; empty when disconnected.
    pub fn engines(&self) -> &[Engine] {
        self.connection.as_ref().map_or(&[], Connection::engines)
    }

    /// Runs a query on every engine and returns the records in engine order.
    ///
    /// # Errors
    ///
    /// See [`NxqlClient::query_with`]; a backend error page becomes
    /// [`QueryError::BackendQuery`].
    pub async fn query(&self, request: &QueryRequest) -> Result<Vec<Record>, QueryError> {
        let output = self
            .query_with(request, Target::Engines, &Method::GET, ErrorMode::Raise)
            .await?;

        match output {
            QueryOutput::Records(records) => Ok(records),
            QueryOutput::Error(detail) => Err(QueryError::BackendQuery(detail)),
        }
    }

    /// Runs a query against `target`.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotConnected`] and [`QueryError::UnsupportedMethod`]
    /// are returned before any request is sent. Any unusable response fails
    /// the whole call.
    #[instrument(skip(self, request), fields(nxql = %request.nxql))]
    pub async fn query_with(
        &self,
        request: &QueryRequest,
        target: Target,
        method: &Method,
        mode: ErrorMode,
    ) -> Result<QueryOutput, QueryError> {
        let connection = self.connection.as_ref().ok_or(QueryError::NotConnected)?;
        let path = encoder::encode_query_path(request);

        let responses = fanout::execute(connection, &path, target, method, request.timeout).await?;

        classifier::aggregate(
            responses.iter().map(|r| (r.label.as_str(), r.body.as_str())),
            mode,
        )
    }

    /// Lists the valid field names of a table.
    ///
    /// # Errors
    ///
    /// Fails if not connected, the probe is rejected without options, or
    /// the engines answer with records instead of an error page.
    pub async fn list_fields(&self, request: &FieldListRequest) -> Result<Vec<String>, QueryError> {
        let connection = self.connection.as_ref().ok_or(QueryError::NotConnected)?;
        ErrorPageCatalog::new(connection).describe_table(request).await
    }

    /// Discovers the field lists of all built-in tables.
    ///
    /// # Errors
    ///
    /// Fails if not connected or no table could be described.
    pub async fn fetch_data_model(&self, platform: Platform) -> Result<DataModel, QueryError> {
        let connection = self.connection.as_ref().ok_or(QueryError::NotConnected)?;
        DataModel::discover(&ErrorPageCatalog::new(connection), platform).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_is_disconnected() {
        let client = NxqlClient::new();
        assert!(!client.is_connected());
        assert!(client.engines().is_empty());
        assert!(client.portal().is_none());
        assert!(client.engine_port().is_none());
    }

    #[tokio::test]
    async fn test_operations_require_connection() {
        let client = NxqlClient::new();

        let err = client.query(&QueryRequest::new("q")).await.unwrap_err();
        assert!(matches!(err, QueryError::NotConnected));

        let err = client
            .list_fields(&FieldListRequest::new("device"))
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::NotConnected));

        let err = client.fetch_data_model(Platform::Windows).await.unwrap_err();
        assert!(matches!(err, QueryError::NotConnected));
    }

    #[tokio::test]
    async fn test_invalid_host_leaves_client_disconnected() {
        let mut client = NxqlClient::new();
        let options = ConnectOptions::new("https://", crate::Credential::new("u", "p"));
        assert!(client.connect(options).await.is_err());
        assert!(!client.is_connected());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut client = NxqlClient::new();
        client.disconnect();
        client.disconnect();
        assert!(!client.is_connected());
    }
}
