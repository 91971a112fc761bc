//! JSON output formatting.

use anyhow::Result;
use nxql_core::{Engine, ErrorDetail, Record};
use serde::Serialize;

/// Engine listing entry.
#[derive(Debug, Serialize)]
pub struct EngineOutput<'a> {
    /// Engine address as listed by the portal.
    pub address: &'a str,
    /// `host:port` requests go to.
    pub authority: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

/// Field list of one table.
#[derive(Debug, Serialize)]
pub struct FieldsOutput<'a> {
    /// Table name.
    pub table: &'a str,
    /// Valid fields.
    pub fields: &'a [String],
}

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable data.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats query records as an array of objects.
    pub fn format_records(&self, records: &[Record]) -> Result<String> {
        self.format(&records)
    }

    /// Formats the engine listing.
    pub fn format_engines(&self, engines: &[Engine], engine_port: u16) -> Result<String> {
        let outputs: Vec<EngineOutput<'_>> = engines
            .iter()
            .map(|engine| EngineOutput {
                address: &engine.address,
                authority: engine.authority(engine_port),
                name: engine.name.as_deref(),
            })
            .collect();
        self.format(&outputs)
    }

    /// Formats a table's field list.
    pub fn format_fields(&self, table: &str, fields: &[String]) -> Result<String> {
        self.format(&FieldsOutput { table, fields })
    }

    /// Formats a backend error as `{"Error": ..., "Options": [...]}`.
    pub fn format_error(&self, detail: &ErrorDetail) -> Result<String> {
        self.format(detail)
    }
}
