//! Text output formatting.

use chrono::Local;
use nxql_client::DataModel;
use nxql_core::{Engine, ErrorDetail, FieldValue, Record};
use nxql_store::Settings;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Cells wider than this are truncated with an ellipsis.
const MAX_CELL_WIDTH: usize = 48;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Formats records as an aligned table.
    ///
    /// Columns are the union of field names in first-seen order; a record
    /// without a field gets an empty cell.
    pub fn format_records(&self, records: &[Record]) -> String {
        if records.is_empty() {
            return self.dim("(no records)");
        }

        let mut columns: Vec<&str> = Vec::new();
        for record in records {
            for name in record.field_names() {
                if !columns.contains(&name) {
                    columns.push(name);
                }
            }
        }

        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                rows.iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 3);
        let header: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| pad(column, *width))
            .collect();
        lines.push(self.bold(header.join("  ").trim_end()));
        lines.push(self.dim(&"─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1))));

        for row in &rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(value, width)| pad(value, *width))
                .collect();
            lines.push(cells.join("  ").trim_end().to_string());
        }

        lines.push(String::new());
        lines.push(self.dim(&format!("{} record(s)", records.len())));
        lines.join("\n")
    }

    // ========================================================================
    // Engines, Fields, Model
    // ========================================================================

    /// Formats the engine listing.
    pub fn format_engines(&self, engines: &[Engine], engine_port: u16) -> String {
        let mut lines = vec![self.bold(&format!("Engines ({})", engines.len()))];
        for engine in engines {
            let name = engine
                .name
                .as_deref()
                .map(|n| format!(" {}", self.dim(&format!("({n})"))))
                .unwrap_or_default();
            lines.push(format!("  • {}{name}", engine.authority(engine_port)));
        }
        lines.join("\n")
    }

    /// Formats a table's field list, one field per line.
    pub fn format_fields(&self, table: &str, fields: &[String]) -> String {
        let mut lines = vec![self.bold(&format!("{table} ({} fields)", fields.len()))];
        lines.extend(fields.iter().map(|field| format!("  {field}")));
        lines.join("\n")
    }

    /// Formats the data model, one table per paragraph.
    pub fn format_model(&self, model: &DataModel) -> String {
        model
            .tables
            .iter()
            .map(|(table, fields)| {
                format!("{}\n  {}", self.cyan(table), fields.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Formats a backend error with its valid options.
    pub fn format_error(&self, detail: &ErrorDetail) -> String {
        let mut lines = vec![format!("{}: {}", self.red("Query rejected"), detail.message)];
        if detail.has_options() {
            lines.push(format!("Valid options: {}", detail.options.join(", ")));
        }
        lines.join("\n")
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Formats the settings as `key: value` lines.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let unset = || self.dim("(not set)");
        let platforms = if settings.default_platforms.is_empty() {
            self.dim("(all)")
        } else {
            settings
                .default_platforms
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let engine_port = if settings.engine_port == 0 {
            format!("0 {}", self.dim("(inferred)"))
        } else {
            settings.engine_port.to_string()
        };

        let rows = [
            ("portal_host", settings.portal_host.clone().unwrap_or_else(unset)),
            ("portal_port", settings.portal_port.to_string()),
            ("engine_port", engine_port),
            ("username", settings.username.clone().unwrap_or_else(unset)),
            ("skip_cert_validation", settings.skip_cert_validation.to_string()),
            ("timeout_secs", settings.timeout_secs.to_string()),
            ("default_platforms", platforms),
            ("log_level", settings.log_level.to_string()),
        ];

        let mut lines = vec![self.bold("nxql Configuration"), "─".repeat(40)];
        lines.extend(rows.iter().map(|(key, value)| format!("{key:<22}{value}")));
        lines.join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Renders one value for a table cell.
fn cell(value: &FieldValue) -> String {
    let text = match value {
        FieldValue::Timestamp(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        other => other.to_string().replace(['\n', '\r', '\t'], " "),
    };

    if text.chars().count() > MAX_CELL_WIDTH {
        let truncated: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{truncated}…")
    } else {
        text
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}
