//! Response classification and aggregation.
//!
//! Every response body of a batch is one of:
//!
//! 1. JSON: its records are appended to the result
//! 2. An HTML error page: the batch stops with the parsed [`ErrorDetail`]
//! 3. Anything else: the batch fails
//!
//! Responses are processed in target order, so the first error in target
//! order wins regardless of which engine answered first.

use nxql_core::{ErrorDetail, Record};
use serde_json::Value;
use tracing::debug;

use crate::error::QueryError;
use crate::error_page;

// ============================================================================
// Classification
// ============================================================================

/// Outcome of classifying a single response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// JSON payload, converted to records.
    Records(Vec<Record>),
    /// HTML error page with a recognizable error element.
    BackendError(ErrorDetail),
}

/// Classifies one response body from `target`.
///
/// # Errors
///
/// - [`QueryError::MalformedHtmlResponse`] for HTML without an error element
/// - [`QueryError::UnexpectedResponse`] for anything that is neither JSON
///   records nor HTML
pub fn classify(target: &str, body: &str) -> Result<Classified, QueryError> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => records_from_json(target, value).map(Classified::Records),
        Err(parse_error) => {
            if error_page::is_html(body) {
                error_page::parse_error_page(body)
                    .map(Classified::BackendError)
                    .ok_or_else(|| QueryError::MalformedHtmlResponse {
                        target: target.to_string(),
                    })
            } else {
                Err(QueryError::UnexpectedResponse {
                    target: target.to_string(),
                    reason: format!("body is not JSON: {parse_error}"),
                })
            }
        }
    }
}

fn records_from_json(target: &str, value: Value) -> Result<Vec<Record>, QueryError> {
    let items = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => {
            return Err(QueryError::UnexpectedResponse {
                target: target.to_string(),
                reason: format!("expected an array of records, got {other}"),
            });
        }
    };

    items
        .into_iter()
        .map(|item| {
            Record::from_json(item).map_err(|e| QueryError::UnexpectedResponse {
                target: target.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

// ============================================================================
// Aggregation
// ============================================================================

/// How backend error pages are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Fail with [`QueryError::BackendQuery`].
    #[default]
    Raise,
    /// Return the detail as [`QueryOutput::Error`].
    Structured,
}

/// Aggregated result of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// All targets answered with JSON; records in target order.
    Records(Vec<Record>),
    /// First backend error page, in target order (structured mode only).
    Error(ErrorDetail),
}

impl QueryOutput {
    /// Returns the records, or `None` for an error.
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            Self::Records(records) => Some(records),
            Self::Error(_) => None,
        }
    }
}

/// Classifies `(target, body)` pairs in order and concatenates their records.
///
/// Records are never deduplicated across targets.
///
/// # Errors
///
/// Any classification failure aborts with no partial result; in
/// [`ErrorMode::Raise`] a backend error page does too.
pub fn aggregate<'a, I>(responses: I, mode: ErrorMode) -> Result<QueryOutput, QueryError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut records = Vec::new();

    for (target, body) in responses {
        match classify(target, body)? {
            Classified::Records(batch) => {
                debug!(endpoint = %target, count = batch.len(), "Records received");
                records.extend(batch);
            }
            Classified::BackendError(detail) => {
                debug!(endpoint = %target, message = %detail.message, "Backend error page");
                return match mode {
                    ErrorMode::Raise => Err(QueryError::BackendQuery(detail)),
                    ErrorMode::Structured => Ok(QueryOutput::Error(detail)),
                };
            }
        }
    }

    Ok(QueryOutput::Records(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERROR_PAGE: &str = r#"<html><body><p class="error">Unknown field</p>
        <ul class="options"><li>name</li><li>platform</li></ul></body></html>"#;

    fn names(output: QueryOutput) -> Vec<String> {
        output
            .into_records()
            .unwrap()
            .iter()
            .map(|r| r.get("name").unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_classify_json_array() {
        let result = classify("e1", r#"[{"name":"a"},{"name":"b"}]"#).unwrap();
        let Classified::Records(records) = result else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_classify_single_object() {
        let result = classify("e1", r#"{"name":"a"}"#).unwrap();
        assert!(matches!(result, Classified::Records(r) if r.len() == 1));
    }

    #[test]
    fn test_classify_json_scalar_is_unexpected() {
        let err = classify("e1", "42").unwrap_err();
        assert!(matches!(err, QueryError::UnexpectedResponse { .. }));
        let err = classify("e1", "[1, 2]").unwrap_err();
        assert!(matches!(err, QueryError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_classify_error_page() {
        let result = classify("e1", ERROR_PAGE).unwrap();
        let Classified::BackendError(detail) = result else {
            panic!("expected backend error");
        };
        assert_eq!(detail.message, "Unknown field");
        assert_eq!(detail.options, vec!["name", "platform"]);
    }

    #[test]
    fn test_classify_html_without_marker() {
        let err = classify("e2", "<html><body>Service unavailable</body></html>").unwrap_err();
        assert!(matches!(err, QueryError::MalformedHtmlResponse { ref target } if target == "e2"));
    }

    #[test]
    fn test_classify_garbage_surfaces_parse_error() {
        let err = classify("e3", "Internal Server Error").unwrap_err();
        let QueryError::UnexpectedResponse { target, reason } = err else {
            panic!("expected unexpected response");
        };
        assert_eq!(target, "e3");
        assert!(reason.contains("not JSON"));
    }

    #[test]
    fn test_aggregate_concatenates_in_target_order() {
        let responses = [
            ("e1", r#"[{"name":"a"}]"#),
            ("e2", r#"[{"name":"b"},{"name":"a"}]"#),
        ];
        let output = aggregate(responses, ErrorMode::Raise).unwrap();
        assert_eq!(names(output), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_aggregate_empty_arrays() {
        let responses = [("e1", "[]"), ("e2", "[]")];
        let output = aggregate(responses, ErrorMode::Raise).unwrap();
        assert_eq!(output, QueryOutput::Records(Vec::new()));
    }

    #[test]
    fn test_aggregate_fails_whole_batch_on_garbage() {
        let responses = [("e1", r#"[{"name":"a"}]"#), ("e2", "oops")];
        assert!(aggregate(responses, ErrorMode::Raise).is_err());
    }

    #[test]
    fn test_aggregate_raise_mode_error_page() {
        let responses = [("e1", r#"[{"name":"a"}]"#), ("e2", ERROR_PAGE)];
        let err = aggregate(responses, ErrorMode::Raise).unwrap_err();
        assert_eq!(err.detail().unwrap().options, vec!["name", "platform"]);
    }

    #[test]
    fn test_structured_mode_first_error_wins() {
        // Later garbage is never looked at once an error page is found.
        let responses = [("e1", ERROR_PAGE), ("e2", "oops")];
        let output = aggregate(responses, ErrorMode::Structured).unwrap();
        let QueryOutput::Error(detail) = output else {
            panic!("expected error detail");
        };
        assert_eq!(detail.message, "Unknown field");
    }

    #[test]
    fn test_structured_mode_earlier_garbage_still_fails() {
        let responses = [("e1", "oops"), ("e2", ERROR_PAGE)];
        assert!(aggregate(responses, ErrorMode::Structured).is_err());
    }
}
