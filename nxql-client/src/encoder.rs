//! Query path encoding.
//!
//! ```text
//! /2/query?query=<nxql>&format=json[&platform=<p>]*[&p<N>=<value>]*
//! ```
//!
//! Values are form-urlencoded. Platforms keep their input order and
//! parameters are numbered from 1 in input order.

use nxql_core::{Platform, QueryRequest};
use url::form_urlencoded;

use crate::error::QueryError;

/// Query endpoint path.
pub const QUERY_ENDPOINT: &str = "/2/query";

/// Response format requested from the backend.
const FORMAT_JSON: &str = "json";

/// Builds the request path for a query.
pub fn encode_query_path(request: &QueryRequest) -> String {
    encode_parts(&request.nxql, &request.platforms, &request.parameters)
}

/// Builds the request path from its parts.
pub fn encode_parts(nxql: &str, platforms: &[Platform], parameters: &[String]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("query", nxql);
    query.append_pair("format", FORMAT_JSON);

    let mut seen = Vec::with_capacity(platforms.len());
    for platform in platforms {
        if !seen.contains(platform) {
            seen.push(*platform);
            query.append_pair("platform", platform.as_str());
        }
    }

    for (index, value) in parameters.iter().enumerate() {
        query.append_pair(&format!("p{}", index + 1), value);
    }

    format!("{QUERY_ENDPOINT}?{}", query.finish())
}

/// Parts recovered from a query path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedQuery {
    /// NXQL text.
    pub nxql: String,
    /// Platform filters, in path order.
    pub platforms: Vec<Platform>,
    /// Positional parameters, ordered by their index.
    pub parameters: Vec<String>,
}

/// Decodes a path produced by [`encode_query_path`].
///
/// # Errors
///
/// Returns [`QueryError::Encoding`] if the path is not a query path, the
/// query is missing, a platform is unknown, or parameter indices have gaps.
pub fn decode_query_path(path: &str) -> Result<DecodedQuery, QueryError> {
    let (endpoint, query) = path
        .split_once('?')
        .ok_or_else(|| QueryError::Encoding(format!("no query string in {path}")))?;
    if endpoint != QUERY_ENDPOINT {
        return Err(QueryError::Encoding(format!("not a query path: {endpoint}")));
    }

    let mut nxql = None;
    let mut platforms = Vec::new();
    let mut indexed = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "query" => nxql = Some(value.into_owned()),
            "format" => {}
            "platform" => {
                let platform = value
                    .parse::<Platform>()
                    .map_err(|e| QueryError::Encoding(e.to_string()))?;
                platforms.push(platform);
            }
            other => {
                let index = other
                    .strip_prefix('p')
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| QueryError::Encoding(format!("unexpected key: {other}")))?;
                indexed.push((index, value.into_owned()));
            }
        }
    }

    indexed.sort_by_key(|(index, _)| *index);
    for (expected, (index, _)) in indexed.iter().enumerate() {
        if *index != expected + 1 {
            return Err(QueryError::Encoding(format!(
                "parameter p{} is missing",
                expected + 1
            )));
        }
    }

    Ok(DecodedQuery {
        nxql: nxql.ok_or_else(|| QueryError::Encoding("missing query".to_string()))?,
        platforms,
        parameters: indexed.into_iter().map(|(_, value)| value).collect(),
    })
}
