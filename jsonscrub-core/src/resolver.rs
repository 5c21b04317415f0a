//! Path resolution: turns a path expression into concrete pointers.
//!
//! The matching algorithm itself sits behind [`PathQuery`]. The default
//! [`JsonPathQuery`] evaluates RFC 9535 JSONPath expressions with
//! `serde_json_path` and reports every match as a JSON Pointer string.

use log::debug;
use serde_json::Value;
use serde_json_path::JsonPath;

use crate::errors::ScrubError;
use crate::mutator::Pointer;

/// A path-query capability.
///
/// Returns root-relative, `/`-delimited pointer strings for every location
/// in `document` matched by `path_expression`.
pub trait PathQuery: Send + Sync {
    fn query(&self, document: &Value, path_expression: &str) -> Result<Vec<String>, ScrubError>;
}

/// JSONPath matcher backed by `serde_json_path`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPathQuery;

impl PathQuery for JsonPathQuery {
    fn query(&self, document: &Value, path_expression: &str) -> Result<Vec<String>, ScrubError> {
        let path = JsonPath::parse(path_expression).map_err(|e| ScrubError::PathQuery {
            path_expression: path_expression.to_string(),
            reason: e.to_string(),
        })?;
        Ok(path
            .query_located(document)
            .locations()
            .map(|location| location.to_json_pointer())
            .collect())
    }
}

/// Resolves one path expression against `document`.
///
/// An empty result means the rule did not apply, which is not an error.
pub fn resolve(
    query: &dyn PathQuery,
    path_expression: &str,
    document: &Value,
) -> Result<Vec<Pointer>, ScrubError> {
    let pointers: Vec<Pointer> = query
        .query(document, path_expression)?
        .iter()
        .map(|raw| Pointer::from_json_pointer(raw))
        .collect();
    debug!("Path '{}' resolved to {} location(s).", path_expression, pointers.len());
    Ok(pointers)
}
