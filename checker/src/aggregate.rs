//! Error aggregation
//!
//! Turns the errors collected during one request into the final outcome:
//! a map of errors keyed by param, an aggregate failure, or the merged request
//! parameters when nothing failed.

use serde_json::{Map, Value};

use crate::errors::{ErrorRecord, ValidationFailure};
use crate::location::RequestData;

/// Transport headers left out of the merged parameters
pub const HEADER_DENYLIST: [&str; 9] = [
    "host",
    "connection",
    "origin",
    "user-agent",
    "accept-language",
    "accept",
    "content-type",
    "content-length",
    "accept-encoding",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Errors keyed by param in first-seen order; a later error for the same
    /// param replaces the earlier one in place
    Mapped(Map<String, Value>),
    /// Merged request parameters, returned when no error was recorded
    Params(Map<String, Value>),
}

/// Drop structurally equal records, keeping the first occurrence
pub fn dedup(errors: &[ErrorRecord]) -> Vec<ErrorRecord> {
    let mut unique: Vec<ErrorRecord> = Vec::with_capacity(errors.len());
    for error in errors {
        if !unique.contains(error) {
            unique.push(error.clone());
        }
    }
    unique
}

pub fn map_by_param(errors: &[ErrorRecord]) -> Map<String, Value> {
    let mut mapped = Map::new();
    for error in errors {
        mapped.insert(error.param.clone(), error.to_value());
    }
    mapped
}

/// Union of query, path params, body and headers, later sources overriding
/// earlier ones. Transport headers in [`HEADER_DENYLIST`] are dropped.
pub fn merged_params(request: &RequestData) -> Map<String, Value> {
    let mut merged = Map::new();
    for bucket in [&request.query, &request.params, &request.body] {
        for (key, value) in bucket {
            merged.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in &request.headers {
        let denied = HEADER_DENYLIST
            .iter()
            .any(|name| name.eq_ignore_ascii_case(key));
        if !denied {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Finish one request's validation phase.
///
/// `mapped` with errors present yields [`Outcome::Mapped`]; otherwise errors
/// raise a [`ValidationFailure`] and a clean run yields [`Outcome::Params`].
pub fn finalize(
    errors: &[ErrorRecord],
    request: &RequestData,
    mapped: bool,
) -> Result<Outcome, ValidationFailure> {
    if mapped && !errors.is_empty() {
        return Ok(Outcome::Mapped(map_by_param(errors)));
    }
    if !errors.is_empty() {
        let unique = dedup(errors);
        tracing::debug!(
            recorded = errors.len(),
            unique = unique.len(),
            "validation failed"
        );
        return Err(ValidationFailure::new(unique));
    }
    Ok(Outcome::Params(merged_params(request)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let a = ErrorRecord::new("a", "bad", Some(json!(1)));
        let b = ErrorRecord::new("b", "bad", None);
        let errors = vec![a.clone(), b.clone(), a.clone(), b.clone()];
        assert_eq!(dedup(&errors), vec![a, b]);
    }

    #[test]
    fn test_dedup_distinguishes_values() {
        let errors = vec![
            ErrorRecord::new("a", "bad", Some(json!(1))),
            ErrorRecord::new("a", "bad", Some(json!("1"))),
        ];
        assert_eq!(dedup(&errors).len(), 2);
    }

    #[test]
    fn test_map_last_write_wins() {
        let first = ErrorRecord::new("age", "must be int", None);
        let second = ErrorRecord::new("age", "must be positive", None);
        let mapped = map_by_param(&[first, second.clone()]);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped["age"], second.to_value());
    }

    #[test]
    fn test_map_keeps_first_seen_order() {
        let errors = vec![
            ErrorRecord::new("zip", "bad zip", None),
            ErrorRecord::new("age", "must be int", Some(json!("x"))),
            ErrorRecord::new("zip", "still bad", None),
        ];
        let mapped = map_by_param(&errors);

        let keys: Vec<&str> = mapped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zip", "age"]);
        assert_eq!(mapped["zip"], json!({"param": "zip", "msg": "still bad"}));
        assert_eq!(mapped["age"]["value"], json!("x"));
    }

    #[test]
    fn test_merged_params_override_order() {
        let request = RequestData::new()
            .with_query("name", "query")
            .with_query("page", "1")
            .with_param("name", "params")
            .with_param("id", "7")
            .with_body("name", "body")
            .with_header("x-trace", "abc")
            .with_header("name", "header")
            .with_header("Content-Type", "application/json")
            .with_header("host", "localhost");

        let merged = merged_params(&request);
        assert_eq!(merged["name"], json!("header"));
        assert_eq!(merged["page"], json!("1"));
        assert_eq!(merged["id"], json!("7"));
        assert_eq!(merged["x-trace"], json!("abc"));
        assert!(!merged.contains_key("host"));
        assert!(!merged.contains_key("Content-Type"));
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_finalize_paths() {
        let request = RequestData::new().with_query("q", "rust");
        let errors = vec![
            ErrorRecord::new("q", "too short", None),
            ErrorRecord::new("q", "too short", None),
        ];

        let failure = finalize(&errors, &request, false).unwrap_err();
        assert_eq!(failure.errors().len(), 1);

        match finalize(&errors, &request, true).unwrap() {
            Outcome::Mapped(map) => assert_eq!(map.len(), 1),
            other => panic!("expected mapped errors, got {:?}", other),
        }

        match finalize(&[], &request, true).unwrap() {
            Outcome::Params(params) => assert_eq!(params["q"], json!("rust")),
            other => panic!("expected params, got {:?}", other),
        }
    }
}
