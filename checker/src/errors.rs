//! Error types for the validation engine
//!
//! Field failures are plain [`ErrorRecord`] values collected by a session.
//! Only [`ValidationFailure`] is surfaced as an error at the end of a
//! request's validation phase; [`ValidatorError`] covers misuse of the
//! engine itself (unknown predicates, malformed schemas).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ConfigError;

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub param: String,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ErrorRecord {
    pub fn new(param: impl Into<String>, msg: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            param: param.into(),
            msg: msg.into(),
            value,
        }
    }

    /// JSON object form; a missing value leaves out the `value` key
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("param".to_string(), Value::String(self.param.clone()));
        object.insert("msg".to_string(), Value::String(self.msg.clone()));
        if let Some(value) = &self.value {
            object.insert("value".to_string(), value.clone());
        }
        Value::Object(object)
    }
}

/// Errors raised by misuse of the engine
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),
    #[error("Unknown location: {0}")]
    UnknownLocation(String),
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Aggregate failure for one request: the deduplicated field errors in the
/// order they were first recorded.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", summarize(.errors))]
pub struct ValidationFailure {
    pub errors: Vec<ErrorRecord>,
}

impl ValidationFailure {
    pub fn new(errors: Vec<ErrorRecord>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ErrorRecord> {
        self.errors
    }
}

fn summarize(errors: &[ErrorRecord]) -> String {
    match errors {
        [single] => format!("Validation failed for field '{}'", single.param),
        _ => format!("Validation failed for {} fields", errors.len()),
    }
}
