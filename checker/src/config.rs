/// Validator configuration
/// Options shared by every session created from one `FieldValidator`

use std::env;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::errors::ErrorRecord;

/// Message used by imperative chains when no failure message was given
pub const DEFAULT_CHAIN_MESSAGE: &str = "Invalid value";
/// Message used by schema constraints with no `errorMessage` of their own
pub const DEFAULT_SCHEMA_MESSAGE: &str = "Invalid param";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Builds an error record from the formatted param, the failure message and
/// the raw field value.
pub type ErrorFormatter = Arc<dyn Fn(&str, &str, Option<&Value>) -> ErrorRecord + Send + Sync>;

pub fn default_error_formatter(param: &str, msg: &str, value: Option<&Value>) -> ErrorRecord {
    ErrorRecord::new(param, msg, value.cloned())
}

#[derive(Clone)]
pub struct ValidatorOptions {
    pub error_formatter: ErrorFormatter,
    /// Stop running predicates on a field after its first failure
    pub skip_validation_on_first_error: bool,
    pub default_message: String,
    pub schema_message: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            error_formatter: Arc::new(default_error_formatter),
            skip_validation_on_first_error: false,
            default_message: DEFAULT_CHAIN_MESSAGE.to_string(),
            schema_message: DEFAULT_SCHEMA_MESSAGE.to_string(),
        }
    }
}

impl fmt::Debug for ValidatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorOptions")
            .field(
                "skip_validation_on_first_error",
                &self.skip_validation_on_first_error,
            )
            .field("default_message", &self.default_message)
            .field("schema_message", &self.schema_message)
            .finish_non_exhaustive()
    }
}

impl ValidatorOptions {
    /// Load options from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut options = Self::default();

        if let Ok(raw) = env::var("VALIDATION_SKIP_ON_FIRST_ERROR") {
            options.skip_validation_on_first_error = parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidConfig(format!(
                    "VALIDATION_SKIP_ON_FIRST_ERROR must be true or false, got '{}'",
                    raw
                ))
            })?;
        }

        if let Ok(message) = env::var("VALIDATION_DEFAULT_MESSAGE") {
            if !message.trim().is_empty() {
                options.default_message = message;
            }
        }

        if let Ok(message) = env::var("VALIDATION_SCHEMA_MESSAGE") {
            if !message.trim().is_empty() {
                options.schema_message = message;
            }
        }

        info!(
            "Validator config loaded: skip_on_first_error={}, default_message={:?}, schema_message={:?}",
            options.skip_validation_on_first_error, options.default_message, options.schema_message
        );

        Ok(options)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ValidatorOptions::default();
        assert!(!options.skip_validation_on_first_error);
        assert_eq!(options.default_message, "Invalid value");
        assert_eq!(options.schema_message, "Invalid param");
    }

    #[test]
    fn test_default_formatter_shape() {
        let options = ValidatorOptions::default();
        let record = (options.error_formatter)("age", "must be int", Some(&json!("x")));
        assert_eq!(record, ErrorRecord::new("age", "must be int", Some(json!("x"))));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_from_env() {
        env::set_var("VALIDATION_SKIP_ON_FIRST_ERROR", "true");
        env::set_var("VALIDATION_DEFAULT_MESSAGE", "bad input");
        let options = ValidatorOptions::from_env().expect("Should load from env");
        assert!(options.skip_validation_on_first_error);
        assert_eq!(options.default_message, "bad input");

        env::set_var("VALIDATION_SKIP_ON_FIRST_ERROR", "sometimes");
        assert!(ValidatorOptions::from_env().is_err());

        env::remove_var("VALIDATION_SKIP_ON_FIRST_ERROR");
        env::remove_var("VALIDATION_DEFAULT_MESSAGE");
    }
}
