//! Declarative schemas
//!
//! A schema maps field names to constraint sets, in declaration order:
//!
//! ```json
//! {
//!   "age":  { "in": "query", "isInt": { "options": [{ "min": 18 }] }, "errorMessage": "must be an adult" },
//!   "role": { "optional": { "options": [{ "checkFalsy": true }] }, "isIn": { "options": [["admin", "editor"]] } }
//! }
//! ```
//!
//! `in` and `errorMessage` are reserved; every other key names a predicate or
//! a chain control method (`optional`, `notEmpty`, `len`, `withMessage`).

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::chain::ValidatorChain;
use crate::errors::ValidatorError;
use crate::location::{FieldRef, Location, LocationSpec};
use crate::session::ValidationSession;

const IN_KEY: &str = "in";
const ERROR_MESSAGE_KEY: &str = "errorMessage";
const OPTIONS_KEY: &str = "options";

/// Value of a field's `in` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLocation {
    Known(Location),
    /// Not one of the four locations; the field is skipped
    Unrecognized(String),
}

impl From<Location> for FieldLocation {
    fn from(location: Location) -> Self {
        FieldLocation::Known(location)
    }
}

impl From<&str> for FieldLocation {
    fn from(raw: &str) -> Self {
        match raw.parse::<Location>() {
            Ok(location) => FieldLocation::Known(location),
            Err(_) => FieldLocation::Unrecognized(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
    pub options: Vec<Value>,
    pub error_message: Option<String>,
}

impl Constraint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.options = options;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// `{"options": [...], "errorMessage": "..."}`; a non-array `options` is a
    /// single argument and anything that is not an object carries no arguments
    fn from_value(raw: &Value) -> Self {
        let Some(object) = raw.as_object() else {
            return Self::default();
        };
        let options = match object.get(OPTIONS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
        };
        let error_message = object
            .get(ERROR_MESSAGE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            options,
            error_message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSchema {
    pub location: Option<FieldLocation>,
    pub error_message: Option<String>,
    pub constraints: Vec<(String, Constraint)>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn located(mut self, location: impl Into<FieldLocation>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn constraint(mut self, name: impl Into<String>, constraint: Constraint) -> Self {
        self.constraints.push((name.into(), constraint));
        self
    }

    fn from_object(field: &str, object: &Map<String, Value>) -> Self {
        let mut schema = Self::new();
        for (key, raw) in object {
            match key.as_str() {
                IN_KEY => {
                    schema.location = Some(match raw {
                        Value::String(s) => FieldLocation::from(s.as_str()),
                        other => FieldLocation::Unrecognized(other.to_string()),
                    });
                }
                ERROR_MESSAGE_KEY => {
                    schema.error_message = raw.as_str().map(str::to_string);
                }
                predicate => {
                    schema
                        .constraints
                        .push((predicate.to_string(), Constraint::from_value(raw)));
                }
            }
        }
        tracing::trace!(
            field,
            constraints = schema.constraints.len(),
            "schema field parsed"
        );
        schema
    }
}

/// Field name → constraint set, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Schema {
    fields: Vec<(String, FieldSchema)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Value> for Schema {
    type Error = ValidatorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err(ValidatorError::InvalidSchema(
                "schema must be an object of fields".to_string(),
            ));
        };

        let mut schema = Schema::new();
        for (name, constraints) in &fields {
            let Value::Object(object) = constraints else {
                return Err(ValidatorError::InvalidSchema(format!(
                    "constraints for '{}' must be an object",
                    name
                )));
            };
            schema = schema.field(name.clone(), FieldSchema::from_object(name, object));
        }
        Ok(schema)
    }
}

/// Run `schema` against the session's request.
///
/// Each field gets one chain. A field's own `in` overrides `default` for that
/// field only; an unrecognized `in` skips the field. Stops at the first
/// constraint naming an unknown predicate.
pub(crate) fn execute(
    session: &mut ValidationSession<'_>,
    schema: &Schema,
    default: LocationSpec,
) -> Result<(), ValidatorError> {
    let options = session.validator().options();

    for (name, field) in schema.fields() {
        let spec = match &field.location {
            Some(FieldLocation::Known(location)) => LocationSpec::At(*location),
            Some(FieldLocation::Unrecognized(raw)) => {
                tracing::warn!(
                    field = name,
                    location = %raw,
                    "skipping schema field with unrecognized location"
                );
                continue;
            }
            None => default,
        };

        let field_ref = FieldRef::from(name);
        let location = session.request().resolve(spec, &field_ref);
        let mut chain = ValidatorChain::new(session, field_ref, location, None);

        for (predicate, constraint) in &field.constraints {
            let message = constraint
                .error_message
                .as_deref()
                .or(field.error_message.as_deref())
                .unwrap_or(&options.schema_message);
            chain.set_fail_message(Some(message.to_string()));
            chain.dispatch(predicate, &constraint.options)?;
        }
    }
    Ok(())
}
