//! Validator chain
//!
//! A per-field validation run. The chain holds the field's value as it was
//! resolved at creation, runs named predicates against it in call order and
//! records failures both locally and in the owning session.
//!
//! ```ignore
//! session
//!     .check_body("email")
//!     .optional(OptionalOptions::default())
//!     .is_email()
//!     .with_message("must be a valid email");
//! ```

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{ErrorRecord, ValidatorError};
use crate::format::{format_param, is_truthy};
use crate::location::{FieldRef, Location};
use crate::session::ValidationSession;

/// Chain states. `Skipped` is terminal: once entered, no predicate records
/// an error for the rest of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Active,
    Skipped,
}

/// Options for [`ValidatorChain::optional`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OptionalOptions {
    /// Skip on any falsy value, not only a missing one
    #[serde(default, rename = "checkFalsy", alias = "check_falsy")]
    pub check_falsy: bool,
}

impl OptionalOptions {
    pub fn check_falsy() -> Self {
        Self { check_falsy: true }
    }
}

/// Position of the most recent failure in the chain and session error lists
#[derive(Debug, Clone, Copy)]
struct LastError {
    chain_index: usize,
    session_index: usize,
}

pub struct ValidatorChain<'s, 'r> {
    session: &'s mut ValidationSession<'r>,
    field: FieldRef,
    param: String,
    location: Option<Location>,
    value: Option<Value>,
    fail_message: Option<String>,
    errors: Vec<ErrorRecord>,
    state: ChainState,
    last_error: Option<LastError>,
}

impl<'s, 'r> ValidatorChain<'s, 'r> {
    /// Bind a chain to `field` at `location`. With no location the value
    /// stays unresolved and every predicate sees a missing value.
    pub(crate) fn new(
        session: &'s mut ValidationSession<'r>,
        field: FieldRef,
        location: Option<Location>,
        fail_message: Option<String>,
    ) -> Self {
        let value = location
            .and_then(|location| session.request().get(location, &field))
            .cloned();
        let param = format_param(&field);

        tracing::debug!(
            param = %param,
            location = ?location,
            present = value.is_some(),
            "validator chain created"
        );

        Self {
            session,
            field,
            param,
            location,
            value,
            fail_message,
            errors: Vec::new(),
            state: ChainState::Active,
            last_error: None,
        }
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    /// The formatted param used in error records
    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn is_skipped(&self) -> bool {
        self.state == ChainState::Skipped
    }

    pub(crate) fn set_fail_message(&mut self, message: Option<String>) {
        self.fail_message = message;
    }

    /// Run the named predicate with `args`.
    ///
    /// Fails only when the name is not registered; a predicate that returns
    /// false is recorded, not raised.
    pub fn apply(&mut self, name: &str, args: &[Value]) -> Result<&mut Self, ValidatorError> {
        self.run(name, args)?;
        Ok(self)
    }

    fn run(&mut self, name: &str, args: &[Value]) -> Result<(), ValidatorError> {
        let validator = self.session.validator();
        let predicate = validator
            .registry()
            .get(name)
            .ok_or_else(|| ValidatorError::UnknownPredicate(name.to_string()))?;

        if self.state == ChainState::Skipped {
            return Ok(());
        }

        let valid = predicate.invoke(self.value.as_ref(), args, self.session.request());
        tracing::debug!(param = %self.param, predicate = name, valid, "predicate evaluated");

        if valid {
            self.last_error = None;
            return Ok(());
        }

        let message = self
            .fail_message
            .clone()
            .unwrap_or_else(|| validator.options().default_message.clone());
        let record = self.format_error(&message);

        self.errors.push(record.clone());
        let session_index = self.session.record(record);
        self.last_error = Some(LastError {
            chain_index: self.errors.len() - 1,
            session_index,
        });

        if validator.options().skip_validation_on_first_error {
            self.skip("first error");
        }
        Ok(())
    }

    /// Shorthand dispatch: an unregistered name is logged rather than raised
    fn check(&mut self, name: &str, args: &[Value]) -> &mut Self {
        if let Err(err) = self.run(name, args) {
            tracing::error!(param = %self.param, error = %err, "predicate dispatch failed");
        }
        self
    }

    /// Dispatch used by schemas, where control methods share the predicate
    /// namespace
    pub(crate) fn dispatch(&mut self, name: &str, args: &[Value]) -> Result<(), ValidatorError> {
        match name {
            "optional" => {
                let options = args
                    .first()
                    .and_then(|raw| OptionalOptions::deserialize(raw).ok())
                    .unwrap_or_default();
                self.optional(options);
            }
            "notEmpty" => {
                self.run("isLength", &[json!({ "min": 1 })])?;
            }
            "len" => {
                self.run("isLength", args)?;
            }
            "withMessage" => {
                if let Some(message) = args.first().and_then(Value::as_str) {
                    self.with_message(message);
                }
            }
            _ => self.run(name, args)?,
        }
        Ok(())
    }

    fn skip(&mut self, reason: &str) {
        if self.state == ChainState::Active {
            tracing::debug!(param = %self.param, reason, "chain skipped");
            self.state = ChainState::Skipped;
        }
    }

    fn format_error(&self, message: &str) -> ErrorRecord {
        let formatter = &self.session.validator().options().error_formatter;
        formatter(&self.param, message, self.value.as_ref())
    }

    /// Stop validating when the value is absent. Only guards the calls made
    /// after it.
    pub fn optional(&mut self, options: OptionalOptions) -> &mut Self {
        let absent = if options.check_falsy {
            !is_truthy(self.value.as_ref())
        } else {
            self.value.is_none()
        };
        if absent {
            self.skip("optional");
        }
        self
    }

    /// Replace the message of the failure recorded by the previous call.
    /// Does nothing if that call passed.
    pub fn with_message(&mut self, message: &str) -> &mut Self {
        if let Some(last) = self.last_error {
            let record = self.format_error(message);
            self.errors[last.chain_index] = record.clone();
            self.session.replace(last.session_index, record);
        }
        self
    }

    pub fn not_empty(&mut self) -> &mut Self {
        self.check("isLength", &[json!({ "min": 1 })])
    }

    pub fn len(&mut self, args: &[Value]) -> &mut Self {
        self.check("isLength", args)
    }

    pub fn is_int(&mut self) -> &mut Self {
        self.check("isInt", &[])
    }

    pub fn is_int_range(&mut self, options: Value) -> &mut Self {
        self.check("isInt", &[options])
    }

    pub fn is_float(&mut self) -> &mut Self {
        self.check("isFloat", &[])
    }

    pub fn is_numeric(&mut self) -> &mut Self {
        self.check("isNumeric", &[])
    }

    pub fn is_boolean(&mut self) -> &mut Self {
        self.check("isBoolean", &[])
    }

    pub fn is_alpha(&mut self) -> &mut Self {
        self.check("isAlpha", &[])
    }

    pub fn is_alphanumeric(&mut self) -> &mut Self {
        self.check("isAlphanumeric", &[])
    }

    pub fn is_email(&mut self) -> &mut Self {
        self.check("isEmail", &[])
    }

    pub fn is_url(&mut self) -> &mut Self {
        self.check("isURL", &[])
    }

    pub fn is_uuid(&mut self) -> &mut Self {
        self.check("isUUID", &[])
    }

    pub fn is_json(&mut self) -> &mut Self {
        self.check("isJSON", &[])
    }

    pub fn is_iso8601(&mut self) -> &mut Self {
        self.check("isISO8601", &[])
    }

    pub fn is_in(&mut self, values: &[Value]) -> &mut Self {
        self.check("isIn", &[Value::Array(values.to_vec())])
    }

    pub fn contains(&mut self, seed: &str) -> &mut Self {
        self.check("contains", &[json!(seed)])
    }

    pub fn equals(&mut self, comparison: &str) -> &mut Self {
        self.check("equals", &[json!(comparison)])
    }

    pub fn matches(&mut self, pattern: &str) -> &mut Self {
        self.check("matches", &[json!(pattern)])
    }
}
