//! Validator setup and per-request sessions
//!
//! A [`FieldValidator`] is built once (built-in and custom predicates plus
//! options) and shared across requests. Each request opens a
//! [`ValidationSession`] over its [`RequestData`]; every chain and schema run
//! in that request writes into the session's error list.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::aggregate::{self, Outcome};
use crate::chain::ValidatorChain;
use crate::config::{ConfigError, ErrorFormatter, ValidatorOptions};
use crate::errors::{ErrorRecord, ValidationFailure, ValidatorError};
use crate::location::{FieldRef, Location, LocationSpec, RequestData};
use crate::predicates::BUILTINS;
use crate::registry::{CustomFn, PredicateRegistry};
use crate::schema::{self, Schema};

#[derive(Debug, Clone)]
pub struct FieldValidator {
    registry: Arc<PredicateRegistry>,
    options: ValidatorOptions,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(ValidatorOptions::default())
    }
}

impl FieldValidator {
    /// Validator with the built-in predicates only
    pub fn new(options: ValidatorOptions) -> Self {
        Self {
            registry: Arc::new(PredicateRegistry::builtin()),
            options,
        }
    }

    pub fn builder() -> FieldValidatorBuilder {
        FieldValidatorBuilder::default()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ValidatorOptions::from_env()?))
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Open the validation phase for one request
    pub fn session<'r>(&'r self, request: &'r RequestData) -> ValidationSession<'r> {
        ValidationSession {
            validator: self,
            request,
            errors: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct FieldValidatorBuilder {
    options: ValidatorOptions,
    custom: Vec<(String, Arc<CustomFn>)>,
}

impl FieldValidatorBuilder {
    pub fn options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a custom predicate. It receives the raw field value, the
    /// constraint arguments and the whole request.
    pub fn custom_validator<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value], &RequestData) -> bool + Send + Sync + 'static,
    {
        let check: Arc<CustomFn> = Arc::new(check);
        self.custom.push((name.into(), check));
        self
    }

    pub fn error_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&str, &str, Option<&Value>) -> ErrorRecord + Send + Sync + 'static,
    {
        let formatter: ErrorFormatter = Arc::new(formatter);
        self.options.error_formatter = formatter;
        self
    }

    pub fn skip_validation_on_first_error(mut self, skip: bool) -> Self {
        self.options.skip_validation_on_first_error = skip;
        self
    }

    pub fn default_message(mut self, message: impl Into<String>) -> Self {
        self.options.default_message = message.into();
        self
    }

    pub fn schema_message(mut self, message: impl Into<String>) -> Self {
        self.options.schema_message = message.into();
        self
    }

    pub fn build(self) -> FieldValidator {
        let custom_count = self.custom.len();
        let registry = PredicateRegistry::register(BUILTINS, self.custom);
        tracing::debug!(
            predicates = registry.len(),
            custom = custom_count,
            "predicate registry built"
        );
        FieldValidator {
            registry: Arc::new(registry),
            options: self.options,
        }
    }
}

/// One request's validation phase
#[derive(Debug)]
pub struct ValidationSession<'r> {
    validator: &'r FieldValidator,
    request: &'r RequestData,
    errors: Vec<ErrorRecord>,
}

impl<'r> ValidationSession<'r> {
    pub fn validator(&self) -> &'r FieldValidator {
        self.validator
    }

    pub fn request(&self) -> &'r RequestData {
        self.request
    }

    /// Errors recorded so far, in order, duplicates included
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn record(&mut self, error: ErrorRecord) -> usize {
        self.errors.push(error);
        self.errors.len() - 1
    }

    pub(crate) fn replace(&mut self, index: usize, error: ErrorRecord) {
        if let Some(slot) = self.errors.get_mut(index) {
            *slot = error;
        }
    }

    /// Chain for `field` at `spec`, with an optional failure message used for
    /// every failing predicate
    pub fn check_in(
        &mut self,
        spec: LocationSpec,
        field: impl Into<FieldRef>,
        fail_message: Option<&str>,
    ) -> ValidatorChain<'_, 'r> {
        let field = field.into();
        let location = self.request.resolve(spec, &field);
        ValidatorChain::new(self, field, location, fail_message.map(str::to_string))
    }

    /// Chain for `field` wherever it is found (params, query, body, headers)
    pub fn check(&mut self, field: impl Into<FieldRef>) -> ValidatorChain<'_, 'r> {
        self.check_in(LocationSpec::Any, field, None)
    }

    pub fn check_params(&mut self, field: impl Into<FieldRef>) -> ValidatorChain<'_, 'r> {
        self.check_in(Location::Params.into(), field, None)
    }

    pub fn check_query(&mut self, field: impl Into<FieldRef>) -> ValidatorChain<'_, 'r> {
        self.check_in(Location::Query.into(), field, None)
    }

    pub fn check_body(&mut self, field: impl Into<FieldRef>) -> ValidatorChain<'_, 'r> {
        self.check_in(Location::Body.into(), field, None)
    }

    pub fn check_headers(&mut self, field: impl Into<FieldRef>) -> ValidatorChain<'_, 'r> {
        self.check_in(Location::Header.into(), field, None)
    }

    /// Run a schema, resolving each field with the locator unless it names
    /// its own location
    pub fn validate_schema(&mut self, schema: &Schema) -> Result<(), ValidatorError> {
        schema::execute(self, schema, LocationSpec::Any)
    }

    pub fn validate_schema_in(
        &mut self,
        schema: &Schema,
        location: Location,
    ) -> Result<(), ValidatorError> {
        schema::execute(self, schema, location.into())
    }

    /// Finish the validation phase, see [`aggregate::finalize`]
    pub fn finalize(&self, mapped: bool) -> Result<Outcome, ValidationFailure> {
        aggregate::finalize(&self.errors, self.request, mapped)
    }

    /// Errors keyed by param, or `None` when nothing failed
    pub fn mapped_errors(&self) -> Option<Map<String, Value>> {
        if self.errors.is_empty() {
            None
        } else {
            Some(aggregate::map_by_param(&self.errors))
        }
    }

    /// Merged request parameters, or the aggregate failure
    pub fn valid(&self) -> Result<Map<String, Value>, ValidationFailure> {
        if self.errors.is_empty() {
            Ok(aggregate::merged_params(self.request))
        } else {
            Err(ValidationFailure::new(aggregate::dedup(&self.errors)))
        }
    }
}
