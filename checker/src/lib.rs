//! Request field validation
//!
//! Validates named fields of an already-parsed request (path params, query,
//! body and headers) against named predicates, collects the failures and
//! finishes with either the errors or the merged request parameters.
//!
//! # Overview
//!
//! 1. **FieldValidator** - built once: built-in and custom predicates plus options
//! 2. **ValidationSession** - one per request, owns the request's error list
//! 3. **ValidatorChain** - per-field fluent checks (`check_body("email").is_email()`)
//! 4. **Schema** - declarative per-field constraint sets run through the same chains
//!
//! # Usage
//!
//! ```ignore
//! use checker::{FieldValidator, OptionalOptions, RequestData, Schema};
//!
//! let validator = FieldValidator::builder()
//!     .custom_validator("isEven", |value, _, _| {
//!         value.and_then(|v| v.as_i64()).map_or(false, |n| n % 2 == 0)
//!     })
//!     .build();
//!
//! let mut session = validator.session(&request);
//! session.check_params("id").is_int();
//! session.check_body("nickname").optional(OptionalOptions::check_falsy()).len(&[json!({"max": 32})]);
//! session.validate_schema(&Schema::try_from(json!({"age": {"isInt": {}}}))?)?;
//!
//! let params = session.valid()?;
//! ```

pub mod aggregate;
pub mod chain;
pub mod config;
pub mod errors;
pub mod format;
pub mod location;
pub mod predicates;
pub mod registry;
pub mod schema;
pub mod session;

// Re-export commonly used items
pub use aggregate::{Outcome, HEADER_DENYLIST};
pub use chain::{ChainState, OptionalOptions, ValidatorChain};
pub use config::{ConfigError, ErrorFormatter, ValidatorOptions};
pub use errors::{ErrorRecord, ValidationFailure, ValidatorError};
pub use format::format_param;
pub use location::{FieldRef, Location, LocationSpec, RequestData};
pub use registry::{CustomFn, Predicate, PredicateRegistry};
pub use schema::{Constraint, FieldLocation, FieldSchema, Schema};
pub use session::{FieldValidator, FieldValidatorBuilder, ValidationSession};
