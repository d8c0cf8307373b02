//! HTTP host for the `checker` validation engine

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod observability;
pub mod routes;
pub mod state;
pub mod validators;

pub use error::{ApiError, ApiResult};
pub use extract::Validation;
pub use state::AppState;
