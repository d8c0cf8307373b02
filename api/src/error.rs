use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use checker::{ErrorRecord, ValidationFailure, ValidatorError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: String,
    errors: Vec<ErrorRecord>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ErrorRecord>,
    code: u16,
    timestamp: String,
    correlation_id: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, message)
    }

    pub fn not_found(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        let message = failure.to_string();
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "ValidationError".to_string(),
            message,
            errors: failure.into_errors(),
        }
    }
}

// A bad predicate name or schema is a server-side bug, not a client error
impl From<ValidatorError> for ApiError {
    fn from(err: ValidatorError) -> Self {
        tracing::error!(error = %err, "validator misconfigured");
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let correlation_id = Uuid::new_v4().to_string();
        let payload = ErrorResponse {
            error: self.error,
            message: self.message,
            errors: self.errors,
            code: self.status.as_u16(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            correlation_id: correlation_id.clone(),
        };

        let mut response = (self.status, Json(payload)).into_response();
        if let Ok(value) = HeaderValue::from_str(&correlation_id) {
            response.headers_mut().insert(header::HeaderName::from_static("x-correlation-id"), value);
        }
        response
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_failure_maps_to_bad_request() {
        let failure = ValidationFailure::new(vec![
            ErrorRecord::new("id", "must be an integer", Some(json!("abc"))),
            ErrorRecord::new("email", "must be a valid email", None),
        ]);
        let err = ApiError::from(failure);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.errors().len(), 2);
        assert_eq!(err.message, "Validation failed for 2 fields");
    }

    #[test]
    fn test_validator_error_is_internal() {
        let err = ApiError::from(ValidatorError::UnknownPredicate("isMagic".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.errors().is_empty());
    }

    #[test]
    fn test_response_carries_correlation_id() {
        let response = ApiError::bad_request("InvalidBody", "broken").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("x-correlation-id"));
    }
}
