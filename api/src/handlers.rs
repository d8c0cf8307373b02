use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use checker::{Location, OptionalOptions, Outcome, Schema};
use lazy_static::lazy_static;
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    extract::Validation,
    state::AppState,
};

lazy_static! {
    static ref SEARCH_SCHEMA: Schema = Schema::try_from(json!({
        "q": {
            "notEmpty": { "errorMessage": "q is required" },
            "isLength": { "options": [{ "max": 100 }], "errorMessage": "q must be at most 100 characters" }
        },
        "page": {
            "optional": {},
            "isInt": { "options": [{ "min": 1 }] },
            "errorMessage": "page must be a positive integer"
        },
        "sort": {
            "optional": {},
            "isIn": { "options": [["name", "downloads", "updated"]] },
            "errorMessage": "sort must be one of name, downloads, updated"
        }
    }))
    .unwrap();

    static ref PUBLISH_SCHEMA: Schema = Schema::try_from(json!({
        "name": {
            "in": "body",
            "notEmpty": {},
            "isLength": { "options": [{ "max": 64 }] },
            "notReserved": { "errorMessage": "name is reserved" },
            "errorMessage": "name must be 1-64 characters"
        },
        "version": {
            "in": "body",
            "isSemVer": { "errorMessage": "version must be a semantic version" }
        },
        "x-publisher-key": {
            "in": "header",
            "isLength": { "options": [{ "min": 16 }] },
            "errorMessage": "publisher key is missing or too short"
        },
        "tags": {
            "in": "body",
            "optional": {},
            "isTagList": { "errorMessage": "tags must be at most 10 non-empty strings" }
        }
    }))
    .unwrap();
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "predicates": state.validator.registry().len(),
    }))
}

/// Imperative chains; failures abort with the aggregate error list
pub async fn update_user(validation: Validation) -> ApiResult<Json<Value>> {
    let mut session = validation.session();

    session
        .check_params("id")
        .is_int_range(json!({ "min": 1 }))
        .with_message("id must be a positive integer");
    session
        .check_body("email")
        .optional(OptionalOptions::default())
        .is_email()
        .with_message("email must be a valid address");
    session
        .check_body("nickname")
        .optional(OptionalOptions::check_falsy())
        .len(&[json!({ "min": 2, "max": 32 })])
        .with_message("nickname must be 2-32 characters");
    session
        .check_body("confirmPassword")
        .optional(OptionalOptions::default())
        .apply("sameAsBody", &[json!("password")])?
        .with_message("passwords do not match");

    let params = session.valid()?;
    tracing::debug!(fields = params.len(), "user update accepted");

    Ok(Json(json!({ "status": "ok", "params": params })))
}

/// Schema over the query string; errors are reported keyed by field
pub async fn search(validation: Validation) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut session = validation.session();
    session.validate_schema_in(&SEARCH_SCHEMA, Location::Query)?;

    match session.finalize(true)? {
        Outcome::Mapped(errors) => Ok((StatusCode::BAD_REQUEST, Json(json!({ "errors": errors })))),
        Outcome::Params(params) => Ok((
            StatusCode::OK,
            Json(json!({ "query": validation.data().query, "params": params })),
        )),
    }
}

/// Schema with per-field locations mixing body and headers
pub async fn publish_contract(validation: Validation) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut session = validation.session();
    session.validate_schema(&PUBLISH_SCHEMA)?;

    match session.finalize(false)? {
        Outcome::Params(params) => {
            let name = params.get("name").cloned().unwrap_or(Value::Null);
            let version = params.get("version").cloned().unwrap_or(Value::Null);
            tracing::info!(%name, %version, "contract publish accepted");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "status": "created", "name": name, "version": version })),
            ))
        }
        Outcome::Mapped(_) => Err(ApiError::internal("unexpected mapped outcome")),
    }
}

pub async fn route_not_found() -> impl IntoResponse {
    ApiError::not_found("RouteNotFound", "Route not found")
}
