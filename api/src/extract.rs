//! Request extraction for validation
//!
//! `Validation` gathers path params, query, body and headers from an axum
//! request into [`RequestData`] and pairs it with the shared
//! [`FieldValidator`], so a handler can open a session:
//!
//! ```ignore
//! pub async fn update_user(validation: Validation) -> ApiResult<Json<Value>> {
//!     let mut session = validation.session();
//!     session.check_params("id").is_int();
//!     let params = session.valid()?;
//!     // ...
//! }
//! ```

use std::sync::Arc;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRef, FromRequest, FromRequestParts, Query, RawPathParams, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    Form,
};
use checker::{FieldValidator, RequestData, ValidationSession};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Validator plus the request's data; must be the last handler argument
/// since it consumes the body
pub struct Validation {
    validator: Arc<FieldValidator>,
    data: RequestData,
}

impl Validation {
    pub fn new(validator: Arc<FieldValidator>, data: RequestData) -> Self {
        Self { validator, data }
    }

    pub fn data(&self) -> &RequestData {
        &self.data
    }

    /// Open this request's validation phase
    pub fn session(&self) -> ValidationSession<'_> {
        self.validator.session(&self.data)
    }
}

#[async_trait]
impl<S> FromRequest<S> for Validation
where
    Arc<FieldValidator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let validator = Arc::<FieldValidator>::from_ref(state);
        let data = request_data(req, state).await?;
        Ok(Self::new(validator, data))
    }
}

/// Split a request into the four validation buckets.
///
/// JSON bodies contribute their top-level object; form bodies their fields;
/// any other body is ignored.
pub async fn request_data<S>(req: Request, state: &S) -> Result<RequestData, ApiError>
where
    S: Send + Sync,
{
    let (mut parts, body) = req.into_parts();

    // Routes without captures have no path params to offer
    let params = match RawPathParams::from_request_parts(&mut parts, state).await {
        Ok(raw) => raw
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect(),
        Err(_) => Map::new(),
    };

    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map_err(|err| ApiError::bad_request("InvalidQuery", err.body_text()))?;
    let query = collect_pairs(pairs);

    let headers = header_map(&parts.headers);
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();

    let req = Request::from_parts(parts, body);
    let body = if content_type.starts_with("application/json") {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request("InvalidBody", err.body_text()))?;
        json_object(&bytes)?
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request("InvalidBody", err.body_text()))?;
        collect_pairs(pairs)
    } else {
        Map::new()
    };

    tracing::debug!(
        params = params.len(),
        query = query.len(),
        body = body.len(),
        headers = headers.len(),
        "request data extracted"
    );

    Ok(RequestData {
        params,
        query,
        body,
        headers,
    })
}

fn json_object(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Ok(Map::new()),
        Err(err) => Err(ApiError::bad_request(
            "InvalidBody",
            format!("JSON syntax error: {}", err),
        )),
    }
}

/// Repeated keys collect into an array, in arrival order
fn collect_pairs(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    map
}

/// Header names are lowercase; repeated headers are joined with `, `
fn header_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        match map.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                map.insert(name.as_str().to_string(), Value::String(value.to_string()));
            }
        }
    }
    map
}
