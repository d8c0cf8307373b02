use api::{routes, state::AppState, validators};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use checker::ValidatorOptions;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    routes::app(AppState::new(validators::build(ValidatorOptions::default())))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn params_of(errors: &Value) -> Vec<&str> {
    errors
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["param"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["predicates"].as_u64().unwrap() > 20);
}

#[tokio::test]
async fn test_update_user_returns_merged_params() {
    let mut request = json_request(
        "POST",
        "/api/users/42?source=web",
        json!({
            "email": "ada@example.com",
            "nickname": "ada",
            "password": "pw",
            "confirmPassword": "pw"
        }),
    );
    request
        .headers_mut()
        .insert("x-client", "cli".parse().unwrap());

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    let params = &body["params"];
    assert_eq!(params["id"], "42");
    assert_eq!(params["source"], "web");
    assert_eq!(params["email"], "ada@example.com");
    assert_eq!(params["x-client"], "cli");
    assert!(params.get("content-type").is_none());
}

#[tokio::test]
async fn test_update_user_reports_every_failure() {
    let request = json_request(
        "POST",
        "/api/users/abc",
        json!({ "email": "nope", "password": "a", "confirmPassword": "b" }),
    );
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["message"], "Validation failed for 3 fields");
    assert_eq!(body["code"], 400);
    assert!(body["correlation_id"].as_str().is_some());
    assert!(body["timestamp"].as_str().is_some());

    assert_eq!(params_of(&body["errors"]), vec!["id", "email", "confirmPassword"]);
    assert_eq!(body["errors"][0]["msg"], "id must be a positive integer");
    assert_eq!(body["errors"][0]["value"], "abc");
    assert_eq!(body["errors"][2]["msg"], "passwords do not match");
}

#[tokio::test]
async fn test_falsy_optional_field_is_skipped() {
    let request = json_request("POST", "/api/users/1", json!({ "nickname": "" }));
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_form_body_is_validated() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/users/7")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("email=not-an-email&nickname=x"))
        .unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(params_of(&body["errors"]), vec!["email", "nickname"]);
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/users/1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidBody");
}

#[tokio::test]
async fn test_search_reports_mapped_errors() {
    let request = Request::builder()
        .uri("/api/contracts/search?page=0&sort=stars")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors["q"]["msg"], "q is required");
    assert_eq!(errors["page"]["msg"], "page must be a positive integer");
    assert_eq!(errors["page"]["value"], "0");
    assert_eq!(errors["sort"]["msg"], "sort must be one of name, downloads, updated");
}

#[tokio::test]
async fn test_search_accepts_valid_query() {
    let request = Request::builder()
        .uri("/api/contracts/search?q=token&page=2&tag=defi&tag=nft")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"]["tag"], json!(["defi", "nft"]));
    assert_eq!(body["params"]["q"], "token");
}

#[tokio::test]
async fn test_publish_checks_body_and_headers() {
    let request = json_request(
        "POST",
        "/api/contracts",
        json!({ "name": "admin", "version": "1.2.3" }),
    );
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = &body["errors"];
    assert_eq!(params_of(errors), vec!["name", "x-publisher-key"]);
    assert_eq!(errors[0]["msg"], "name is reserved");
    assert_eq!(errors[1]["msg"], "publisher key is missing or too short");
    assert!(errors[1].get("value").is_none());
}

#[tokio::test]
async fn test_publish_accepts_valid_contract() {
    let mut request = json_request(
        "POST",
        "/api/contracts",
        json!({ "name": "token-vault", "version": "0.4.1", "tags": ["defi"] }),
    );
    request
        .headers_mut()
        .insert("x-publisher-key", "pk_0123456789abcdef".parse().unwrap());

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "token-vault");
    assert_eq!(body["version"], "0.4.1");
}

#[tokio::test]
async fn test_publish_rejects_bad_tags() {
    let mut request = json_request(
        "POST",
        "/api/contracts",
        json!({ "name": "vault", "version": "1.0.0", "tags": "defi" }),
    );
    request
        .headers_mut()
        .insert("x-publisher-key", "pk_0123456789abcdef".parse().unwrap());

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(params_of(&body["errors"]), vec!["tags"]);
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "RouteNotFound");
}
