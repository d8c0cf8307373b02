use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, observability::request_logger, state::AppState};

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/api/users/:id", post(handlers::update_user))
}

pub fn contract_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contracts/search", get(handlers::search))
        .route("/api/contracts", post(handlers::publish_contract))
}

/// Full router with logging layers and state attached
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_routes())
        .merge(contract_routes())
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
