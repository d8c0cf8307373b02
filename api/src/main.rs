use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use checker::ValidatorOptions;
use dotenv::dotenv;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

use api::{config::ServerConfig, observability, routes, state::AppState, validators};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    observability::init_tracing()?;

    let config = ServerConfig::from_env()?;
    let options = ValidatorOptions::from_env()?;
    let state = AppState::new(validators::build(options));

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:3000"))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::HeaderName::from_static("x-publisher-key")]);

    let app = routes::app(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
