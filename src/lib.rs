use std::sync::Arc;

use axum::{middleware, routing::get, Router};

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod news_client;

use news_client::NewsProvider;

#[derive(Clone)]
pub struct AppState {
    pub default_api_key: Option<Arc<str>>,
    pub news_provider: Arc<dyn NewsProvider>,
}

impl AppState {
    pub fn new(default_api_key: Option<String>, news_provider: Arc<dyn NewsProvider>) -> Self {
        Self {
            default_api_key: default_api_key.map(Arc::<str>::from),
            news_provider,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::home))
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .route(
            "/mcp",
            get(http::handlers::mcp_capabilities).post(http::handlers::mcp_endpoint),
        )
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
