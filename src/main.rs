use std::sync::Arc;

use geo_news_mcp::{build_app, config::Config, logging, news_client::NewsApiClient, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    if config.news_api_key.is_none() {
        warn!("NEWS_API_KEY is not set; tool calls need a per-request newsApiKey");
    }

    let provider = Arc::new(NewsApiClient::new(
        config.news_api_base_url.clone(),
        config.request_timeout,
    )?);
    let bind_socket = config.bind_socket()?;
    let state = AppState::new(config.news_api_key.clone(), provider);
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        news_api = %config.news_api_base_url,
        timeout_secs = config.request_timeout.as_secs(),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
