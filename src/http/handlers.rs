//! Axum HTTP handlers for the web server
//!
//! Provides the Model Context Protocol endpoint, the status page and general
//! metadata endpoints.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RequestConfig;
use crate::domain::tools::ToolContext;
use crate::mcp::rpc::{json_rpc_error, INVALID_REQUEST, PARSE_ERROR};
use crate::mcp::server::{capabilities_document, handle_json_rpc_value};
use crate::AppState;

const STATUS_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>Geo News MCP Server</title></head>
  <body>
    <h1>Geo News MCP Server</h1>
    <p>Model Context Protocol server for news data</p>
    <p>MCP endpoint: <code>/mcp</code></p>
    <p>Status: Running</p>
  </body>
</html>
"#;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct McpQuery {
    pub config: Option<String>,
}

impl McpQuery {
    fn request_config(&self) -> RequestConfig {
        let Some(raw) = self.config.as_deref() else {
            return RequestConfig::default();
        };

        match RequestConfig::from_query_value(raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "ignoring malformed config query parameter");
                RequestConfig::default()
            }
        }
    }
}

/// Malformed configuration, including a query string that fails to decode,
/// is logged and ignored rather than failing the call.
fn request_config_from(query: Result<Query<McpQuery>, QueryRejection>) -> RequestConfig {
    match query {
        Ok(Query(query)) => query.request_config(),
        Err(rejection) => {
            warn!(error = %rejection, "ignoring undecodable query string");
            RequestConfig::default()
        }
    }
}

pub async fn home() -> Html<&'static str> {
    Html(STATUS_PAGE)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: "/mcp",
    })
}

pub async fn mcp_capabilities(query: Result<Query<McpQuery>, QueryRejection>) -> Json<Value> {
    let request_config = request_config_from(query);
    debug!(
        has_api_key = request_config.has_api_key(),
        "capability query received"
    );

    Json(capabilities_document())
}

pub async fn mcp_endpoint(
    State(state): State<AppState>,
    query: Result<Query<McpQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    let request_config = request_config_from(query);
    let context = ToolContext::from_request(&request_config, state.default_api_key.as_deref());

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => {
            return (
                StatusCode::OK,
                Json(json_rpc_error(Value::Null, PARSE_ERROR, "Parse error")),
            )
                .into_response()
        }
    };

    if let Some(batch) = payload.as_array() {
        if batch.is_empty() {
            return (
                StatusCode::OK,
                Json(json_rpc_error(Value::Null, INVALID_REQUEST, "Invalid Request")),
            )
                .into_response();
        }

        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = handle_json_rpc_value(&state, &context, item.clone()).await {
                responses.push(response);
            }
        }

        if responses.is_empty() {
            return StatusCode::NO_CONTENT.into_response();
        }

        return (StatusCode::OK, Json(Value::Array(responses))).into_response();
    }

    match handle_json_rpc_value(&state, &context, payload).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
