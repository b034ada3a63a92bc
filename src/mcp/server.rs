//! The central Model Context Protocol engine
//!
//! Decodes JSON-RPC envelopes, answers the capability handshake (`initialize`),
//! and routes `tools/*` calls to the news tools.

use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ServerCapabilities, ServerCapabilitiesTools,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::domain::tools::{build_tools_list, handle_tools_call, ToolContext};
use crate::mcp::rpc::{
    app_error_to_json_rpc, is_json_rpc_error, json_rpc_error, json_rpc_result, RpcRequest,
    INVALID_REQUEST, METHOD_NOT_FOUND,
};
use crate::{errors::AppError, AppState};

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2025-03-26";
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

pub fn initialize_result() -> Result<Value, AppError> {
    let initialize_result = InitializeResult {
        server_info: Implementation {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("Geo News MCP Server".to_string()),
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(false),
            }),
            ..Default::default()
        },
        protocol_version: SUPPORTED_PROTOCOL_VERSION.to_string(),
        instructions: Some(
            "Use get_news_by_country for headlines and search_news for keyword search.".to_string(),
        ),
        meta: None,
    };

    serde_json::to_value(initialize_result)
        .map_err(|err| AppError::internal(format!("initialize result serialization failed: {err}")))
}

/// The document served on `GET /mcp`: the initialize result in a JSON-RPC envelope with a null id.
pub fn capabilities_document() -> Value {
    match initialize_result() {
        Ok(result) => json_rpc_result(Value::Null, result),
        Err(err) => app_error_to_json_rpc(Value::Null, err),
    }
}

pub async fn handle_json_rpc_value(
    state: &AppState,
    context: &ToolContext,
    payload: Value,
) -> Option<Value> {
    if !payload.is_object() {
        return Some(json_rpc_error(Value::Null, INVALID_REQUEST, "Invalid Request"));
    }

    let request_id = payload.get("id").cloned().unwrap_or(Value::Null);
    let request: RpcRequest = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(_) => return Some(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request")),
    };

    if request.method.trim().is_empty()
        || request
            .jsonrpc
            .as_deref()
            .is_some_and(|version| version != "2.0")
    {
        return Some(json_rpc_error(request_id, INVALID_REQUEST, "Invalid Request"));
    }

    if request.id.is_none() && request.method.starts_with("notifications/") {
        debug!(method = %request.method, "notification received");
        return None;
    }

    Some(
        handle_json_rpc_request(
            state,
            context,
            request.id.unwrap_or(Value::Null),
            request.method,
            request.params,
        )
        .await,
    )
}

pub async fn handle_json_rpc_request(
    state: &AppState,
    context: &ToolContext,
    id: Value,
    method: String,
    params: Option<Value>,
) -> Value {
    let audit_params = redact_audit_params(params.as_ref());

    let response = match method.as_str() {
        "initialize" => match initialize_result() {
            Ok(result) => json_rpc_result(id, result),
            Err(err) => app_error_to_json_rpc(id, err),
        },
        "ping" => json_rpc_result(id, json!({})),
        "tools/list" => match build_tools_list() {
            Ok(tools) => json_rpc_result(id, json!({ "tools": tools })),
            Err(err) => app_error_to_json_rpc(id, err),
        },
        "tools/call" => handle_tools_call(state, context, id, params).await,
        _ => json_rpc_error(id, METHOD_NOT_FOUND, "Unknown method"),
    };

    info!(
        method = %method,
        params = %audit_params,
        api_key_override = context.api_key_override,
        api_key_resolved = context.api_key.is_some(),
        outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
        "mcp action audited"
    );

    response
}

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_audit_value).unwrap_or(Value::Null)
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "authorization" | "bearer" | "api_key" | "apikey" | "newsapikey" | "news_api_key"
    ) || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}

#[cfg(test)]
mod tests {
    use super::{capabilities_document, is_sensitive_key, redact_audit_params, SUPPORTED_PROTOCOL_VERSION};
    use serde_json::json;

    #[test]
    fn redacts_sensitive_fields_in_audit_params() {
        let params = json!({
            "name": "search_news",
            "arguments": {
                "query": "elections",
                "apiKey": "should-not-appear",
                "nested": {
                    "access_token": "should-not-appear"
                }
            }
        });

        let redacted = redact_audit_params(Some(&params));

        assert_eq!(redacted["name"], json!("search_news"));
        assert_eq!(redacted["arguments"]["query"], json!("elections"));
        assert_eq!(redacted["arguments"]["apiKey"], json!("[REDACTED]"));
        assert_eq!(
            redacted["arguments"]["nested"]["access_token"],
            json!("[REDACTED]")
        );
    }

    #[test]
    fn plain_argument_names_are_not_sensitive() {
        assert!(!is_sensitive_key("country"));
        assert!(!is_sensitive_key("query"));
        assert!(is_sensitive_key("NEWS_API_KEY"));
    }

    #[test]
    fn capabilities_document_advertises_protocol_and_name() {
        let document = capabilities_document();

        assert_eq!(document["jsonrpc"], "2.0");
        assert!(document["id"].is_null());
        assert_eq!(
            document["result"]["protocolVersion"],
            SUPPORTED_PROTOCOL_VERSION
        );
        assert_eq!(document["result"]["serverInfo"]["name"], "geo-news-mcp");
        assert!(document["result"]["capabilities"]["tools"].is_object());
    }
}
