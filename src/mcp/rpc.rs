//! JSON-RPC envelope types and formatting utilities
//!
//! Maps internal `AppError`s onto JSON-RPC error objects. The request id is
//! opaque and echoed back verbatim, `null` included.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

pub fn is_json_rpc_error(value: &Value) -> bool {
    value.get("error").is_some()
}

pub fn app_error_to_json_rpc(id: Value, err: AppError) -> Value {
    match err {
        AppError::BadRequest { message } => json_rpc_error_with_data(
            id,
            INVALID_PARAMS,
            "Invalid params",
            Some(json!({ "message": message })),
        ),
        AppError::NotFound { message } => json_rpc_error(id, METHOD_NOT_FOUND, &message),
        AppError::Internal { message } => {
            tracing::error!(error = %message, "mcp call failed with internal error");
            json_rpc_error(id, INTERNAL_ERROR, &format!("Internal error: {message}"))
        }
    }
}

pub fn json_rpc_error(id: Value, code: i32, message: &str) -> Value {
    json_rpc_error_with_data(id, code, message, None)
}

pub fn json_rpc_error_with_data(id: Value, code: i32, message: &str, data: Option<Value>) -> Value {
    to_value(RpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
    })
}

pub fn json_rpc_result(id: Value, result: Value) -> Value {
    to_value(RpcResponse {
        jsonrpc: "2.0",
        id,
        result: Some(result),
        error: None,
    })
}

fn to_value(response: RpcResponse) -> Value {
    // Only strings, numbers and `Value`s are involved, so this cannot fail.
    serde_json::to_value(&response).unwrap_or_else(|_| {
        json!({
            "jsonrpc": "2.0",
            "id": response.id,
            "error": { "code": INTERNAL_ERROR, "message": "Internal error" }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_echoes_null_id() {
        let value = json_rpc_error(Value::Null, PARSE_ERROR, "Parse error");
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32700, "message": "Parse error" }
            })
        );
    }

    #[test]
    fn result_has_no_error_key() {
        let value = json_rpc_result(json!("abc"), json!({}));
        assert_eq!(value["id"], "abc");
        assert!(value.get("result").is_some());
        assert!(!is_json_rpc_error(&value));
    }

    #[test]
    fn maps_app_errors_to_codes() {
        let not_found = app_error_to_json_rpc(json!(1), AppError::not_found("Unknown tool: x"));
        assert_eq!(not_found["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(not_found["error"]["message"], "Unknown tool: x");

        let internal = app_error_to_json_rpc(json!(2), AppError::internal("boom"));
        assert_eq!(internal["error"]["code"], INTERNAL_ERROR);
        assert_eq!(internal["error"]["message"], "Internal error: boom");

        let bad = app_error_to_json_rpc(json!(3), AppError::bad_request("missing name"));
        assert_eq!(bad["error"]["code"], INVALID_PARAMS);
        assert_eq!(bad["error"]["data"]["message"], "missing name");
    }
}
