//! News tools exposed via Model Context Protocol
//!
//! Provides `get_news_by_country` and `search_news` by delegating to the
//! `NewsProvider` held in `AppState`.

use rust_mcp_sdk::{
    macros,
    schema::{CallToolRequestParams, CallToolResult, ContentBlock, TextContent},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::{resolve_api_key, RequestConfig};
use crate::domain::format::{error_text, headlines_text, search_text};
use crate::mcp::rpc::{app_error_to_json_rpc, json_rpc_result};
use crate::news_client::{HeadlinesQuery, NewsApiError, SearchQuery};
use crate::{errors::AppError, AppState};

pub const GET_NEWS_BY_COUNTRY: &str = "get_news_by_country";
pub const SEARCH_NEWS: &str = "search_news";
pub const TOOL_NAMES: [&str; 2] = [GET_NEWS_BY_COUNTRY, SEARCH_NEWS];

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_LANGUAGE: &str = "en";

pub const CATEGORIES: [&str; 7] = [
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

pub const LANGUAGES: [&str; 14] = [
    "ar", "de", "en", "es", "fr", "he", "it", "nl", "no", "pt", "ru", "sv", "ud", "zh",
];

/// Request-scoped values a tool call needs beyond its arguments.
#[derive(Clone, Default)]
pub struct ToolContext {
    pub api_key: Option<String>,
    /// Set when the key came from the request's `config` rather than the environment.
    pub api_key_override: bool,
}

impl ToolContext {
    pub fn from_request(request: &RequestConfig, default_key: Option<&str>) -> Self {
        Self {
            api_key: resolve_api_key(request, default_key),
            api_key_override: request.has_api_key(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CountryNewsArgs {
    pub country: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchNewsArgs {
    pub query: Option<String>,
    pub language: Option<String>,
}

#[macros::mcp_tool(
    name = "get_news_by_country",
    description = "Get top news headlines for a country, optionally narrowed to a category"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetNewsByCountryTool {
    /// Two-letter ISO 3166-1 country code, e.g. "us" or "gb"
    pub country: String,
    /// News category (default: general)
    pub category: Option<String>,
}

#[macros::mcp_tool(
    name = "search_news",
    description = "Search recent news articles by keyword, newest first"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct SearchNewsTool {
    /// Keywords or phrase to search for
    pub query: String,
    /// Two-letter ISO 639-1 language code (default: en)
    pub language: Option<String>,
}

pub fn build_tools_list() -> Result<Vec<Value>, AppError> {
    let mut country_tool = tool_to_value(GetNewsByCountryTool::tool())?;
    constrain_property(&mut country_tool, "category", &CATEGORIES, DEFAULT_CATEGORY);

    let mut search_tool = tool_to_value(SearchNewsTool::tool())?;
    constrain_property(&mut search_tool, "language", &LANGUAGES, DEFAULT_LANGUAGE);

    Ok(vec![country_tool, search_tool])
}

fn tool_to_value(tool: rust_mcp_sdk::schema::Tool) -> Result<Value, AppError> {
    serde_json::to_value(tool)
        .map_err(|err| AppError::internal(format!("tool descriptor serialization failed: {err}")))
}

fn constrain_property(tool: &mut Value, property: &str, allowed: &[&str], default: &str) {
    let pointer = format!("/inputSchema/properties/{property}");
    if let Some(schema) = tool.pointer_mut(&pointer).and_then(Value::as_object_mut) {
        schema.insert("enum".to_string(), json!(allowed));
        schema.insert("default".to_string(), json!(default));
    }
}

pub async fn handle_tools_call(
    state: &AppState,
    context: &ToolContext,
    id: Value,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return app_error_to_json_rpc(id, AppError::bad_request("tools/call requires params"));
    };

    let Some(name) = raw_params.get("name").and_then(Value::as_str) else {
        return app_error_to_json_rpc(
            id,
            AppError::bad_request("tools/call params must include a tool name"),
        );
    };
    if !TOOL_NAMES.contains(&name) {
        let err = AppError::not_found(format!("Unknown tool: {name}"));
        return app_error_to_json_rpc(id, err);
    }

    let tool_call: CallToolRequestParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(err) => {
            return app_error_to_json_rpc(
                id,
                AppError::bad_request(format!("invalid tools/call params: {err}")),
            )
        }
    };

    match call_tool(state, context, tool_call).await {
        Ok(text) => match tool_result(text) {
            Ok(result) => json_rpc_result(id, result),
            Err(err) => app_error_to_json_rpc(id, err),
        },
        Err(err) => app_error_to_json_rpc(id, err),
    }
}

async fn call_tool(
    state: &AppState,
    context: &ToolContext,
    tool_call: CallToolRequestParams,
) -> Result<String, AppError> {
    let arguments = json!(tool_call.arguments.unwrap_or_default());

    match tool_call.name.as_str() {
        GET_NEWS_BY_COUNTRY => {
            let args: CountryNewsArgs = parse_arguments(GET_NEWS_BY_COUNTRY, arguments)?;
            Ok(get_news_by_country(state, context, args).await)
        }
        SEARCH_NEWS => {
            let args: SearchNewsArgs = parse_arguments(SEARCH_NEWS, arguments)?;
            Ok(search_news(state, context, args).await)
        }
        other => Err(AppError::not_found(format!("Unknown tool: {other}"))),
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, AppError> {
    serde_json::from_value(arguments)
        .map_err(|err| AppError::internal(format!("invalid arguments for {tool}: {err}")))
}

fn tool_result(text: String) -> Result<Value, AppError> {
    serde_json::to_value(CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text, None, None))],
        is_error: None,
        meta: None,
        structured_content: None,
    })
    .map_err(|err| AppError::internal(format!("tool result serialization failed: {err}")))
}

pub async fn get_news_by_country(
    state: &AppState,
    context: &ToolContext,
    args: CountryNewsArgs,
) -> String {
    let Some(country) = normalized(args.country).map(|value| value.to_ascii_lowercase()) else {
        return error_text("country is required");
    };
    let category = normalized(args.category)
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let query = HeadlinesQuery { country, category };
    let result = match context.api_key.as_deref() {
        Some(api_key) => state.news_provider.top_headlines(&query, api_key).await,
        None => Err(NewsApiError::MissingApiKey),
    };
    log_outcome(GET_NEWS_BY_COUNTRY, &result);

    headlines_text(result, &query.country, &query.category)
}

pub async fn search_news(state: &AppState, context: &ToolContext, args: SearchNewsArgs) -> String {
    let Some(query) = normalized(args.query) else {
        return error_text("query is required");
    };
    let language = normalized(args.language)
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let query = SearchQuery { query, language };
    let result = match context.api_key.as_deref() {
        Some(api_key) => state.news_provider.search_everything(&query, api_key).await,
        None => Err(NewsApiError::MissingApiKey),
    };
    log_outcome(SEARCH_NEWS, &result);

    search_text(result, &query.query)
}

fn normalized(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn log_outcome<T>(tool: &str, result: &Result<Vec<T>, NewsApiError>) {
    match result {
        Ok(articles) => info!(tool, articles = articles.len(), "news lookup completed"),
        Err(err) => warn!(tool, error = %err, "news lookup failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn descriptors_match_dispatch_names() {
        let tools = build_tools_list().expect("tools list");
        let names = tools
            .iter()
            .filter_map(|tool| tool["name"].as_str())
            .collect::<BTreeSet<_>>();

        assert_eq!(names, TOOL_NAMES.into_iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn category_schema_lists_allowed_values() {
        let tools = build_tools_list().expect("tools list");
        let category = &tools[0]["inputSchema"]["properties"]["category"];

        assert_eq!(category["default"], "general");
        assert!(category["enum"]
            .as_array()
            .expect("enum array")
            .contains(&json!("technology")));
    }

    #[test]
    fn required_fields_are_declared() {
        let tools = build_tools_list().expect("tools list");

        assert!(tools[0]["inputSchema"]["required"]
            .as_array()
            .expect("required array")
            .contains(&json!("country")));
        assert!(tools[1]["inputSchema"]["required"]
            .as_array()
            .expect("required array")
            .contains(&json!("query")));
    }

    #[test]
    fn wrongly_typed_arguments_are_internal_errors() {
        let err = parse_arguments::<CountryNewsArgs>(GET_NEWS_BY_COUNTRY, json!({ "country": 7 }))
            .expect_err("expected type error");
        assert!(matches!(err, AppError::Internal { .. }));
        assert!(err.to_string().contains("get_news_by_country"));
    }

    #[test]
    fn environment_key_is_not_an_override() {
        let from_env = ToolContext::from_request(&RequestConfig::default(), Some("env-key"));
        assert_eq!(from_env.api_key.as_deref(), Some("env-key"));
        assert!(!from_env.api_key_override);

        let request = RequestConfig {
            news_api_key: Some("request-key".to_string()),
        };
        let overridden = ToolContext::from_request(&request, Some("env-key"));
        assert_eq!(overridden.api_key.as_deref(), Some("request-key"));
        assert!(overridden.api_key_override);
    }

    #[test]
    fn blank_strings_normalize_to_none() {
        assert_eq!(normalized(Some("  ".to_string())), None);
        assert_eq!(normalized(Some(" us ".to_string())).as_deref(), Some("us"));
    }
}
