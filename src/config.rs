use std::{env, fmt, net::SocketAddr, time::Duration};

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub news_api_key: Option<String>,
    pub news_api_base_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
    #[error("NEWS_API_BASE_URL must be an absolute http(s) URL")]
    InvalidBaseUrl,
    #[error("NEWS_API_TIMEOUT_SECS must be a positive integer")]
    InvalidTimeout,
    #[error("config query parameter must be a JSON object: {0}")]
    InvalidRequestConfig(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let bind_port = lookup("PORT")
            .map(|value| {
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort)
            })
            .transpose()?
            .unwrap_or(5000);
        let news_api_key = non_blank(lookup("NEWS_API_KEY"));

        let news_api_base_url = non_blank(lookup("NEWS_API_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_NEWS_API_BASE_URL.to_string());
        let parsed_url = Url::parse(&news_api_base_url).map_err(|_| ConfigError::InvalidBaseUrl)?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl);
        }

        let timeout_secs = lookup("NEWS_API_TIMEOUT_SECS")
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidTimeout)
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let config = Self {
            bind_addr,
            bind_port,
            news_api_key,
            news_api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

/// Per-request configuration carried in the `config` query parameter.
///
/// Lives only for the request that supplied it.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    #[serde(default, alias = "apiKey", alias = "NEWS_API_KEY", alias = "news_api_key")]
    pub news_api_key: Option<String>,
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field(
                "news_api_key",
                &self.news_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl RequestConfig {
    pub fn from_query_value(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(raw).map_err(|err| ConfigError::InvalidRequestConfig(err.to_string()))
    }

    pub fn has_api_key(&self) -> bool {
        self.news_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// First non-blank key wins: request override, then the environment default.
pub fn resolve_api_key(request: &RequestConfig, default_key: Option<&str>) -> Option<String> {
    non_blank(request.news_api_key.clone())
        .or_else(|| non_blank(default_key.map(str::to_string)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn parse_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).expect("config should parse");
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.bind_port, 5000);
        assert_eq!(config.news_api_key, None);
        assert_eq!(config.news_api_base_url, DEFAULT_NEWS_API_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn reads_port_and_key() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8081"),
            ("NEWS_API_KEY", "  env-key  "),
        ]))
        .expect("config should parse");

        assert_eq!(config.bind_port, 8081);
        assert_eq!(config.news_api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn invalid_port_fails() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "99999")]))
            .expect_err("expected invalid port error");
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn invalid_base_url_fails() {
        let err = Config::from_lookup(lookup_from(&[("NEWS_API_BASE_URL", "ftp://example.com")]))
            .expect_err("expected invalid base url error");
        assert!(matches!(err, ConfigError::InvalidBaseUrl));
    }

    #[test]
    fn zero_timeout_fails() {
        let err = Config::from_lookup(lookup_from(&[("NEWS_API_TIMEOUT_SECS", "0")]))
            .expect_err("expected invalid timeout error");
        assert!(matches!(err, ConfigError::InvalidTimeout));
    }

    #[test]
    fn request_config_accepts_aliases() {
        let camel = RequestConfig::from_query_value(r#"{"newsApiKey":"a"}"#).expect("camel case");
        let alias = RequestConfig::from_query_value(r#"{"apiKey":"b"}"#).expect("alias");

        assert_eq!(camel.news_api_key.as_deref(), Some("a"));
        assert_eq!(alias.news_api_key.as_deref(), Some("b"));
    }

    #[test]
    fn request_config_rejects_malformed_json() {
        let err = RequestConfig::from_query_value("{not json").expect_err("malformed");
        assert!(matches!(err, ConfigError::InvalidRequestConfig(_)));
    }

    #[test]
    fn request_config_debug_hides_key() {
        let config = RequestConfig {
            news_api_key: Some("super-secret".to_string()),
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn resolve_prefers_request_override() {
        let request = RequestConfig {
            news_api_key: Some("request-key".to_string()),
        };
        assert_eq!(
            resolve_api_key(&request, Some("env-key")).as_deref(),
            Some("request-key")
        );
    }

    #[test]
    fn resolve_falls_back_to_default_on_blank_override() {
        let request = RequestConfig {
            news_api_key: Some("   ".to_string()),
        };
        assert_eq!(
            resolve_api_key(&request, Some("env-key")).as_deref(),
            Some("env-key")
        );
        assert_eq!(resolve_api_key(&RequestConfig::default(), None), None);
    }
}
