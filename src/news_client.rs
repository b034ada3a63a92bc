//! Client for the News API REST service
//!
//! `NewsProvider` is the seam the tool handlers call through; `NewsApiClient`
//! is the reqwest-backed implementation used by the server binary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Every upstream call is capped at this many articles.
pub const PAGE_SIZE: u8 = 5;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct ArticleSource {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewsApiResponse {
    pub fn into_articles(self) -> Result<Vec<NewsArticle>, NewsApiError> {
        if self.status == "ok" {
            return Ok(self.articles);
        }

        Err(NewsApiError::Api {
            code: self.code,
            message: self
                .message
                .unwrap_or_else(|| format!("status \"{}\"", self.status)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlinesQuery {
    pub country: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub language: String,
}

#[derive(Debug, Error)]
pub enum NewsApiError {
    #[error("no News API key configured")]
    MissingApiKey,
    #[error("failed to reach News API: {0}")]
    Transport(String),
    #[error("unexpected response from News API: {0}")]
    Decode(String),
    #[error("News API returned an error: {message}")]
    Api {
        code: Option<String>,
        message: String,
    },
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn top_headlines(
        &self,
        query: &HeadlinesQuery,
        api_key: &str,
    ) -> Result<Vec<NewsArticle>, NewsApiError>;

    async fn search_everything(
        &self,
        query: &SearchQuery,
        api_key: &str,
    ) -> Result<Vec<NewsArticle>, NewsApiError>;
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, NewsApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| NewsApiError::Transport(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        api_key: &str,
    ) -> Result<Vec<NewsArticle>, NewsApiError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("X-Api-Key", api_key)
            .send()
            .await
            .map_err(|err| NewsApiError::Transport(err.to_string()))?;

        let status = response.status();
        // News API reports failures as `{"status":"error",...}` bodies on non-2xx codes too.
        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|err| NewsApiError::Decode(format!("HTTP {status}: {err}")))?;

        debug!(
            endpoint,
            http_status = status.as_u16(),
            api_status = %body.status,
            total_results = body.total_results,
            "news api responded"
        );

        body.into_articles()
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn top_headlines(
        &self,
        query: &HeadlinesQuery,
        api_key: &str,
    ) -> Result<Vec<NewsArticle>, NewsApiError> {
        self.fetch(
            "top-headlines",
            &[
                ("country", query.country.clone()),
                ("category", query.category.clone()),
                ("pageSize", PAGE_SIZE.to_string()),
            ],
            api_key,
        )
        .await
    }

    async fn search_everything(
        &self,
        query: &SearchQuery,
        api_key: &str,
    ) -> Result<Vec<NewsArticle>, NewsApiError> {
        self.fetch(
            "everything",
            &[
                ("q", query.query.clone()),
                ("language", query.language.clone()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
            ],
            api_key,
        )
        .await
    }
}
