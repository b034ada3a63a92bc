//! Text rendering for tool results
//!
//! This is the only place that turns news lookups, successful or not, into the
//! human-readable text returned to MCP callers. Business failures become an
//! `Error: ...` sentence here and nowhere else.

use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::news_client::{NewsApiError, NewsArticle};

const NO_TITLE: &str = "No title";
const NO_DESCRIPTION: &str = "No description available";
const NO_LINK: &str = "No link available";
const NO_DATE: &str = "Unknown date";

pub fn error_text(reason: impl Display) -> String {
    format!("Error: {reason}")
}

pub fn headlines_text(
    result: Result<Vec<NewsArticle>, NewsApiError>,
    country: &str,
    category: &str,
) -> String {
    let articles = match result {
        Ok(articles) => articles,
        Err(err) => return error_text(err),
    };

    if articles.is_empty() {
        return format!("No news found for country: {country}, category: {category}");
    }

    let mut text = format!(
        "Top {category} headlines for {}:\n",
        country.to_ascii_uppercase()
    );
    for (index, article) in articles.iter().enumerate() {
        text.push_str(&format!(
            "\n{}. {}\n   {}\n{}   Link: {}\n",
            index + 1,
            field_or(&article.title, NO_TITLE),
            summary(article),
            source_line(article),
            field_or(&article.url, NO_LINK),
        ));
    }
    text
}

pub fn search_text(result: Result<Vec<NewsArticle>, NewsApiError>, query: &str) -> String {
    let articles = match result {
        Ok(articles) => articles,
        Err(err) => return error_text(err),
    };

    if articles.is_empty() {
        return format!("No news found for query: {query}");
    }

    let mut text = format!("Latest news for \"{query}\":\n");
    for (index, article) in articles.iter().enumerate() {
        text.push_str(&format!(
            "\n{}. {}\n   {}\n{}   Published: {}\n   Link: {}\n",
            index + 1,
            field_or(&article.title, NO_TITLE),
            summary(article),
            source_line(article),
            published(article.published_at.as_deref()),
            field_or(&article.url, NO_LINK),
        ));
    }
    text
}

fn field_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
}

fn summary(article: &NewsArticle) -> &str {
    [&article.description, &article.content]
        .into_iter()
        .filter_map(|value| value.as_deref().map(str::trim))
        .find(|value| !value.is_empty())
        .unwrap_or(NO_DESCRIPTION)
}

fn source_line(article: &NewsArticle) -> String {
    article
        .source
        .as_ref()
        .and_then(|source| source.name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| format!("   Source: {name}\n"))
        .unwrap_or_default()
}

fn published(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return NO_DATE.to_string();
    };

    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| {
            parsed
                .with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M UTC")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}
