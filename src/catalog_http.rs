//! HTTP clients for the property and article catalogs.
//!
//! Both catalogs are plain JSON list endpoints:
//!
//! | Catalog | Request | Response |
//! |---------|---------|----------|
//! | Properties | `GET {properties_url}` | `[{id, name, description, address, totalValue, type, region}]` |
//! | Articles | `GET {articles_url}?limit=N` | `[{id, title, body, url, category, tags}]` |
//!
//! Non-2xx statuses, transport errors, and bodies that do not decode into
//! the record shape are all returned as errors; the aggregator decides what
//! to do with them. No retries happen here.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use concierge_core::catalog::{ArticleCatalog, PropertyCatalog};
use concierge_core::models::{ArticleRecord, PropertyRecord};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CatalogConfig;

/// Build the shared HTTP client with the configured request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("concierge/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Longest slice of an upstream error body kept in an error message.
const ERROR_BODY_CHARS: usize = 200;

/// Whitespace-collapsed error body, capped at [`ERROR_BODY_CHARS`].
fn error_excerpt(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = flat.chars();
    let mut out: String = chars.by_ref().take(ERROR_BODY_CHARS).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

pub struct HttpPropertyCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpPropertyCatalog {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PropertyCatalog for HttpPropertyCatalog {
    async fn list_properties(&self) -> Result<Vec<PropertyRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("property catalog request failed: {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("property catalog returned {}: {}", status, error_excerpt(&body));
        }

        response
            .json::<Vec<PropertyRecord>>()
            .await
            .context("property catalog returned malformed records")
    }
}

pub struct HttpArticleCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpArticleCatalog {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ArticleCatalog for HttpArticleCatalog {
    async fn list_articles(&self, limit: usize) -> Result<Vec<ArticleRecord>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("limit", limit)])
            .send()
            .await
            .with_context(|| format!("article catalog request failed: {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("article catalog returned {}: {}", status, error_excerpt(&body));
        }

        let mut articles = response
            .json::<Vec<ArticleRecord>>()
            .await
            .context("article catalog returned malformed records")?;
        // Some servers ignore the limit parameter.
        articles.truncate(limit);
        Ok(articles)
    }
}

/// Catalog clients for whichever endpoints the config names.
pub struct HttpCatalogs {
    pub properties: Option<Arc<dyn PropertyCatalog>>,
    pub articles: Option<Arc<dyn ArticleCatalog>>,
}

pub fn catalogs_from_config(config: &CatalogConfig) -> Result<HttpCatalogs> {
    let client = build_client(config.timeout())?;

    let properties = config.properties_url.as_ref().map(|url| {
        Arc::new(HttpPropertyCatalog::new(client.clone(), url.as_str())) as Arc<dyn PropertyCatalog>
    });
    let articles = config.articles_url.as_ref().map(|url| {
        Arc::new(HttpArticleCatalog::new(client.clone(), url.as_str())) as Arc<dyn ArticleCatalog>
    });

    Ok(HttpCatalogs {
        properties,
        articles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_urls_no_catalogs() {
        let cats = catalogs_from_config(&CatalogConfig::default()).unwrap();
        assert!(cats.properties.is_none());
        assert!(cats.articles.is_none());
    }

    #[test]
    fn test_configured_urls_build_catalogs() {
        let cfg = CatalogConfig {
            properties_url: Some("http://127.0.0.1:1/properties".to_string()),
            articles_url: Some("http://127.0.0.1:1/articles".to_string()),
            ..CatalogConfig::default()
        };
        let cats = catalogs_from_config(&cfg).unwrap();
        assert_eq!(cats.properties.unwrap().label(), "properties");
        assert_eq!(cats.articles.unwrap().label(), "articles");
    }

    #[test]
    fn test_error_excerpt_caps_long_bodies() {
        assert_eq!(error_excerpt("  upstream\n down "), "upstream down");

        let page = format!("<html>{}</html>", "오류".repeat(500));
        let short = error_excerpt(&page);
        assert_eq!(short.chars().count(), ERROR_BODY_CHARS + 3);
        assert!(short.ends_with("..."));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_errors() {
        let client = build_client(Duration::from_secs(2)).unwrap();
        // Port 1 on loopback refuses connections.
        let catalog = HttpPropertyCatalog::new(client, "http://127.0.0.1:1/properties");
        let err = catalog.list_properties().await.unwrap_err();
        assert!(err.to_string().contains("property catalog request failed"));
    }
}
