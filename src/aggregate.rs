//! Corpus aggregation: built-in entries plus whatever the catalogs return.
//!
//! # Flow
//!
//! 1. Build the static + FAQ items (the degraded corpus).
//! 2. Fetch properties and articles concurrently, each bounded by the
//!    catalog timeout.
//! 3. Map records into items and assemble in fixed order:
//!    static → FAQ → properties → articles.
//!
//! A catalog that errors or times out contributes nothing; the failure is
//! logged and recorded in the corpus's [`SourceStatus`] list, never
//! returned. Only a broken built-in corpus is an error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use concierge_core::catalog::{ArticleCatalog, PropertyCatalog};
use concierge_core::corpus::{
    article_item, assemble, builtin_items, property_item, Corpus, SourceStatus,
};
use concierge_core::models::ContentItem;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::catalog_http::catalogs_from_config;
use crate::config::Config;

/// Anything that can hand the responder a corpus to rank against.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn corpus(&self) -> Result<Arc<Corpus>>;
}

/// Pulls a fresh corpus from the built-in entries and the catalogs.
pub struct Aggregator {
    properties: Option<Arc<dyn PropertyCatalog>>,
    articles: Option<Arc<dyn ArticleCatalog>>,
    article_limit: usize,
    timeout: Duration,
}

impl Aggregator {
    /// An aggregator with no catalogs; yields only built-in items.
    pub fn new(timeout: Duration, article_limit: usize) -> Self {
        Self {
            properties: None,
            articles: None,
            article_limit,
            timeout,
        }
    }

    pub fn with_properties(mut self, catalog: Arc<dyn PropertyCatalog>) -> Self {
        self.properties = Some(catalog);
        self
    }

    pub fn with_articles(mut self, catalog: Arc<dyn ArticleCatalog>) -> Self {
        self.articles = Some(catalog);
        self
    }

    /// Wire the HTTP catalogs named in `[catalog]`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalogs = catalogs_from_config(&config.catalog)?;
        let mut aggregator = Self::new(config.catalog.timeout(), config.catalog.article_limit);
        aggregator.properties = catalogs.properties;
        aggregator.articles = catalogs.articles;
        Ok(aggregator)
    }

    /// Build a corpus. Catalog failures degrade the result instead of
    /// failing it.
    pub async fn aggregate(&self) -> Result<Corpus> {
        let builtin = builtin_items().context("Failed to build built-in corpus")?;

        let ((properties, property_status), (articles, article_status)) =
            tokio::join!(self.fetch_properties(), self.fetch_articles());

        let assembly = assemble([builtin, properties, articles]);
        for dropped in &assembly.dropped {
            warn!(id = %dropped.id, reason = %dropped.reason, "dropped content item");
        }

        let corpus = Corpus::new(
            assembly.items,
            vec![property_status, article_status],
            Utc::now(),
        );
        debug!(
            items = corpus.len(),
            degraded = corpus.degraded(),
            fingerprint = %corpus.fingerprint(),
            "corpus aggregated"
        );
        Ok(corpus)
    }

    async fn fetch_properties(&self) -> (Vec<ContentItem>, SourceStatus) {
        let Some(catalog) = &self.properties else {
            return (Vec::new(), SourceStatus::not_configured("properties"));
        };
        let label = catalog.label().to_string();
        match bounded(self.timeout, catalog.list_properties()).await {
            Ok(records) => {
                let items: Vec<ContentItem> = records.iter().map(property_item).collect();
                let status = SourceStatus::ok(label, items.len());
                (items, status)
            }
            Err(err) => {
                let reason = format!("{:#}", err);
                warn!(source = %label, error = %reason, "catalog unavailable, continuing without it");
                (Vec::new(), SourceStatus::failed(label, reason))
            }
        }
    }

    async fn fetch_articles(&self) -> (Vec<ContentItem>, SourceStatus) {
        let Some(catalog) = &self.articles else {
            return (Vec::new(), SourceStatus::not_configured("articles"));
        };
        let label = catalog.label().to_string();
        match bounded(self.timeout, catalog.list_articles(self.article_limit)).await {
            Ok(records) => {
                let items: Vec<ContentItem> = records.iter().map(article_item).collect();
                let status = SourceStatus::ok(label, items.len());
                (items, status)
            }
            Err(err) => {
                let reason = format!("{:#}", err);
                warn!(source = %label, error = %reason, "catalog unavailable, continuing without it");
                (Vec::new(), SourceStatus::failed(label, reason))
            }
        }
    }
}

#[async_trait]
impl CorpusSource for Aggregator {
    async fn corpus(&self) -> Result<Arc<Corpus>> {
        Ok(Arc::new(self.aggregate().await?))
    }
}

async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!("timed out after {}ms", timeout.as_millis()),
    }
}
