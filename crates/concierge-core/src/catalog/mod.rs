//! Read-only catalog collaborators.
//!
//! The aggregator pulls variable-size collections from two external
//! catalogs: properties and articles. These traits are the seam between
//! the corpus pipeline and whatever serves those records (an HTTP API in
//! production, [`memory::InMemoryCatalog`] in tests and embedded use).
//!
//! Both calls are idempotent reads. Implementations must be `Send + Sync`;
//! the aggregator fetches from both concurrently.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ArticleRecord, PropertyRecord};

/// `ListProperties() -> [{id, name, description, address, totalValue, type, region}]`
#[async_trait]
pub trait PropertyCatalog: Send + Sync {
    /// Short label used in logs and source status output.
    fn label(&self) -> &str {
        "properties"
    }

    async fn list_properties(&self) -> Result<Vec<PropertyRecord>>;
}

/// `ListArticles(limit) -> [{id, title, body, url, category, tags}]`
#[async_trait]
pub trait ArticleCatalog: Send + Sync {
    fn label(&self) -> &str {
        "articles"
    }

    /// Returns at most `limit` articles, in catalog order.
    async fn list_articles(&self, limit: usize) -> Result<Vec<ArticleRecord>>;
}
