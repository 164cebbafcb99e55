//! In-memory catalogs for tests and embedded deployments.
//!
//! [`InMemoryCatalog`] serves records from `Vec`s behind `std::sync::RwLock`
//! and implements both catalog traits. [`UnavailableCatalog`] always fails,
//! which is how tests exercise the degraded-corpus path.

use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::{ArticleRecord, PropertyRecord};

use super::{ArticleCatalog, PropertyCatalog};

/// Catalog backed by process memory.
#[derive(Default)]
pub struct InMemoryCatalog {
    properties: RwLock<Vec<PropertyRecord>>,
    articles: RwLock<Vec<ArticleRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(properties: Vec<PropertyRecord>, articles: Vec<ArticleRecord>) -> Self {
        Self {
            properties: RwLock::new(properties),
            articles: RwLock::new(articles),
        }
    }

    /// Replace the property list wholesale.
    pub fn set_properties(&self, records: Vec<PropertyRecord>) -> Result<()> {
        let mut guard = self
            .properties
            .write()
            .map_err(|_| anyhow!("property catalog lock poisoned"))?;
        *guard = records;
        Ok(())
    }

    /// Replace the article list wholesale.
    pub fn set_articles(&self, records: Vec<ArticleRecord>) -> Result<()> {
        let mut guard = self
            .articles
            .write()
            .map_err(|_| anyhow!("article catalog lock poisoned"))?;
        *guard = records;
        Ok(())
    }
}

#[async_trait]
impl PropertyCatalog for InMemoryCatalog {
    async fn list_properties(&self) -> Result<Vec<PropertyRecord>> {
        let guard = self
            .properties
            .read()
            .map_err(|_| anyhow!("property catalog lock poisoned"))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ArticleCatalog for InMemoryCatalog {
    async fn list_articles(&self, limit: usize) -> Result<Vec<ArticleRecord>> {
        let guard = self
            .articles
            .read()
            .map_err(|_| anyhow!("article catalog lock poisoned"))?;
        Ok(guard.iter().take(limit).cloned().collect())
    }
}

/// A catalog that is never reachable.
pub struct UnavailableCatalog {
    reason: String,
}

impl UnavailableCatalog {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PropertyCatalog for UnavailableCatalog {
    async fn list_properties(&self) -> Result<Vec<PropertyRecord>> {
        bail!("property catalog unavailable: {}", self.reason)
    }
}

#[async_trait]
impl ArticleCatalog for UnavailableCatalog {
    async fn list_articles(&self, _limit: usize) -> Result<Vec<ArticleRecord>> {
        bail!("article catalog unavailable: {}", self.reason)
    }
}
