//! Snapshot cache for the aggregated corpus.
//!
//! Readers call [`CorpusCache::snapshot`], a lock-free `ArcSwap` load that
//! never blocks on a refresh in flight. [`CorpusCache::refresh`] rebuilds
//! the corpus through the [`Aggregator`] and swaps the new snapshot in
//! atomically; requests already ranking against the old snapshot keep it
//! alive through their `Arc` until they finish.
//!
//! Refreshes are serialized so two overlapping triggers (the periodic task
//! and `POST /corpus/refresh`) do not hit the catalogs twice at once. A
//! failed refresh keeps the previous snapshot.

use anyhow::Result;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use concierge_core::corpus::Corpus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::aggregate::{Aggregator, CorpusSource};

pub struct CorpusCache {
    aggregator: Aggregator,
    current: ArcSwap<Corpus>,
    refreshing: Mutex<()>,
}

impl CorpusCache {
    /// Aggregate once and start serving that snapshot.
    pub async fn load(aggregator: Aggregator) -> Result<Self> {
        let initial = aggregator.aggregate().await?;
        log_snapshot("loaded", &initial);
        Ok(Self {
            aggregator,
            current: ArcSwap::from_pointee(initial),
            refreshing: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> Arc<Corpus> {
        self.current.load_full()
    }

    pub async fn refresh(&self) -> Result<Arc<Corpus>> {
        let _guard = self.refreshing.lock().await;
        let fresh = Arc::new(self.aggregator.aggregate().await?);
        log_snapshot("refreshed", &fresh);
        self.current.store(fresh.clone());
        Ok(fresh)
    }

    /// Refresh every `every` until the returned task is aborted.
    pub fn spawn_refresh(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // First tick fires immediately; the snapshot is already fresh.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = cache.refresh().await {
                    let reason = format!("{:#}", err);
                    warn!(error = %reason, "corpus refresh failed, keeping previous snapshot");
                }
            }
        })
    }
}

#[async_trait]
impl CorpusSource for CorpusCache {
    async fn corpus(&self) -> Result<Arc<Corpus>> {
        Ok(self.snapshot())
    }
}

fn log_snapshot(action: &str, corpus: &Corpus) {
    info!(
        items = corpus.len(),
        degraded = corpus.degraded(),
        fingerprint = %corpus.fingerprint(),
        "corpus snapshot {}",
        action
    );
}
