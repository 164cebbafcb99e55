//! `GenerateResponse`: classify, rank, compose.
//!
//! The [`Responder`] is the one boundary where pipeline failures are
//! caught. Whatever goes wrong underneath (an aggregation error, a panic
//! in a catalog client) the caller still receives a well-formed
//! [`ChatResponse`] carrying the fixed apology text and no provenance.

use anyhow::Result;
use chrono::Utc;
use concierge_core::classify::classify;
use concierge_core::compose::{compose, ComposeSettings, Reply};
use concierge_core::models::ChatResponse;
use concierge_core::rank::{RankedResult, ScoreWeights};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

use crate::aggregate::CorpusSource;
use crate::config::Config;

static LAST_RESPONSE_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp, bumped past the previous id when two responses
/// land in the same millisecond.
pub fn next_response_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let prev = LAST_RESPONSE_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(prev + 1)
}

#[derive(Clone)]
pub struct Responder {
    source: Arc<dyn CorpusSource>,
    weights: ScoreWeights,
    settings: ComposeSettings,
}

impl Responder {
    pub fn new(source: Arc<dyn CorpusSource>, weights: ScoreWeights, settings: ComposeSettings) -> Self {
        Self {
            source,
            weights,
            settings,
        }
    }

    pub fn from_config(config: &Config, source: Arc<dyn CorpusSource>) -> Self {
        Self::new(source, config.ranking.weights(), config.compose.settings())
    }

    /// Answer a chat message. Never fails.
    pub async fn generate_response(&self, message: &str) -> ChatResponse {
        let this = self.clone();
        let owned = message.to_string();
        // Run on its own task so a panic below surfaces as a JoinError.
        let outcome = tokio::spawn(async move { this.reply(&owned).await }).await;

        let reply = match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                error!(error = ?err, "response pipeline failed");
                Reply::apology()
            }
            Err(join_err) => {
                error!(error = %join_err, "response pipeline panicked");
                Reply::apology()
            }
        };
        reply.into_response(next_response_id(), Utc::now())
    }

    /// Classify and rank independently, then compose.
    pub async fn reply(&self, message: &str) -> Result<Reply> {
        let class = classify(message);
        let corpus = self.source.corpus().await?;
        let ranked = corpus.rank(message, &self.weights, false);

        let reply = compose(class, &ranked, &self.settings);
        debug!(
            class = %class,
            top_score = ranked.first().map(|r| r.score).unwrap_or(0),
            matched = reply.matched_id.as_deref().unwrap_or("-"),
            degraded = corpus.degraded(),
            "composed reply"
        );
        Ok(reply)
    }

    /// Ranked matches for a query, best first, at most `limit`.
    pub async fn search(&self, query: &str, explain: bool, limit: usize) -> Result<Vec<RankedResult>> {
        let corpus = self.source.corpus().await?;
        let mut results = corpus.rank(query, &self.weights, explain);
        results.truncate(limit);
        Ok(results)
    }
}

/// CLI entry point for `concierge ask`.
pub async fn run_ask(config: &Config, source: Arc<dyn CorpusSource>, message: &str) -> Result<()> {
    let responder = Responder::from_config(config, source);
    let response = responder.generate_response(message).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use async_trait::async_trait;
    use concierge_core::catalog::memory::{InMemoryCatalog, UnavailableCatalog};
    use concierge_core::compose::{fallback_message, APOLOGY};
    use concierge_core::corpus::Corpus;
    use concierge_core::models::{PropertyRecord, QueryClass};
    use std::time::Duration;

    struct BrokenSource;

    #[async_trait]
    impl CorpusSource for BrokenSource {
        async fn corpus(&self) -> Result<Arc<Corpus>> {
            anyhow::bail!("corpus store exploded")
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl CorpusSource for PanickingSource {
        async fn corpus(&self) -> Result<Arc<Corpus>> {
            panic!("catalog client bug")
        }
    }

    fn responder(aggregator: Aggregator) -> Responder {
        Responder::new(
            Arc::new(aggregator),
            ScoreWeights::default(),
            ComposeSettings::default(),
        )
    }

    fn gangnam_office() -> PropertyRecord {
        PropertyRecord {
            id: "12".to_string(),
            name: "강남 프리미엄 오피스".to_string(),
            description: "테헤란로 역세권 프라임 오피스".to_string(),
            address: "서울 강남구 테헤란로 152".to_string(),
            total_value: 12_000_000_000.0,
            property_type: "오피스".to_string(),
            region: "서울".to_string(),
        }
    }

    #[tokio::test]
    async fn test_min_investment_faq() {
        let r = responder(Aggregator::new(Duration::from_secs(1), 10));
        let resp = r.generate_response("최소 투자 금액은 얼마인가요?").await;
        assert!(resp.text.starts_with("최소 투자 금액은 1조각"));
        assert_eq!(resp.source_title.as_deref(), Some("최소 투자 금액은 얼마인가요?"));
        assert_eq!(resp.source_url.as_deref(), Some("/faq"));
    }

    #[tokio::test]
    async fn test_property_match_uses_template() {
        let catalog = Arc::new(InMemoryCatalog::with_records(vec![gangnam_office()], Vec::new()));
        let r = responder(Aggregator::new(Duration::from_secs(1), 10).with_properties(catalog));
        let resp = r.generate_response("강남 오피스").await;
        assert!(resp.text.starts_with("'강남 프리미엄 오피스' 매물 정보입니다."));
        assert!(resp.text.contains("테헤란로 역세권 프라임 오피스"));
        assert_eq!(resp.source_url.as_deref(), Some("/properties/12"));
    }

    #[tokio::test]
    async fn test_no_match_falls_back_to_greeting() {
        let r = responder(Aggregator::new(Duration::from_secs(1), 10));
        let resp = r.generate_response("xyzzy unrelated nonsense").await;
        assert_eq!(resp.text, fallback_message(QueryClass::Unknown));
        assert!(resp.source_url.is_none());
        assert!(resp.source_title.is_none());
    }

    #[tokio::test]
    async fn test_catalogs_down_still_answers_from_static() {
        let down = Arc::new(UnavailableCatalog::new("connection refused"));
        let r = responder(
            Aggregator::new(Duration::from_secs(1), 10)
                .with_properties(down.clone())
                .with_articles(down),
        );
        let resp = r.generate_response("블록체인 프로토콜").await;
        assert_eq!(resp.source_url.as_deref(), Some("/technology"));
        assert_ne!(resp.text, APOLOGY);
    }

    #[tokio::test]
    async fn test_source_error_becomes_apology() {
        let r = Responder::new(
            Arc::new(BrokenSource),
            ScoreWeights::default(),
            ComposeSettings::default(),
        );
        let resp = r.generate_response("최소 투자 금액").await;
        assert_eq!(resp.text, APOLOGY);
        assert!(resp.source_url.is_none());
        assert!(resp.source_title.is_none());
    }

    #[tokio::test]
    async fn test_panic_becomes_apology() {
        let r = Responder::new(
            Arc::new(PanickingSource),
            ScoreWeights::default(),
            ComposeSettings::default(),
        );
        let resp = r.generate_response("anything").await;
        assert_eq!(resp.text, APOLOGY);
    }

    #[tokio::test]
    async fn test_idempotent_text_and_source() {
        let r = responder(Aggregator::new(Duration::from_secs(1), 10));
        let a = r.generate_response("수수료는 얼마인가요?").await;
        let b = r.generate_response("수수료는 얼마인가요?").await;
        assert_eq!(a.text, b.text);
        assert_eq!(a.source_url, b.source_url);
        assert_eq!(a.source_title, b.source_title);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_response_ids_strictly_increase() {
        let ids: Vec<i64> = (0..1000).map(|_| next_response_id()).collect();
        assert!(ids.windows(2).all(|w| w[1] > w[0]));
    }

    #[tokio::test]
    async fn test_search_truncates() {
        let r = responder(Aggregator::new(Duration::from_secs(1), 10));
        let all = r.search("투자", false, 100).await.unwrap();
        assert!(all.len() > 2);
        let two = r.search("투자", true, 2).await.unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].item.id, all[0].item.id);
        assert!(two[0].explain.is_some());
    }
}
