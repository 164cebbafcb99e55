use anyhow::Result;
use concierge_core::compose::excerpt;
use concierge_core::rank::{RankedResult, ScoreBreakdown};
use std::sync::Arc;

use crate::aggregate::CorpusSource;
use crate::config::Config;
use crate::respond::Responder;

/// Ranked items for `query`, truncated to `limit` or `[ranking].max_results`.
pub async fn search_items(
    config: &Config,
    source: Arc<dyn CorpusSource>,
    query: &str,
    explain: bool,
    limit: Option<usize>,
) -> Result<Vec<RankedResult>> {
    let limit = limit.unwrap_or(config.ranking.max_results);
    Responder::from_config(config, source)
        .search(query, explain, limit)
        .await
}

pub async fn run_search(
    config: &Config,
    source: Arc<dyn CorpusSource>,
    query: &str,
    explain: bool,
    limit: Option<usize>,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let results = search_items(config, source, query, explain, limit).await?;
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let item = &result.item;
        println!("{}. [{}] {} / {}", i + 1, result.score, item.kind, item.title);
        println!("    id: {}", item.id);
        if !item.url.is_empty() {
            println!("    url: {}", item.url);
        }
        println!(
            "    excerpt: \"{}\"",
            excerpt(&item.body, 80).replace('\n', " ").trim()
        );
        if let Some(ref breakdown) = result.explain {
            println!("    explain: {}", describe(breakdown));
        }
        println!();
    }

    Ok(())
}

fn describe(b: &ScoreBreakdown) -> String {
    format!(
        "phrase={} title_hits={} body_hits={} keyword_hits={}",
        if b.title_phrase { "yes" } else { "no" },
        b.title_hits,
        b.body_hits,
        b.keyword_hits
    )
}
