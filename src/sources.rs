use anyhow::Result;
use concierge_core::corpus::CorpusSummary;
use std::sync::Arc;

use crate::aggregate::CorpusSource;

pub async fn corpus_summary(source: Arc<dyn CorpusSource>) -> Result<CorpusSummary> {
    Ok(source.corpus().await?.summary())
}

pub async fn run_corpus(source: Arc<dyn CorpusSource>) -> Result<()> {
    let summary = corpus_summary(source).await?;

    println!("{:<12} COUNT", "TYPE");
    for count in &summary.counts {
        println!("{:<12} {}", count.kind.as_str(), count.count);
    }
    println!("{:<12} {}", "total", summary.total);
    println!();

    println!("{:<12} {:<16} {:<8} ITEMS", "SOURCE", "STATUS", "HEALTHY");
    for status in &summary.sources {
        let label = match (status.configured, &status.error) {
            (false, _) => "NOT CONFIGURED",
            (true, Some(_)) => "UNAVAILABLE",
            (true, None) => "OK",
        };
        println!(
            "{:<12} {:<16} {:<8} {}",
            status.name, label, status.healthy, status.items
        );
        if let Some(ref err) = status.error {
            println!("    error: {}", err);
        }
    }
    println!();

    println!("degraded:    {}", summary.degraded);
    println!("built_at:    {}", summary.built_at);
    println!("fingerprint: {}", summary.fingerprint);

    Ok(())
}
