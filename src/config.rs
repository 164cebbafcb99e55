//! TOML configuration parsing and validation.
//!
//! ```toml
//! [catalog]
//! properties_url = "http://127.0.0.1:8080/api/properties"
//! articles_url = "http://127.0.0.1:8080/api/articles"
//! article_limit = 50
//! timeout_secs = 5
//!
//! [ranking]
//! title_phrase_bonus = 10
//! title_term = 5
//! body_term = 3
//! keyword_term = 4
//! max_results = 10
//!
//! [compose]
//! excerpt_chars = 150
//!
//! [cache]
//! refresh_secs = 300
//!
//! [server]
//! bind = "127.0.0.1:7340"
//! ```
//!
//! Every section is optional; missing keys take the defaults shown.

use anyhow::{Context, Result};
use concierge_core::compose::ComposeSettings;
use concierge_core::rank::ScoreWeights;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// `ListProperties` endpoint. Unset means the source is skipped.
    #[serde(default)]
    pub properties_url: Option<String>,
    /// `ListArticles` endpoint. Unset means the source is skipped.
    #[serde(default)]
    pub articles_url: Option<String>,
    #[serde(default = "default_article_limit")]
    pub article_limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            properties_url: None,
            articles_url: None,
            article_limit: default_article_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_article_limit() -> usize {
    50
}
fn default_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    #[serde(default = "default_title_phrase_bonus")]
    pub title_phrase_bonus: u32,
    #[serde(default = "default_title_term")]
    pub title_term: u32,
    #[serde(default = "default_body_term")]
    pub body_term: u32,
    #[serde(default = "default_keyword_term")]
    pub keyword_term: u32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            title_phrase_bonus: default_title_phrase_bonus(),
            title_term: default_title_term(),
            body_term: default_body_term(),
            keyword_term: default_keyword_term(),
            max_results: default_max_results(),
        }
    }
}

impl RankingConfig {
    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            title_phrase: self.title_phrase_bonus,
            title_term: self.title_term,
            body_term: self.body_term,
            keyword_term: self.keyword_term,
        }
    }
}

fn default_title_phrase_bonus() -> u32 {
    ScoreWeights::default().title_phrase
}
fn default_title_term() -> u32 {
    ScoreWeights::default().title_term
}
fn default_body_term() -> u32 {
    ScoreWeights::default().body_term
}
fn default_keyword_term() -> u32 {
    ScoreWeights::default().keyword_term
}
fn default_max_results() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ComposeConfig {
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

impl ComposeConfig {
    pub fn settings(&self) -> ComposeSettings {
        ComposeSettings {
            excerpt_chars: self.excerpt_chars,
        }
    }
}

fn default_excerpt_chars() -> usize {
    ComposeSettings::default().excerpt_chars
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Snapshot refresh period for the server. `0` disables the cache.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.refresh_secs > 0
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

fn default_refresh_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// All defaults, no catalogs. Used when no config file is given.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Upper bound for each `[ranking]` weight.
pub const MAX_WEIGHT: u32 = 1_000;

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.catalog.timeout_secs == 0 {
        anyhow::bail!("catalog.timeout_secs must be > 0");
    }

    if config.catalog.article_limit == 0 {
        anyhow::bail!("catalog.article_limit must be >= 1");
    }

    for (key, url) in [
        ("catalog.properties_url", &config.catalog.properties_url),
        ("catalog.articles_url", &config.catalog.articles_url),
    ] {
        if let Some(url) = url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", key, url);
            }
        }
    }

    for (key, weight) in [
        ("ranking.title_phrase_bonus", config.ranking.title_phrase_bonus),
        ("ranking.title_term", config.ranking.title_term),
        ("ranking.body_term", config.ranking.body_term),
        ("ranking.keyword_term", config.ranking.keyword_term),
    ] {
        if weight > MAX_WEIGHT {
            anyhow::bail!("{} must be <= {}, got {}", key, MAX_WEIGHT, weight);
        }
    }

    if config.ranking.max_results == 0 {
        anyhow::bail!("ranking.max_results must be >= 1");
    }

    if config.compose.excerpt_chars == 0 {
        anyhow::bail!("compose.excerpt_chars must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert!(cfg.catalog.properties_url.is_none());
        assert_eq!(cfg.catalog.article_limit, 50);
        assert_eq!(cfg.catalog.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.ranking.weights(), ScoreWeights::default());
        assert_eq!(cfg.compose.excerpt_chars, 150);
        assert!(cfg.cache.is_enabled());
        assert_eq!(cfg.server.bind, "127.0.0.1:7340");
    }

    #[test]
    fn test_full_config() {
        let cfg = parse_config(
            r#"
[catalog]
properties_url = "http://localhost:8080/api/properties"
articles_url = "https://cms.example.com/articles"
article_limit = 20
timeout_secs = 2

[ranking]
title_phrase_bonus = 20
max_results = 3

[compose]
excerpt_chars = 80

[cache]
refresh_secs = 0
"#,
        )
        .unwrap();
        assert_eq!(cfg.catalog.article_limit, 20);
        assert_eq!(cfg.ranking.weights().title_phrase, 20);
        assert_eq!(cfg.ranking.weights().body_term, 3);
        assert_eq!(cfg.ranking.max_results, 3);
        assert_eq!(cfg.compose.settings().excerpt_chars, 80);
        assert!(!cfg.cache.is_enabled());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = parse_config("[catalog]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = parse_config("[catalog]\nproperties_url = \"ftp://x\"\n").unwrap_err();
        assert!(err.to_string().contains("properties_url"));
    }

    #[test]
    fn test_rejects_oversized_weight() {
        let err = parse_config("[ranking]\ntitle_phrase_bonus = 4294967295\ntitle_term = 4294967295\n")
            .unwrap_err();
        assert!(err.to_string().contains("ranking.title_phrase_bonus"));

        let err = parse_config("[ranking]\nkeyword_term = 1001\n").unwrap_err();
        assert!(err.to_string().contains("ranking.keyword_term"));

        let cfg = parse_config("[ranking]\nbody_term = 1000\n").unwrap();
        assert_eq!(cfg.ranking.weights().body_term, MAX_WEIGHT);
    }

    #[test]
    fn test_rejects_zero_excerpt() {
        assert!(parse_config("[compose]\nexcerpt_chars = 0\n").is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/concierge.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
