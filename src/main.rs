//! # Concierge CLI (`concierge`)
//!
//! ## Usage
//!
//! ```bash
//! concierge --config ./config/concierge.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `concierge ask "<message>"` | Answer a message, print the ChatResponse JSON |
//! | `concierge classify "<query>"` | Print the query's topic class |
//! | `concierge search "<query>"` | List ranked corpus matches |
//! | `concierge corpus` | Aggregate and report corpus counts and catalog status |
//! | `concierge serve` | Start the HTTP chat server |
//!
//! Without `--config`, `./config/concierge.toml` is used if it exists;
//! otherwise all defaults apply and no catalogs are queried.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use concierge::aggregate::{Aggregator, CorpusSource};
use concierge::config::{self, Config};
use concierge::{logging, respond, search, server, sources};
use concierge_core::classify::classify;

const DEFAULT_CONFIG: &str = "./config/concierge.toml";

/// Concierge: a retrieval-based support chatbot for a fractional
/// real-estate investment platform.
#[derive(Parser)]
#[command(
    name = "concierge",
    about = "Concierge: retrieval-based support chatbot over platform content and catalogs",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults to `./config/concierge.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a chat message and print the response as JSON.
    Ask {
        message: String,
    },

    /// Print the topic class of a query. Needs no config.
    Classify {
        query: String,
    },

    /// List corpus items ranked against a query.
    Search {
        query: String,

        /// Show the per-item score breakdown.
        #[arg(long)]
        explain: bool,

        /// Maximum number of results (defaults to `[ranking].max_results`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Aggregate once and report per-type counts and catalog status.
    Corpus,

    /// Start the HTTP chat server on `[server].bind`.
    Serve,
}

fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_config(path),
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_config(Path::new(DEFAULT_CONFIG)),
        None => Ok(Config::minimal()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config_path = cli.config.clone();
    let load = || resolve_config(config_path.as_deref());

    match cli.command {
        // Needs no config.
        Commands::Classify { query } => {
            println!("{}", classify(&query));
        }
        Commands::Ask { message } => {
            let cfg = load()?;
            let source: Arc<dyn CorpusSource> = Arc::new(Aggregator::from_config(&cfg)?);
            respond::run_ask(&cfg, source, &message).await?;
        }
        Commands::Search {
            query,
            explain,
            limit,
        } => {
            let cfg = load()?;
            let source: Arc<dyn CorpusSource> = Arc::new(Aggregator::from_config(&cfg)?);
            search::run_search(&cfg, source, &query, explain, limit).await?;
        }
        Commands::Corpus => {
            let cfg = load()?;
            let source: Arc<dyn CorpusSource> = Arc::new(Aggregator::from_config(&cfg)?);
            sources::run_corpus(source).await?;
        }
        Commands::Serve => {
            let cfg = load()?;
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
