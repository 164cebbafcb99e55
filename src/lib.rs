//! # Concierge
//!
//! A retrieval-based support chatbot for a fractional real-estate investment
//! platform. Every answer is assembled from a searchable corpus of curated
//! content; nothing is generated.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │  Catalogs   │──▶│ Aggregator  │──▶│ CorpusCache │
//! │ props/news  │   │ +static/FAQ │   │  (ArcSwap)  │
//! └─────────────┘   └─────────────┘   └──────┬──────┘
//!                                            │
//!                                            ▼
//!                                     ┌─────────────┐
//!                                     │  Responder  │
//!                                     │ classify +  │
//!                                     │ rank+compose│
//!                                     └──────┬──────┘
//!                      ┌─────────────────────┤
//!                      ▼                     ▼
//!                 ┌──────────┐         ┌──────────┐
//!                 │   CLI    │         │   HTTP   │
//!                 └──────────┘         └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! concierge classify "강남 오피스"
//! concierge ask "최소 투자 금액은 얼마인가요?"
//! concierge search "배당" --explain
//! concierge corpus
//! concierge serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`catalog_http`] | Property and article catalog clients |
//! | [`aggregate`] | Timed, degrading corpus aggregation |
//! | [`cache`] | Refreshable corpus snapshot |
//! | [`respond`] | `GenerateResponse` and the failure boundary |
//! | [`search`] | Ranked listing for the CLI |
//! | [`sources`] | Corpus and catalog status report |
//! | [`server`] | HTTP chat server |
//! | [`logging`] | Tracing subscriber setup |
//!
//! Pure logic (classifier, ranker, composer, corpus assembly) lives in the
//! `concierge-core` crate, which has no I/O and no async runtime.

pub mod aggregate;
pub mod cache;
pub mod catalog_http;
pub mod config;
pub mod logging;
pub mod respond;
pub mod search;
pub mod server;
pub mod sources;
