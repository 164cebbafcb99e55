//! # Concierge Core
//!
//! Shared, I/O-free logic for Concierge: content model, query classifier,
//! lexical ranker, response formatting, the built-in corpus, and the
//! catalog traits through which external records enter the pipeline.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. The
//! application crate supplies catalog implementations, timeouts, caching,
//! and the transport surfaces.

pub mod catalog;
pub mod classify;
pub mod compose;
pub mod corpus;
pub mod models;
pub mod rank;
