//! HTTP chat server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | `{ "message": "..." }` → ChatResponse |
//! | `GET`  | `/search?q=...&explain=true` | Ranked matches with optional score breakdown |
//! | `GET`  | `/corpus` | Corpus summary and catalog status |
//! | `POST` | `/corpus/refresh` | Re-aggregate now (cache mode only) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "message must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `cache_disabled` (409), `internal` (500).
//! `/chat` never reports a pipeline failure as an error status; it answers
//! with the apology text instead.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser chat widgets
//! can call the server directly.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use concierge_core::corpus::CorpusSummary;
use concierge_core::models::ChatResponse;
use concierge_core::rank::RankedResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::aggregate::{Aggregator, CorpusSource};
use crate::cache::CorpusCache;
use crate::config::Config;
use crate::respond::Responder;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    responder: Responder,
    source: Arc<dyn CorpusSource>,
    /// Present when `[cache].refresh_secs > 0`.
    cache: Option<Arc<CorpusCache>>,
    max_results: usize,
}

impl AppState {
    pub fn new(config: &Config, source: Arc<dyn CorpusSource>, cache: Option<Arc<CorpusCache>>) -> Self {
        Self {
            responder: Responder::from_config(config, source.clone()),
            source,
            cache,
            max_results: config.ranking.max_results,
        }
    }

    pub fn cache(&self) -> Option<&Arc<CorpusCache>> {
        self.cache.as_ref()
    }
}

/// Wire the corpus source the config asks for: a refreshed snapshot cache,
/// or a fresh aggregation per request when caching is off.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let aggregator = Aggregator::from_config(config)?;
    if config.cache.is_enabled() {
        let cache = Arc::new(CorpusCache::load(aggregator).await?);
        Ok(AppState::new(config, cache.clone(), Some(cache)))
    } else {
        Ok(AppState::new(config, Arc::new(aggregator), None))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handle_chat))
        .route("/search", get(handle_search))
        .route("/corpus", get(handle_corpus))
        .route("/corpus/refresh", post(handle_refresh))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = build_state(config).await?;

    let refresher = state
        .cache()
        .map(|cache| cache.spawn_refresh(config.cache.refresh_period()));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, cached = refresher.is_some(), "chat server listening");
    println!("Chat server listening on http://{}", config.server.bind);

    let served = axum::serve(listener, router(state)).await;
    if let Some(handle) = refresher {
        handle.abort();
    }
    served?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn cache_disabled() -> AppError {
    AppError {
        status: StatusCode::CONFLICT,
        code: "cache_disabled".to_string(),
        message: "corpus is aggregated per request; nothing to refresh".to_string(),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: format!("{:#}", err),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| bad_request(rejection.body_text()))?;
    if req.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }
    Ok(Json(state.responder.generate_response(&req.message).await))
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    #[serde(default)]
    explain: bool,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<RankedResult>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.q.trim().is_empty() {
        return Err(bad_request("q must not be empty"));
    }
    let limit = params.limit.unwrap_or(state.max_results);
    let results = state
        .responder
        .search(&params.q, params.explain, limit)
        .await
        .map_err(internal)?;
    Ok(Json(SearchResponse { results }))
}

// ============ GET /corpus, POST /corpus/refresh ============

async fn handle_corpus(State(state): State<AppState>) -> Result<Json<CorpusSummary>, AppError> {
    let corpus = state.source.corpus().await.map_err(internal)?;
    Ok(Json(corpus.summary()))
}

async fn handle_refresh(State(state): State<AppState>) -> Result<Json<CorpusSummary>, AppError> {
    let cache = state.cache.as_ref().ok_or_else(cache_disabled)?;
    let corpus = cache.refresh().await.map_err(internal)?;
    Ok(Json(corpus.summary()))
}
