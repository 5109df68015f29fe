//! HTTP API for the card game frontend.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/health` | Health check |
//! | GET | `/api/cards` | Card catalog, shuffled unless `shuffle=false` |
//! | POST | `/api/submit` | Score and record a submission |
//! | GET | `/api/leaderboard` | Ranked completed sessions |
//! | GET | `/api/stats` | Aggregate statistics |

mod error;

pub use error::ApiError;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cards::{catalog, shuffle_cards};
use crate::config::{Config, LeaderboardConfig};
use crate::scoring::Combination;
use crate::store::ScoreStore;
use crate::submit::{submit_and_record, RetryPolicy};

pub const NICKNAME_HEADER: &str = "x-user-nickname";
pub const SUBMISSION_ID_HEADER: &str = "x-submission-id";

const MAX_SUBMISSION_ID_LEN: usize = 128;

pub struct AppContext {
    pub store: Arc<dyn ScoreStore>,
    pub retry: RetryPolicy,
    pub anonymous_nickname: String,
    pub leaderboard: LeaderboardConfig,
}

pub type AppState = Arc<AppContext>;

impl AppContext {
    pub fn new(config: &Config, store: Arc<dyn ScoreStore>) -> Self {
        Self {
            store,
            retry: RetryPolicy::from_config(&config.storage),
            anonymous_nickname: config.server.anonymous_nickname.clone(),
            leaderboard: config.leaderboard.clone(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(SUBMISSION_ID_HEADER)]);

    let api = Router::new()
        .route("/health", get(handle_health))
        .route("/cards", get(handle_cards))
        .route("/submit", post(handle_submit))
        .route("/leaderboard", get(handle_leaderboard))
        .route("/stats", get(handle_stats));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: &Config, store: Arc<dyn ScoreStore>) -> anyhow::Result<()> {
    let state = Arc::new(AppContext::new(config, store));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!(addr = %config.server.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

// ── Request types ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct CardsQuery {
    shuffle: Option<bool>,
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

// ── Handlers ────────────────────────────────────────────────────────

async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn handle_cards(
    query: Result<Query<CardsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let shuffled = params.shuffle.unwrap_or(true);

    let mut cards = catalog();
    if shuffled {
        shuffle_cards(&mut cards, &mut rand::rng());
    }

    Ok(Json(json!({
        "total": cards.len(),
        "shuffled": shuffled,
        "cards": cards,
    })))
}

async fn handle_submit(
    State(ctx): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Vec<Combination>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let nickname = nickname_from(&headers, &ctx.anonymous_nickname);
    let submission_id = submission_id_from(&headers)?;

    let result = submit_and_record(
        Arc::clone(&ctx.store),
        ctx.retry,
        &submission_id,
        &nickname,
        &submission,
    )
    .await?;

    let header_value = HeaderValue::from_str(&submission_id)
        .context("Submission id is not a valid header value")?;
    Ok((
        StatusCode::OK,
        [(SUBMISSION_ID_HEADER, header_value)],
        Json(result),
    ))
}

async fn handle_leaderboard(
    State(ctx): State<AppState>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = params
        .limit
        .unwrap_or(ctx.leaderboard.default_limit)
        .min(ctx.leaderboard.max_limit);
    let offset = params.offset.unwrap_or(0);

    let page = ctx.store.leaderboard(limit, offset)?;
    Ok(Json(json!({
        "success": true,
        "data": page.entries,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

async fn handle_stats(State(ctx): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = ctx.store.stats()?;
    Ok(Json(json!({
        "success": true,
        "data": stats,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

// ── Header helpers ──────────────────────────────────────────────────

fn nickname_from(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(NICKNAME_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Client-chosen id for idempotent retries, or a fresh one.
fn submission_id_from(headers: &HeaderMap) -> Result<String, ApiError> {
    let Some(value) = headers.get(SUBMISSION_ID_HEADER) else {
        return Ok(uuid::Uuid::new_v4().to_string());
    };
    let id = value
        .to_str()
        .map_err(|_| ApiError::BadRequest("x-submission-id must be ASCII".to_string()))?
        .trim();
    if id.is_empty() {
        return Ok(uuid::Uuid::new_v4().to_string());
    }
    if id.len() > MAX_SUBMISSION_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "x-submission-id must be at most {} characters",
            MAX_SUBMISSION_ID_LEN
        )));
    }
    Ok(id.to_string())
}
