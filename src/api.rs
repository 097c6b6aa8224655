// src/api.rs
//! Thin HTTP surface over the pipeline. No logic of its own beyond reading `days`.

use std::sync::Arc;

use serde::Deserialize;
use shuttle_axum::axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ingest::config::DEFAULT_LOOKBACK_DAYS;
use crate::pipeline::NewsPipeline;
use crate::taxonomy::{category_by_id, SOP_CATEGORIES};

pub const NEWS_CACHE_CONTROL: &str = "s-maxage=300, stale-while-revalidate=600";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NewsPipeline>,
    /// Used when `days` is missing or not a number.
    pub default_lookback_days: i64,
}

impl AppState {
    pub fn new(pipeline: NewsPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(news))
        .route("/api/categories", get(categories))
        .route("/api/categories/{id}", get(category))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct NewsQuery {
    days: Option<String>,
}

/// Leading integer of `raw` ("30", " 90d", "-3"); `None` when there is none.
pub fn parse_days(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    // Saturate absurd values; the pipeline clamps anyway.
    digits[..end]
        .parse::<i64>()
        .ok()
        .or_else(|| (end > 0).then_some(i64::MAX))
        .map(|n| n.saturating_mul(sign))
}

async fn news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> impl IntoResponse {
    let lookback = q
        .days
        .as_deref()
        .and_then(parse_days)
        .unwrap_or(state.default_lookback_days);
    let result = state.pipeline.fetch_and_classify(lookback).await;
    ([(header::CACHE_CONTROL, NEWS_CACHE_CONTROL)], Json(result))
}

async fn categories() -> impl IntoResponse {
    Json(SOP_CATEGORIES)
}

async fn category(Path(id): Path<String>) -> Result<impl IntoResponse, StatusCode> {
    category_by_id(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}
