//! Biosimilar news monitor — binary entrypoint.
//! Loads the publisher list, builds the pipeline and serves it over Axum.

use anyhow::Context;
use biosimilar_news_monitor::{
    api::{self, AppState},
    ingest::config::load_sources_default,
    metrics::Metrics,
    relevance::dev_logging_enabled,
    NewsPipeline,
};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - NEWS_DEV_LOG=1
fn enable_dev_tracing() {
    if !dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pipeline=info,ingest=info,relevance=debug,warn"));

    // Shuttle may already have installed a subscriber; keep theirs in that case.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = load_sources_default().context("loading publisher sources")?;
    let pipeline = NewsPipeline::from_config(&cfg)?;
    tracing::info!(sources = ?pipeline.source_names(), "publisher sources loaded");

    let metrics = Metrics::init(cfg.fetch_timeout_secs)?;

    let mut state = AppState::new(pipeline);
    state.default_lookback_days = cfg.default_lookback_days;

    let router = api::router(state).merge(metrics.router());
    Ok(router.into())
}
