// =============================================================================
// Binance 24h Movers — Main Entry Point
// =============================================================================
//
// Serves a dashboard of the exchange's largest 24h price changes with an
// hourly candlestick + volume chart for the selected symbol. Market data is
// fetched on demand and memoised; nothing is persisted.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod binance;
mod chart;
mod error;
mod market_data;
mod runtime_config;
mod view;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::binance::{BinanceClient, RateLimitTracker};
use crate::runtime_config::DashboardConfig;

const CONFIG_PATH: &str = "dashboard_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Binance 24h Movers — starting up");

    // ── 2. Configuration ─────────────────────────────────────────────────
    let mut config = DashboardConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });
    config.apply_env();

    info!(
        base_url = %config.base_url,
        request_timeout_secs = config.request_timeout_secs,
        cache_ttl_secs = config.cache_ttl_secs,
        "Configuration resolved"
    );

    // ── 3. Exchange client & shared state ────────────────────────────────
    let rate_limit = Arc::new(RateLimitTracker::new());
    let client = BinanceClient::new(
        config.base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
        rate_limit.clone(),
    )?;

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, Arc::new(client), rate_limit));

    // ── 4. HTTP server ───────────────────────────────────────────────────
    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind dashboard server to {bind_addr}"))?;

    info!(addr = %bind_addr, "Dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("dashboard server failed")?;

    info!("Binance 24h Movers shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        // Without a signal handler, run until the process is killed.
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
