// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// JSON endpoints live under `/api/v1/`; `/` serves the dashboard page. There is
// no authentication: every endpoint is read-only apart from the cache clear.
//
// CORS is configured permissively so the JSON endpoints can back other
// front-ends.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::api::error::ApiError;
use crate::api::page::index_page;
use crate::app_state::AppState;
use crate::binance::RateLimitSnapshot;
use crate::chart::{plot_candles, Figure};
use crate::market_data::candles::CANDLE_INTERVAL;
use crate::market_data::fetcher::CacheStats;
use crate::market_data::ticker::{sort_rows, SortKey, SortOrder};
use crate::market_data::{Candle, TickerSnapshot};
use crate::runtime_config::DashboardConfig;
use crate::view::{build_dashboard, Dashboard, TABLE_ROWS};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router with CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_page))
        .route("/api/v1/health", get(health))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/prices", get(prices))
        .route("/api/v1/candles/:symbol", get(candles))
        .route("/api/v1/chart/:symbol", get(chart))
        .route("/api/v1/cache/clear", post(clear_cache))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: i64,
    config: DashboardConfig,
    cache: CacheStats,
    rate_limit: RateLimitSnapshot,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
        config: state.config.clone(),
        cache: state.fetcher.cache_stats(),
        rate_limit: state.rate_limit.snapshot(),
    })
}

// =============================================================================
// Dashboard (one full render cycle)
// =============================================================================

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    symbol: Option<String>,
    limit: Option<usize>,
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<Dashboard>, ApiError> {
    let Query(query) = query?;
    let limit = positive_limit(query.limit)?.unwrap_or(TABLE_ROWS);
    let dash = build_dashboard(&state.fetcher, query.symbol.as_deref(), limit).await?;
    Ok(Json(dash))
}

// =============================================================================
// Snapshot table
// =============================================================================

#[derive(Debug, Deserialize)]
struct PricesQuery {
    #[serde(default)]
    sort: SortKey,
    #[serde(default)]
    order: SortOrder,
    limit: Option<usize>,
}

async fn prices(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PricesQuery>, QueryRejection>,
) -> Result<Json<Vec<TickerSnapshot>>, ApiError> {
    let Query(query) = query?;
    let limit = positive_limit(query.limit)?;

    let mut rows = state.fetcher.get_prices().await?.to_vec();
    sort_rows(&mut rows, query.sort, query.order);
    if let Some(n) = limit {
        rows.truncate(n);
    }

    debug!(rows = rows.len(), sort = ?query.sort, order = ?query.order, "prices served");
    Ok(Json(rows))
}

// =============================================================================
// Candles & chart for one symbol
// =============================================================================

#[derive(Serialize)]
struct CandleSeries {
    symbol: String,
    interval: &'static str,
    candles: Vec<Candle>,
}

async fn candles(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<CandleSeries>, ApiError> {
    let candles = state.fetcher.get_candles(&symbol).await?;
    Ok(Json(CandleSeries {
        symbol,
        interval: CANDLE_INTERVAL,
        candles: candles.to_vec(),
    }))
}

async fn chart(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<Figure>, ApiError> {
    let candles = state.fetcher.get_candles(&symbol).await?;
    let figure = plot_candles(&candles)?;
    debug!(
        symbol = %symbol,
        panels = figure.panel_count(),
        points = figure.candlestick_points(),
        "chart served"
    );
    Ok(Json(figure))
}

// =============================================================================
// Cache control
// =============================================================================

#[derive(Debug, Deserialize)]
struct ClearQuery {
    /// Only drop this symbol's candle series; the snapshot stays cached.
    symbol: Option<String>,
}

#[derive(Serialize)]
struct ClearResponse {
    cleared: usize,
}

async fn clear_cache(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ClearQuery>, QueryRejection>,
) -> Result<Json<ClearResponse>, ApiError> {
    let Query(query) = query?;
    let cleared = match query.symbol.as_deref() {
        Some(symbol) => usize::from(state.fetcher.invalidate_candles(symbol)),
        None => state.fetcher.invalidate_all(),
    };
    info!(cleared, symbol = ?query.symbol, "cache cleared via API");
    Ok(Json(ClearResponse { cleared }))
}

fn positive_limit(limit: Option<usize>) -> Result<Option<usize>, ApiError> {
    match limit {
        Some(0) => Err(ApiError::BadRequest("limit must be at least 1".into())),
        other => Ok(other),
    }
}

// =============================================================================
// Tests
// =============================================================================
