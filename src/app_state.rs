// =============================================================================
// Central Application State
// =============================================================================
//
// Shared across axum handlers via `Arc<AppState>`. The fetcher owns the only
// mutable state (its caches, behind parking_lot locks); everything else is
// read-only after startup.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use crate::binance::RateLimitTracker;
use crate::market_data::{CachePolicy, ExchangeApi, MarketFetcher};
use crate::runtime_config::DashboardConfig;

pub struct AppState {
    pub config: DashboardConfig,
    pub fetcher: MarketFetcher,
    pub rate_limit: Arc<RateLimitTracker>,

    /// Instant when the server was started. Used for uptime calculations.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: DashboardConfig,
        api: Arc<dyn ExchangeApi>,
        rate_limit: Arc<RateLimitTracker>,
    ) -> Self {
        let policy = CachePolicy::from_ttl_secs(config.cache_ttl_secs);
        Self {
            config,
            fetcher: MarketFetcher::new(api, policy),
            rate_limit,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
