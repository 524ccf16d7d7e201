// =============================================================================
// Rate-Limit Tracker — monitors Binance request weight to avoid 429s
// =============================================================================
//
// Binance allows 1200 request weight per minute per IP. The ticker/24hr call
// without a symbol costs 80 weight and each klines call costs 2, so a cold
// dashboard is cheap but a cache cleared in a loop is not.
//
// The tracker reads the `X-MBX-USED-WEIGHT-1M` response header after every
// request and keeps an atomic counter that any thread may query lock-free.
// =============================================================================

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

use serde::Serialize;
use tracing::{debug, warn};

/// Per-minute request-weight budget enforced by the exchange.
const WEIGHT_BUDGET_1M: u32 = 1200;
/// Soft warning threshold.
const WEIGHT_WARN_THRESHOLD: u32 = 800;

/// Thread-safe tracker backed by atomic counters.
pub struct RateLimitTracker {
    used_weight_1m: AtomicU32,
    /// Epoch ms of the last header seen, 0 if none yet.
    updated_at_ms: AtomicI64,
}

/// Serialisable view of the tracker for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitSnapshot {
    pub used_weight_1m: u32,
    pub budget_1m: u32,
    pub remaining_1m: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_ms: Option<i64>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self {
            used_weight_1m: AtomicU32::new(0),
            updated_at_ms: AtomicI64::new(0),
        }
    }

    /// Update the weight counter from a Binance response's headers.
    pub fn update_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        let Some(w) = headers
            .get("X-MBX-USED-WEIGHT-1M")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
        else {
            return;
        };

        let prev = self.used_weight_1m.swap(w, Ordering::Relaxed);
        self.updated_at_ms
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);

        if w >= WEIGHT_WARN_THRESHOLD && prev < WEIGHT_WARN_THRESHOLD {
            warn!(
                used_weight = w,
                budget = WEIGHT_BUDGET_1M,
                "request weight crossed warning threshold"
            );
        }
        debug!(used_weight_1m = w, "request weight updated from header");
    }

    pub fn used_weight(&self) -> u32 {
        self.used_weight_1m.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        let used = self.used_weight();
        let updated = self.updated_at_ms.load(Ordering::Relaxed);
        RateLimitSnapshot {
            used_weight_1m: used,
            budget_1m: WEIGHT_BUDGET_1M,
            remaining_1m: WEIGHT_BUDGET_1M.saturating_sub(used),
            updated_at_ms: (updated > 0).then_some(updated),
        }
    }
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("used_weight_1m", &self.used_weight())
            .finish()
    }
}
