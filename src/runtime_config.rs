// =============================================================================
// Dashboard Configuration — JSON file plus environment overrides
// =============================================================================
//
// All fields carry `#[serde(default)]` so a missing or partial config file
// never prevents startup. Chart interval, window size and table length are
// fixed constants and deliberately not configurable.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::binance::DEFAULT_BASE_URL;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    60
}

// =============================================================================
// DashboardConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Exchange REST root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout for exchange calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Lifetime of cached snapshots and candle series. 0 keeps entries until
    /// the cache is cleared through the API.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            cache_ttl_secs = config.cache_ttl_secs,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Apply `MOVERS_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`. Unparseable numbers are ignored with a
    /// warning rather than aborting startup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(addr) = get("MOVERS_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(url) = get("MOVERS_BASE_URL") {
            self.base_url = url;
        }
        if let Some(raw) = get("MOVERS_REQUEST_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => warn!(value = %raw, "ignoring invalid MOVERS_REQUEST_TIMEOUT_SECS"),
            }
        }
        if let Some(raw) = get("MOVERS_CACHE_TTL_SECS") {
            match raw.parse() {
                Ok(secs) => self.cache_ttl_secs = secs,
                Err(_) => warn!(value = %raw, "ignoring invalid MOVERS_CACHE_TTL_SECS"),
            }
        }
    }
}
