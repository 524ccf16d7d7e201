// =============================================================================
// Market data fetchers — ticker snapshot and hourly candles, memoised
// =============================================================================
//
// `MarketFetcher` sits between the HTTP layer and the exchange. It owns one
// cache per fetch shape and talks to the exchange only through the
// `ExchangeApi` trait, so tests can substitute an in-process stub.
// =============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::FetchError;
use crate::market_data::cache::{CachePolicy, TtlCache};
use crate::market_data::candles::{parse_klines, Candle, CANDLE_INTERVAL};
use crate::market_data::ticker::{parse_ticker_table, TickerSnapshot};

/// Raw access to the two public endpoints the dashboard needs. Implementations
/// return the decoded JSON body of a successful response.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// GET /api/v3/ticker/24hr (all symbols).
    async fn ticker_24hr(&self) -> Result<Value, FetchError>;

    /// GET /api/v3/klines for one symbol and interval.
    async fn klines(&self, symbol: &str, interval: &str) -> Result<Value, FetchError>;
}

/// Entry counts for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub policy: String,
    pub ticker_entries: usize,
    pub candle_entries: usize,
}

pub struct MarketFetcher {
    api: Arc<dyn ExchangeApi>,
    prices: TtlCache<(), Arc<[TickerSnapshot]>>,
    candles: TtlCache<String, Arc<[Candle]>>,
}

impl MarketFetcher {
    pub fn new(api: Arc<dyn ExchangeApi>, policy: CachePolicy) -> Self {
        Self {
            api,
            prices: TtlCache::new(policy),
            candles: TtlCache::new(policy),
        }
    }

    /// All-symbol 24h statistics, one row per symbol, in exchange order.
    #[instrument(skip(self), name = "fetcher::get_prices")]
    pub async fn get_prices(&self) -> Result<Arc<[TickerSnapshot]>, FetchError> {
        if let Some(rows) = self.prices.get(&()) {
            debug!(rows = rows.len(), "ticker snapshot served from cache");
            return Ok(rows);
        }

        let body = self.api.ticker_24hr().await?;
        let rows: Arc<[TickerSnapshot]> = parse_ticker_table(&body)?.into();

        info!(rows = rows.len(), "ticker snapshot fetched");
        self.prices.insert((), rows.clone());
        Ok(rows)
    }

    /// Hourly candles for `symbol`, ascending as returned by the exchange.
    /// The symbol is forwarded as-is; unknown symbols fail upstream.
    #[instrument(skip(self), name = "fetcher::get_candles")]
    pub async fn get_candles(&self, symbol: &str) -> Result<Arc<[Candle]>, FetchError> {
        if let Some(candles) = self.candles.get(symbol) {
            debug!(symbol, count = candles.len(), "candles served from cache");
            return Ok(candles);
        }

        let body = self.api.klines(symbol, CANDLE_INTERVAL).await?;
        let candles: Arc<[Candle]> = parse_klines(&body)?.into();

        info!(symbol, count = candles.len(), interval = CANDLE_INTERVAL, "candles fetched");
        self.candles.insert(symbol.to_string(), candles.clone());
        Ok(candles)
    }

    /// Drop every cached snapshot and candle series.
    pub fn invalidate_all(&self) -> usize {
        let n = self.prices.clear() + self.candles.clear();
        info!(entries = n, "fetch caches cleared");
        n
    }

    /// Drop the cached candle series for one symbol. Returns whether an
    /// entry was present.
    pub fn invalidate_candles(&self, symbol: &str) -> bool {
        let removed = self.candles.invalidate(symbol);
        debug!(symbol, removed, "candle cache entry invalidated");
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        let policy = match self.prices.policy() {
            CachePolicy::Ttl(ttl) => format!("ttl:{}s", ttl.as_secs()),
            CachePolicy::Manual => "manual".to_string(),
        };
        CacheStats {
            policy,
            ticker_entries: self.prices.len(),
            candle_entries: self.candles.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{kline_rows, ticker_json, StubExchange};
    use serde_json::json;
    use std::time::Duration;

    fn fetcher(stub: &Arc<StubExchange>, policy: CachePolicy) -> MarketFetcher {
        MarketFetcher::new(stub.clone(), policy)
    }

    #[tokio::test]
    async fn prices_are_memoised() {
        let stub = Arc::new(StubExchange::new(json!([
            ticker_json("BTCUSDT", 1.0),
            ticker_json("ETHUSDT", 2.0)
        ])));
        let f = fetcher(&stub, CachePolicy::Manual);

        let first = f.get_prices().await.unwrap();
        let second = f.get_prices().await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(stub.ticker_calls(), 1);
    }

    #[tokio::test]
    async fn candles_memoised_per_symbol() {
        let stub = Arc::new(
            StubExchange::new(json!([ticker_json("BTCUSDT", 1.0)]))
                .with_klines("BTCUSDT", kline_rows(10))
                .with_klines("ETHUSDT", kline_rows(4)),
        );
        let f = fetcher(&stub, CachePolicy::Ttl(Duration::from_secs(3600)));

        let a = f.get_candles("BTCUSDT").await.unwrap();
        let b = f.get_candles("BTCUSDT").await.unwrap();
        let c = f.get_candles("ETHUSDT").await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert_eq!(c.len(), 4);
        assert_eq!(stub.kline_calls(), 2);
        assert_eq!(stub.last_interval().as_deref(), Some("1h"));
    }

    #[tokio::test]
    async fn expired_cache_refetches() {
        let stub = Arc::new(StubExchange::new(json!([ticker_json("BTCUSDT", 1.0)])));
        let f = fetcher(&stub, CachePolicy::Ttl(Duration::ZERO));

        f.get_prices().await.unwrap();
        f.get_prices().await.unwrap();
        assert_eq!(stub.ticker_calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_all_forces_refetch() {
        let stub = Arc::new(
            StubExchange::new(json!([ticker_json("BTCUSDT", 1.0)]))
                .with_klines("BTCUSDT", kline_rows(3)),
        );
        let f = fetcher(&stub, CachePolicy::Manual);

        f.get_prices().await.unwrap();
        f.get_candles("BTCUSDT").await.unwrap();
        assert_eq!(f.invalidate_all(), 2);

        f.get_prices().await.unwrap();
        f.get_candles("BTCUSDT").await.unwrap();
        assert_eq!(stub.ticker_calls(), 2);
        assert_eq!(stub.kline_calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_candles_is_per_symbol() {
        let stub = Arc::new(
            StubExchange::new(json!([ticker_json("BTCUSDT", 1.0)]))
                .with_klines("BTCUSDT", kline_rows(3))
                .with_klines("ETHUSDT", kline_rows(3)),
        );
        let f = fetcher(&stub, CachePolicy::Manual);

        f.get_candles("BTCUSDT").await.unwrap();
        f.get_candles("ETHUSDT").await.unwrap();
        assert!(f.invalidate_candles("BTCUSDT"));
        assert!(!f.invalidate_candles("BTCUSDT"));

        f.get_candles("BTCUSDT").await.unwrap();
        f.get_candles("ETHUSDT").await.unwrap();
        assert_eq!(stub.kline_calls(), 3);
    }

    #[tokio::test]
    async fn every_listed_symbol_has_ascending_candles() {
        let stub = Arc::new(
            StubExchange::new(json!([
                ticker_json("BTCUSDT", 1.0),
                ticker_json("ETHUSDT", 2.0)
            ]))
            .with_klines("BTCUSDT", kline_rows(30))
            .with_klines("ETHUSDT", kline_rows(200)),
        );
        let f = fetcher(&stub, CachePolicy::Manual);

        for row in f.get_prices().await.unwrap().iter() {
            let candles = f.get_candles(&row.symbol).await.unwrap();
            assert!(!candles.is_empty());
            assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        }
    }

    #[tokio::test]
    async fn unknown_symbol_surfaces_upstream_error() {
        let stub = Arc::new(StubExchange::new(json!([ticker_json("BTCUSDT", 1.0)])));
        let f = fetcher(&stub, CachePolicy::Manual);

        let err = f.get_candles("NOPEUSDT").await.unwrap_err();
        assert!(matches!(err, FetchError::Upstream { status: 400, code: Some(-1121), .. }));
        assert_eq!(f.cache_stats().candle_entries, 0);
    }

    #[tokio::test]
    async fn malformed_bodies_are_errors_not_empty_tables() {
        let stub = Arc::new(
            StubExchange::new(json!([])).with_klines("BTCUSDT", json!([])),
        );
        let f = fetcher(&stub, CachePolicy::Manual);

        assert!(matches!(f.get_prices().await, Err(FetchError::Malformed(_))));
        assert!(matches!(f.get_candles("BTCUSDT").await, Err(FetchError::Malformed(_))));
        let stats = f.cache_stats();
        assert_eq!(stats.ticker_entries, 0);
        assert_eq!(stats.candle_entries, 0);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let stub = Arc::new(StubExchange::new(json!([ticker_json("BTCUSDT", 1.0)])));
        stub.fail_next_ticker(FetchError::Timeout {
            endpoint: "/api/v3/ticker/24hr".into(),
        });
        let f = fetcher(&stub, CachePolicy::Manual);

        assert!(matches!(f.get_prices().await, Err(FetchError::Timeout { .. })));
        assert_eq!(f.get_prices().await.unwrap().len(), 1);
        assert_eq!(stub.ticker_calls(), 2);
    }

    #[test]
    fn stats_describe_policy() {
        let stub = Arc::new(StubExchange::new(json!([])));
        assert_eq!(fetcher(&stub, CachePolicy::Manual).cache_stats().policy, "manual");
        assert_eq!(
            fetcher(&stub, CachePolicy::from_ttl_secs(60)).cache_stats().policy,
            "ttl:60s"
        );
    }
}
