// Shared fixtures for unit tests: Binance-shaped payloads and an in-process
// `ExchangeApi` that counts calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::FetchError;
use crate::market_data::ExchangeApi;

pub const BASE_OPEN_TIME_MS: i64 = 1_700_000_000_000;
pub const HOUR_MS: i64 = 3_600_000;

/// A /api/v3/ticker/24hr element with string-encoded decimals, as Binance
/// sends them.
pub fn ticker_json(symbol: &str, price_change: f64) -> Value {
    json!({
        "symbol": symbol,
        "priceChange": format!("{price_change:.8}"),
        "priceChangePercent": "1.250",
        "weightedAvgPrice": "63500.12000000",
        "prevClosePrice": "62750.00000000",
        "lastPrice": "64000.00000000",
        "lastQty": "0.01500000",
        "bidPrice": "63999.99000000",
        "bidQty": "1.20000000",
        "askPrice": "64000.01000000",
        "askQty": "0.80000000",
        "openPrice": "62749.50000000",
        "highPrice": "64500.00000000",
        "lowPrice": "62000.00000000",
        "volume": "15234.12000000",
        "quoteVolume": "967000000.55000000",
        "openTime": BASE_OPEN_TIME_MS,
        "closeTime": BASE_OPEN_TIME_MS + 86_399_999,
        "firstId": 100,
        "lastId": 200,
        "count": 101
    })
}

/// One kline row `hours` after the base time, padded to Binance's 12 fields.
pub fn kline_row(hours: i64, open: f64, close: f64) -> Value {
    let open_time = BASE_OPEN_TIME_MS + hours * HOUR_MS;
    let high = open.max(close) + 1.0;
    let low = open.min(close) - 1.0;
    json!([
        open_time,
        format!("{open:.8}"),
        format!("{high:.8}"),
        format!("{low:.8}"),
        format!("{close:.8}"),
        format!("{:.8}", 10.0 + hours as f64),
        open_time + HOUR_MS - 1,
        "0",
        12,
        "0",
        "0",
        "0"
    ])
}

/// `n` consecutive hourly rows alternating bullish and bearish.
pub fn kline_rows(n: usize) -> Value {
    let rows: Vec<Value> = (0..n as i64)
        .map(|h| {
            let base = 100.0 + h as f64;
            if h % 2 == 0 {
                kline_row(h, base, base + 0.5)
            } else {
                kline_row(h, base + 0.5, base)
            }
        })
        .collect();
    Value::Array(rows)
}

/// Stub exchange. Unknown kline symbols answer like Binance does for an
/// invalid symbol.
pub struct StubExchange {
    ticker: Value,
    klines: HashMap<String, Value>,
    ticker_calls: AtomicUsize,
    kline_calls: AtomicUsize,
    last_interval: Mutex<Option<String>>,
    next_ticker_error: Mutex<Option<FetchError>>,
}

impl StubExchange {
    pub fn new(ticker: Value) -> Self {
        Self {
            ticker,
            klines: HashMap::new(),
            ticker_calls: AtomicUsize::new(0),
            kline_calls: AtomicUsize::new(0),
            last_interval: Mutex::new(None),
            next_ticker_error: Mutex::new(None),
        }
    }

    pub fn with_klines(mut self, symbol: &str, rows: Value) -> Self {
        self.klines.insert(symbol.to_string(), rows);
        self
    }

    pub fn fail_next_ticker(&self, err: FetchError) {
        *self.next_ticker_error.lock() = Some(err);
    }

    pub fn ticker_calls(&self) -> usize {
        self.ticker_calls.load(Ordering::SeqCst)
    }

    pub fn kline_calls(&self) -> usize {
        self.kline_calls.load(Ordering::SeqCst)
    }

    pub fn last_interval(&self) -> Option<String> {
        self.last_interval.lock().clone()
    }
}

#[async_trait]
impl ExchangeApi for StubExchange {
    async fn ticker_24hr(&self) -> Result<Value, FetchError> {
        self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.next_ticker_error.lock().take() {
            return Err(err);
        }
        Ok(self.ticker.clone())
    }

    async fn klines(&self, symbol: &str, interval: &str) -> Result<Value, FetchError> {
        self.kline_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_interval.lock() = Some(interval.to_string());
        self.klines
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::Upstream {
                status: 400,
                code: Some(-1121),
                message: "Invalid symbol.".into(),
            })
    }
}
