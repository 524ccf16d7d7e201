// =============================================================================
// Hourly OHLCV candles
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::market_data::wire::parse_f64;

/// The only kline interval this dashboard requests.
pub const CANDLE_INTERVAL: &str = "1h";

/// A single OHLCV bucket. `timestamp` is the bucket's open time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Parse one kline row.
    ///
    /// Binance rows are positional:
    ///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume,
    ///   [6] closeTime, [7] quoteAssetVolume, [8] numberOfTrades, ...
    ///
    /// Only the first six positions are read; trailing fields are ignored.
    pub fn from_kline_row(row: &Value, index: usize) -> Result<Self, FetchError> {
        let arr = row
            .as_array()
            .ok_or_else(|| FetchError::Malformed(format!("kline row {index} is not an array")))?;

        if arr.len() < 6 {
            return Err(FetchError::Malformed(format!(
                "kline row {index} has {} elements, expected at least 6",
                arr.len()
            )));
        }

        // Open time is always an integer millisecond timestamp on the wire.
        let open_time = arr[0].as_i64().ok_or_else(|| {
            FetchError::Malformed(format!(
                "kline row {index} open time {} is not an integer",
                arr[0]
            ))
        })?;
        let timestamp = DateTime::from_timestamp_millis(open_time).ok_or_else(|| {
            FetchError::Malformed(format!("kline row {index} open time {open_time} is out of range"))
        })?;

        Ok(Self {
            timestamp,
            open: parse_f64(&arr[1], "open")?,
            high: parse_f64(&arr[2], "high")?,
            low: parse_f64(&arr[3], "low")?,
            close: parse_f64(&arr[4], "close")?,
            volume: parse_f64(&arr[5], "volume")?,
        })
    }
}

/// Parse a full klines response, preserving the exchange's (ascending) order.
pub fn parse_klines(body: &Value) -> Result<Vec<Candle>, FetchError> {
    let raw = body
        .as_array()
        .ok_or_else(|| FetchError::Malformed("klines response is not an array".into()))?;

    if raw.is_empty() {
        return Err(FetchError::Malformed("klines response contained no candles".into()));
    }

    raw.iter()
        .enumerate()
        .map(|(i, row)| Candle::from_kline_row(row, i))
        .collect()
}
