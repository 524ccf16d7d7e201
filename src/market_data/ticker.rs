// =============================================================================
// 24h Ticker Snapshot — one row per traded symbol
// =============================================================================
//
// Parsed from GET /api/v3/ticker/24hr. Every fetch yields a complete, fresh
// table; rows are never patched in place.
// =============================================================================

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;
use crate::market_data::wire::{field, parse_f64, parse_i64};

/// 24-hour rolling statistics for one symbol. Serialises with the exchange's
/// camelCase column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerSnapshot {
    pub symbol: String,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub weighted_avg_price: f64,
    pub prev_close_price: f64,
    pub last_price: f64,
    pub last_qty: f64,
    pub bid_price: f64,
    pub bid_qty: f64,
    pub ask_price: f64,
    pub ask_qty: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub volume: f64,
    pub quote_volume: f64,
    /// Start of the 24h window, epoch milliseconds.
    pub open_time: i64,
    /// End of the 24h window, epoch milliseconds.
    pub close_time: i64,
    /// -1 when the symbol had no trades in the window.
    pub first_id: i64,
    pub last_id: i64,
    pub count: i64,
}

impl TickerSnapshot {
    /// Parse one element of the ticker array.
    pub fn from_json(entry: &Value) -> Result<Self, FetchError> {
        if !entry.is_object() {
            return Err(FetchError::Malformed(format!(
                "ticker entry is not an object: {entry}"
            )));
        }

        let symbol = field(entry, "symbol")?
            .as_str()
            .ok_or_else(|| FetchError::Malformed("ticker `symbol` is not a string".into()))?
            .to_string();

        let num = |name: &'static str| field(entry, name).and_then(|v| parse_f64(v, name));
        let int = |name: &'static str| field(entry, name).and_then(|v| parse_i64(v, name));

        Ok(Self {
            symbol,
            price_change: num("priceChange")?,
            price_change_percent: num("priceChangePercent")?,
            weighted_avg_price: num("weightedAvgPrice")?,
            prev_close_price: num("prevClosePrice")?,
            last_price: num("lastPrice")?,
            last_qty: num("lastQty")?,
            bid_price: num("bidPrice")?,
            bid_qty: num("bidQty")?,
            ask_price: num("askPrice")?,
            ask_qty: num("askQty")?,
            open_price: num("openPrice")?,
            high_price: num("highPrice")?,
            low_price: num("lowPrice")?,
            volume: num("volume")?,
            quote_volume: num("quoteVolume")?,
            open_time: int("openTime")?,
            close_time: int("closeTime")?,
            first_id: int("firstId")?,
            last_id: int("lastId")?,
            count: int("count")?,
        })
    }
}

/// Parse the full ticker response. An empty array or a repeated symbol is a
/// malformed response, not an empty table.
pub fn parse_ticker_table(body: &Value) -> Result<Vec<TickerSnapshot>, FetchError> {
    let raw = body
        .as_array()
        .ok_or_else(|| FetchError::Malformed("ticker response is not an array".into()))?;

    if raw.is_empty() {
        return Err(FetchError::Malformed(
            "ticker response contained no symbols".into(),
        ));
    }

    let mut seen = HashSet::with_capacity(raw.len());
    let mut rows = Vec::with_capacity(raw.len());

    for entry in raw {
        let row = TickerSnapshot::from_json(entry)?;
        if !seen.insert(row.symbol.clone()) {
            return Err(FetchError::Malformed(format!(
                "symbol {} appears twice in ticker response",
                row.symbol
            )));
        }
        rows.push(row);
    }

    Ok(rows)
}

// =============================================================================
// Sorting
// =============================================================================

/// Columns the snapshot table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Symbol,
    #[default]
    PriceChange,
    PriceChangePercent,
    LastPrice,
    Volume,
    QuoteVolume,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Stable sort of `rows` by `key`. Parsed rows never contain NaN, and
/// `total_cmp` keeps the comparison total regardless.
pub fn sort_rows(rows: &mut [TickerSnapshot], key: SortKey, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// The dashboard's default ordering: largest 24h price change first.
pub fn sort_by_price_change_desc(rows: &mut [TickerSnapshot]) {
    sort_rows(rows, SortKey::PriceChange, SortOrder::Desc);
}

fn compare(a: &TickerSnapshot, b: &TickerSnapshot, key: SortKey) -> Ordering {
    match key {
        SortKey::Symbol => a.symbol.cmp(&b.symbol),
        SortKey::PriceChange => a.price_change.total_cmp(&b.price_change),
        SortKey::PriceChangePercent => a.price_change_percent.total_cmp(&b.price_change_percent),
        SortKey::LastPrice => a.last_price.total_cmp(&b.last_price),
        SortKey::Volume => a.volume.total_cmp(&b.volume),
        SortKey::QuoteVolume => a.quote_volume.total_cmp(&b.quote_volume),
        SortKey::Count => a.count.cmp(&b.count),
    }
}
