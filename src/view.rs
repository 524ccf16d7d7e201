// =============================================================================
// Dashboard view model — one render cycle of the page
// =============================================================================
//
//   1. fetch the 24h snapshot and sort by priceChange, largest first
//   2. symbol list = that order; default selection = first symbol
//   3. table = the sorted snapshot, truncated to `limit` rows
//   4. fetch candles for the selection and build the chart
//
// A failure at any step aborts the cycle; no partial dashboard is returned.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::chart::{plot_candles, Figure};
use crate::error::DashboardError;
use crate::market_data::ticker::sort_by_price_change_desc;
use crate::market_data::{MarketFetcher, TickerSnapshot};

/// Default number of table rows shown on the page.
pub const TABLE_ROWS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Every symbol, largest 24h price change first.
    pub symbols: Vec<String>,
    pub table: Vec<TickerSnapshot>,
    pub selected: String,
    pub figure: Figure,
    pub generated_at: DateTime<Utc>,
}

/// Symbols in snapshot order.
pub fn symbol_list(rows: &[TickerSnapshot]) -> Vec<String> {
    rows.iter().map(|r| r.symbol.clone()).collect()
}

/// The requested symbol if one was given, otherwise the first listed. A
/// requested symbol missing from the list is kept; the exchange decides
/// whether it exists.
pub fn select_symbol(symbols: &[String], requested: Option<&str>) -> Option<String> {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(sym) => Some(sym.to_string()),
        None => symbols.first().cloned(),
    }
}

pub async fn build_dashboard(
    fetcher: &MarketFetcher,
    requested: Option<&str>,
    limit: usize,
) -> Result<Dashboard, DashboardError> {
    let mut rows = fetcher.get_prices().await?.to_vec();
    sort_by_price_change_desc(&mut rows);

    let symbols = symbol_list(&rows);
    // parse_ticker_table rejects empty snapshots, so a default always exists.
    let selected = select_symbol(&symbols, requested).unwrap_or_default();

    let candles = fetcher.get_candles(&selected).await?;
    let figure = plot_candles(&candles)?;

    rows.truncate(limit);

    info!(
        selected = %selected,
        symbols = symbols.len(),
        table_rows = rows.len(),
        points = figure.candlestick_points(),
        "dashboard rendered"
    );

    Ok(Dashboard {
        symbols,
        table: rows,
        selected,
        figure,
        generated_at: Utc::now(),
    })
}
