// =============================================================================
// Error taxonomy for market-data fetches and chart rendering
// =============================================================================
//
// Fetch failures are never retried or degraded into partial results; they
// propagate to the HTTP layer, which renders them as an explicit error.
// =============================================================================

use thiserror::Error;

/// Failure of a single exchange fetch (ticker snapshot or kline series).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Host unreachable, connection reset, TLS failure, ...
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client gave up waiting for the exchange.
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// HTTP 429 / 418 from the exchange.
    #[error("rate limited by exchange (HTTP {status}): {message}")]
    RateLimited { status: u16, message: String },

    /// Any other non-success status. `code` is the exchange's numeric error
    /// code when the body carried one (e.g. -1121 for an unknown symbol).
    #[error("exchange returned HTTP {status}: {message}")]
    Upstream {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// Body was empty, not JSON, or not the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A wire value that should be numeric was not.
    #[error("field `{field}` is not numeric: {value}")]
    Parse { field: &'static str, value: String },
}

/// Rejection of a candle series handed to the chart renderer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("cannot plot an empty candle series")]
    EmptySeries,

    #[error("candle {index} has a non-finite {field} value")]
    NonFinite { index: usize, field: &'static str },

    #[error("candle {index} is not later than the candle before it")]
    Unordered { index: usize },
}

/// Anything that can abort one dashboard render cycle.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}
