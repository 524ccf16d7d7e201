// =============================================================================
// Binance REST API Client — public market-data endpoints
// =============================================================================
//
// Only unsigned endpoints are used, so no API key or secret is configured.
// Every request goes through `get_json`, which enforces the client timeout,
// records request weight, and classifies failures into `FetchError`.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::binance::rate_limit::RateLimitTracker;
use crate::error::FetchError;
use crate::market_data::ExchangeApi;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

const TICKER_24HR_PATH: &str = "/api/v3/ticker/24hr";
const KLINES_PATH: &str = "/api/v3/klines";

/// Longest slice of a non-JSON error body echoed into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Binance REST client for the public market-data endpoints.
#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    rate_limit: Arc<RateLimitTracker>,
}

impl BinanceClient {
    /// Create a client against `base_url` (no trailing slash needed) with a
    /// per-request `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        rate_limit: Arc<RateLimitTracker>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, timeout_ms = timeout.as_millis() as u64, "BinanceClient initialised");

        Ok(Self {
            base_url,
            client,
            rate_limit,
        })
    }

    /// GET `path` with `query`, returning the decoded JSON body of a
    /// successful response.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(path, e))?;

        self.rate_limit.update_from_headers(resp.headers());

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| classify_reqwest_error(path, e))?;

        if !status.is_success() {
            let err = upstream_error(status, &body);
            warn!(path, status = status.as_u16(), error = %err, "Binance request rejected");
            return Err(err);
        }

        decode_body(path, &body)
    }
}

#[async_trait]
impl ExchangeApi for BinanceClient {
    #[instrument(skip(self), name = "binance::ticker_24hr")]
    async fn ticker_24hr(&self) -> Result<Value, FetchError> {
        let body = self.get_json(TICKER_24HR_PATH, &[]).await?;
        debug!(
            symbols = body.as_array().map_or(0, Vec::len),
            "ticker/24hr fetched"
        );
        Ok(body)
    }

    #[instrument(skip(self), name = "binance::klines")]
    async fn klines(&self, symbol: &str, interval: &str) -> Result<Value, FetchError> {
        let body = self
            .get_json(KLINES_PATH, &[("symbol", symbol), ("interval", interval)])
            .await?;
        debug!(
            symbol,
            interval,
            rows = body.as_array().map_or(0, Vec::len),
            "klines fetched"
        );
        Ok(body)
    }
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Response classification
// -----------------------------------------------------------------------------

fn classify_reqwest_error(path: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            endpoint: path.to_string(),
        }
    } else {
        FetchError::Transport {
            endpoint: path.to_string(),
            source: e,
        }
    }
}

/// Build the error for a non-success response. Binance error bodies look like
/// `{"code": -1121, "msg": "Invalid symbol."}`; anything else is echoed
/// (truncated) or replaced by the status reason.
fn upstream_error(status: StatusCode, body: &str) -> FetchError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|v| v["code"].as_i64());
    let message = parsed
        .as_ref()
        .and_then(|v| v["msg"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("no reason").to_string()
            } else {
                trimmed.chars().take(MAX_ERROR_BODY).collect()
            }
        });

    // 418 is Binance's IP ban after ignoring 429s.
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
        FetchError::RateLimited {
            status: status.as_u16(),
            message,
        }
    } else {
        FetchError::Upstream {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

fn decode_body(path: &str, body: &str) -> Result<Value, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::Malformed(format!("empty response body from {path}")));
    }
    serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("invalid JSON from {path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binance_error_body_is_decoded() {
        let err = upstream_error(
            StatusCode::BAD_REQUEST,
            r#"{"code":-1121,"msg":"Invalid symbol."}"#,
        );
        match err {
            FetchError::Upstream { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(-1121));
                assert_eq!(message, "Invalid symbol.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rate_limit_statuses_are_distinguished() {
        assert!(matches!(
            upstream_error(StatusCode::TOO_MANY_REQUESTS, ""),
            FetchError::RateLimited { status: 429, .. }
        ));
        assert!(matches!(
            upstream_error(StatusCode::IM_A_TEAPOT, r#"{"code":-1003,"msg":"banned"}"#),
            FetchError::RateLimited { status: 418, .. }
        ));
    }

    #[test]
    fn non_json_error_body_is_truncated() {
        let html = "<html>".repeat(100);
        match upstream_error(StatusCode::BAD_GATEWAY, &html) {
            FetchError::Upstream { code, message, .. } => {
                assert_eq!(code, None);
                assert_eq!(message.chars().count(), MAX_ERROR_BODY);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_error_body_uses_reason_phrase() {
        match upstream_error(StatusCode::SERVICE_UNAVAILABLE, "") {
            FetchError::Upstream { message, .. } => assert_eq!(message, "Service Unavailable"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_success_body_is_malformed() {
        assert!(matches!(
            decode_body(TICKER_24HR_PATH, "  "),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(
            decode_body(KLINES_PATH, "[1, 2"),
            Err(FetchError::Malformed(_))
        ));
        assert!(decode_body(KLINES_PATH, "[]").is_ok());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = BinanceClient::new(
            "https://api.binance.com/",
            Duration::from_secs(5),
            Arc::new(RateLimitTracker::new()),
        )
        .unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = BinanceClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            Arc::new(RateLimitTracker::new()),
        )
        .unwrap();
        let err = client.ticker_24hr().await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Transport { .. } | FetchError::Timeout { .. }
        ));
    }
}
