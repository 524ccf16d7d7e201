// =============================================================================
// API error responses
// =============================================================================
//
// Body shape:
//   { "error": { "code": "upstream_error", "message": "..." }, "request_id": "..." }
//
// The request id is logged alongside the error so a failure shown on the page
// can be matched to the server log.
// =============================================================================

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::{ChartError, DashboardError, FetchError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::Fetch(f) => Self::Fetch(f),
            DashboardError::Chart(c) => Self::Chart(c),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorInfo,
    request_id: String,
}

#[derive(Debug, Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    /// Binance's numeric error code, when the exchange supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    exchange_code: Option<i64>,
}

impl ApiError {
    fn exchange_code(&self) -> Option<i64> {
        match self {
            Self::Fetch(FetchError::Upstream { code, .. }) => *code,
            _ => None,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Fetch(FetchError::Timeout { .. }) => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout"),
            Self::Fetch(FetchError::RateLimited { .. }) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            Self::Fetch(FetchError::Transport { .. }) => (StatusCode::BAD_GATEWAY, "upstream_unreachable"),
            Self::Fetch(FetchError::Upstream { .. }) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            Self::Fetch(FetchError::Malformed(_)) | Self::Fetch(FetchError::Parse { .. }) => {
                (StatusCode::BAD_GATEWAY, "malformed_response")
            }
            Self::Chart(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_series"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!(request_id = %request_id, code, error = %self, "request failed");
        } else {
            warn!(request_id = %request_id, code, error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message: self.to_string(),
                exchange_code: self.exchange_code(),
            },
            request_id,
        };
        (status, Json(body)).into_response()
    }
}
