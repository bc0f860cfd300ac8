use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    EmptyResult(String),

    #[error("{0}")]
    UnsupportedChain(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Upstream messages that mean "slow down" rather than "broken".
fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("rate limit")
        || lower.contains("rate-limit")
        || lower.contains("too many requests")
        || lower.contains("429")
}

impl AppError {
    /// True when the upstream rejected the call because of rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::Upstream(msg) if is_rate_limit_message(msg))
    }

    /// Single message shown to the user for any fetch failure.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(msg) => format!(
                "Could not reach the explorer API ({}). Check your connection and try again.",
                msg
            ),
            AppError::Upstream(msg) if is_rate_limit_message(msg) => format!(
                "{}. The public API is rate limiting requests; wait a few seconds and retry.",
                msg.trim_end_matches('.')
            ),
            AppError::Upstream(msg)
            | AppError::EmptyResult(msg)
            | AppError::UnsupportedChain(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(_) => {
                "Something went wrong. Check the address and try again.".to_string()
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AppError::Network(_) => (StatusCode::BAD_GATEWAY, "NETWORK_ERROR"),
            AppError::Upstream(_) if self.is_rate_limited() => {
                (StatusCode::TOO_MANY_REQUESTS, "UPSTREAM_RATE_LIMITED")
            }
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::EmptyResult(_) => (StatusCode::NOT_FOUND, "NO_TRANSACTIONS"),
            AppError::UnsupportedChain(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNSUPPORTED_CHAIN")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.user_message(),
                details: None,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_upstream_gets_retry_hint() {
        // Memastikan pesan rate limit diberi saran untuk menunggu
        let err = AppError::Upstream("Subscan: API rate limit exceeded".to_string());
        assert!(err.is_rate_limited());
        assert_eq!(
            err.user_message(),
            "Subscan: API rate limit exceeded. The public API is rate limiting requests; wait a few seconds and retry."
        );
    }

    #[test]
    fn plain_upstream_message_is_verbatim() {
        let err = AppError::Upstream("Solana RPC error: Invalid param".to_string());
        assert!(!err.is_rate_limited());
        assert_eq!(err.user_message(), "Solana RPC error: Invalid param");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        // Memastikan setiap jenis error dipetakan ke status HTTP yang sesuai
        let cases = [
            (AppError::Network("dns".into()), StatusCode::BAD_GATEWAY),
            (AppError::Upstream("HTTP 500".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::Upstream("Too Many Requests".into()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (AppError::EmptyResult("none".into()), StatusCode::NOT_FOUND),
            (
                AppError::UnsupportedChain("ronin".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
