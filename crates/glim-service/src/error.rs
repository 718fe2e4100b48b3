//! API error types and responses.
//!
//! Every failure is rendered as `{"error": "<message>", "code": "<code>"}`
//! with a non-2xx status.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use glim_core::EconomyError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Daily rewarded-video limit reached.
    #[error("Daily rewarded video limit reached")]
    CapExceeded {
        /// Rewarded videos watched today.
        watched: u32,
        /// Configured cap.
        cap: u32,
    },

    /// Offerwall completion rejected.
    #[error("Invalid offer data: {0}")]
    InvalidOffer(String),

    /// Internal server error (persistence failures included).
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            Self::CapExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "cap_exceeded",
                self.to_string(),
            ),
            Self::InvalidOffer(_) => (StatusCode::BAD_REQUEST, "invalid_offer", self.to_string()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

impl From<glim_store::StoreError> for ApiError {
    fn from(err: glim_store::StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<EconomyError> for ApiError {
    fn from(err: EconomyError) -> Self {
        match err {
            EconomyError::CapExceeded { watched, cap } => Self::CapExceeded { watched, cap },
            EconomyError::InvalidOffer(msg) => Self::InvalidOffer(msg),
            EconomyError::InvalidQuest(msg) => Self::BadRequest(msg),
            EconomyError::InvalidId(e) => Self::BadRequest(e.to_string()),
            EconomyError::Configuration(msg) | EconomyError::Storage(msg) => Self::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
