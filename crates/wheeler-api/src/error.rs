//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every failure renders the same envelope:
//!
//! ```json
//! { "success": false, "message": "Brand Name is Required", "error": "VALIDATION_ERROR" }
//! ```
//!
//! Internal and upstream details are logged, never returned to clients.
//! Payment declines and gateway-reported errors are the exception: the
//! buyer sees them, transport and configuration details stay hidden.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use wheeler_core::CoreError;
use wheeler_media::BlobError;
use wheeler_payments::PaymentError;

/// JSON error envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code (e.g. `NOT_FOUND`).
    pub error: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// A required field is missing or a business rule failed (400).
    #[error("validation error: {0}")]
    Validation(String),

    /// The body could not be parsed at all (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unique value already taken. Reported as a soft failure (200,
    /// `success: false`) so storefront forms can show it inline.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The gateway refused the charge or reported an error (500). The
    /// message is shown to the buyer.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// Blob store or payment gateway failure (500). Message is logged only.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal server error (500). Message is logged only.
    #[error("internal error: {0}")]
    Internal(String),

    /// Dependency not configured (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Duplicate(_) => (StatusCode::OK, "DUPLICATE"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::PaymentFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PAYMENT_FAILED"),
            Self::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    /// Message shown to the client.
    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Upstream(_) => "An upstream service error occurred".to_string(),
            Self::NotFound(m)
            | Self::Validation(m)
            | Self::BadRequest(m)
            | Self::Duplicate(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::PaymentFailed(m)
            | Self::ServiceUnavailable(m) => m.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Upstream(_) => tracing::error!(error = %self, "upstream service error"),
            Self::PaymentFailed(_) => tracing::warn!(error = %self, "payment failed"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            success: false,
            message: self.client_message(),
            error: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::Config(_) => Self::Internal(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Declined { status, .. } => {
                Self::PaymentFailed(format!("transaction declined: {status}"))
            }
            PaymentError::Gateway { message, .. } => {
                Self::PaymentFailed(format!("payment gateway error: {message}"))
            }
            PaymentError::InvalidAmount(_) => Self::Validation(err.to_string()),
            PaymentError::Config(_) => Self::Internal(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}
