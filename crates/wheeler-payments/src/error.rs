//! Payment gateway error types.

/// Errors from payment gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// HTTP transport error.
    #[error("HTTP error calling {operation}: {source}")]
    Http {
        operation: &'static str,
        source: reqwest::Error,
    },
    /// Gateway returned a non-2xx status.
    #[error("gateway {operation} returned {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },
    /// Gateway accepted the request but reported errors in the payload.
    #[error("gateway {operation} failed: {message}")]
    Gateway {
        operation: &'static str,
        message: String,
    },
    /// The transaction was created but not approved.
    #[error("transaction {transaction_id} declined with status {status}")]
    Declined {
        transaction_id: String,
        status: String,
    },
    /// Response body did not have the expected shape.
    #[error("failed to decode {operation} response: {reason}")]
    Deserialization {
        operation: &'static str,
        reason: String,
    },
    /// The amount cannot be charged without rounding.
    #[error("amount {0} has more than two decimal places")]
    InvalidAmount(rust_decimal::Decimal),
    /// Gateway misconfiguration.
    #[error("configuration error: {0}")]
    Config(String),
}
