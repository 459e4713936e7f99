//! # wheeler-payments — Payment Gateway Seam
//!
//! The marketplace charges carts through an external processor. This crate
//! defines the [`PaymentGateway`] trait the API depends on, a real
//! [`BraintreeGateway`] HTTP client, and a [`MockPaymentGateway`] for tests
//! and offline development.
//!
//! ## Error Handling
//!
//! Transport failures, non-2xx statuses, GraphQL-level errors and declined
//! transactions all map to [`PaymentError`] variants with the operation
//! name attached. Retries are not attempted; the caller decides what a
//! failure means for its order record.

pub mod braintree;
pub mod error;
pub mod mock;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use braintree::{BraintreeConfig, BraintreeEnvironment, BraintreeGateway};
pub use error::PaymentError;
pub use mock::MockPaymentGateway;

/// Opaque token handed to the client-side drop-in to tokenize a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientToken(pub String);

impl ClientToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A sale to submit for settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRequest {
    /// Single-use payment method nonce produced by the client.
    pub nonce: String,
    /// Amount to charge, in the merchant account currency.
    pub amount: Decimal,
}

/// Gateway response for an accepted sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub transaction_id: String,
    pub status: String,
    pub amount: Decimal,
    /// Full gateway payload, stored on the order as-is.
    pub raw: serde_json::Value,
}

/// External payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short gateway name for logs.
    fn name(&self) -> &'static str;

    /// Obtain a client token for the payment UI.
    async fn client_token(&self) -> Result<ClientToken, PaymentError>;

    /// Submit a sale for settlement.
    async fn sale(&self, request: &SaleRequest) -> Result<SaleOutcome, PaymentError>;
}
