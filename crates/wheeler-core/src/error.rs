//! # Error Types
//!
//! Validation failures raised by the pure domain helpers. Callers at the
//! HTTP edge map these to 400 responses.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by `wheeler-core` helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A display name produced an empty slug (nothing alphanumeric after
    /// transliteration).
    #[error("'{0}' does not contain any letters or digits")]
    EmptySlug(String),

    /// A cart contained no items.
    #[error("cart must contain at least one item")]
    EmptyCart,

    /// A cart item carried a negative price.
    #[error("cart item {index} has a negative price: {price}")]
    NegativePrice {
        /// Zero-based position of the offending item.
        index: usize,
        /// The rejected price.
        price: Decimal,
    },

    /// A cart item price has sub-cent precision.
    #[error("cart item {index} has more than two decimal places: {price}")]
    PricePrecision {
        /// Zero-based position of the offending item.
        index: usize,
        /// The rejected price.
        price: Decimal,
    },

    /// A price is negative, has sub-cent precision, or has too many
    /// integer digits to store.
    #[error("invalid price {0}")]
    InvalidPrice(Decimal),

    /// Summing the cart overflowed the decimal range.
    #[error("cart total overflowed")]
    TotalOverflow,
}
