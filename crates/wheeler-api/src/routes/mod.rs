//! # API Route Modules
//!
//! - `brands` — brand catalogue: list, lookup by slug, and admin-only
//!   create (multipart with image), rename and delete.
//! - `cars` — car catalogue: list, lookup by slug, related cars, and
//!   admin-only create (multipart with images), update and delete.
//! - `payments` — Braintree client token and checkout for signed-in buyers.
//!
//! Reads return populated documents with image references rewritten for
//! the CDN (see [`crate::catalog`]). Writes return the stored document.

pub mod brands;
pub mod cars;
pub mod payments;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope for operations that return no document.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
