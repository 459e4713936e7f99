//! # wheeler-core — Foundational Types for the Marketplace
//!
//! Pure, I/O-free building blocks shared by every other crate in the
//! workspace. Nothing here touches the network, the filesystem, or the
//! database, so everything is unit-testable in isolation.
//!
//! ## Contents
//!
//! - [`slug`] — URL-safe slug derivation for brand and car names.
//! - [`media`] — the public image URL convention: extracting a blob id from
//!   a stored file reference and rewriting it to a CDN-style URL.
//! - [`role`] — user roles used by admin authorization.
//! - [`money`] — cart totals over decimal prices.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wheeler-*` crates (leaf of the DAG).
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod media;
pub mod money;
pub mod role;
pub mod slug;

pub use error::CoreError;
pub use media::{extract_blob_id, rewrite_reference, to_public_url, CDN_HOST};
pub use money::{cart_total, validate_price};
pub use role::Role;
pub use slug::{slugify, slugify_or};
