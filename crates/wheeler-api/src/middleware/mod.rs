//! # Middleware Stack
//!
//! - [`metrics`]: Prometheus request metrics and the domain gauges scraped
//!   at `/metrics`.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` directly, and
//! authentication lives in [`crate::auth`].

pub mod metrics;
