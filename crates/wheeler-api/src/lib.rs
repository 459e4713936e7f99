//! # wheeler-api — Axum API for the Wheeler Dealer Marketplace
//!
//! Catalogue of vehicle brands and cars with image uploads, plus Braintree
//! checkout for signed-in buyers.
//!
//! ## API Surface
//!
//! | Prefix                    | Module                  | Access              |
//! |---------------------------|-------------------------|---------------------|
//! | `/api/brand/*`            | [`routes::brands`]      | reads public, writes admin |
//! | `/api/car/*`              | [`routes::cars`]        | reads public, writes admin |
//! | `/api/car/braintree/*`    | [`routes::payments`]    | token public, payment signed-in |
//! | `/openapi.json`           | [`openapi`]             | public              |
//! | `/storage/*`              | static files            | public (local backend only) |
//! | `/health/*`, `/metrics`   | probes                  | public              |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! Cors → TraceLayer → MetricsMiddleware → AuthMiddleware → BodyLimit → Handler
//! ```
//!
//! The auth middleware only identifies the caller. Each handler states what
//! it needs through its extractors ([`auth::CallerIdentity`],
//! [`auth::AdminIdentity`]), which run before the body is read.

pub mod auth;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::state::{AppState, OrderStatus};

/// Text served at `/`.
pub const BANNER: &str = "Backend is running successfully!";

/// Assemble the full application router.
///
/// Probes, `/metrics` and static files sit outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = state.config.metrics_enabled;

    let mut api = Router::new()
        .merge(routes::brands::router())
        .merge(routes::cars::router())
        .merge(routes::payments::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut unauthenticated = Router::new()
        .route("/", get(banner))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let mut router = Router::new()
        .merge(unauthenticated.with_state(state.clone()))
        .merge(api);

    if let Some(root) = &state.config.static_root {
        router = router.nest_service("/storage", ServeDir::new(root));
    }

    match cors_layer(&state.config.cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// CORS for the storefront origins. `None` when no valid origin is configured.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

async fn banner() -> &'static str {
    BANNER
}

/// GET /metrics — Prometheus scrape endpoint.
///
/// Catalogue gauges are refreshed from `AppState` before encoding.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    metrics.brands_total().set(state.brands.len() as f64);
    metrics.cars_total().set(state.cars.len() as f64);

    let orders = state.orders.list();
    metrics.orders_total().reset();
    for status in [OrderStatus::Pending, OrderStatus::Settled, OrderStatus::Failed] {
        let count = orders.iter().filter(|o| o.status == status).count();
        metrics
            .orders_total()
            .with_label_values(&[status.as_str()])
            .set(count as f64);
    }

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — 200 while the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 503 when the configured database is unreachable.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_skips_invalid_and_empty() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_some());
    }
}
