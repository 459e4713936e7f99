//! # Database Persistence Layer
//!
//! Optional PostgreSQL write-through for every record type, via SQLx.
//!
//! When `DATABASE_URL` is set, handlers write here first and update the
//! in-memory stores only after the write succeeds; at startup every table
//! is loaded back into memory. Without a URL the API runs in-memory only.

pub mod brands;
pub mod cars;
pub mod orders;
pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect and run embedded migrations.
///
/// Returns `None` when no URL is configured (in-memory-only mode).
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url.filter(|u| !u.trim().is_empty()) else {
        tracing::warn!(
            "DATABASE_URL not set — running in-memory only mode. \
             Catalogue and orders will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Whether `err` is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
