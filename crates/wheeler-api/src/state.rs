//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! - **Stores** — brands, cars, users and orders held in memory behind
//!   `parking_lot::RwLock`. They are the read path for every request.
//! - **Database** — optional PostgreSQL pool. When present, handlers write
//!   to the database first and then to memory, and [`AppState::hydrate_from_db`]
//!   fills the stores at startup.
//! - **Blob store** — where uploaded brand and car images go.
//! - **Payment gateway** — optional; payment routes return 503 without one.
//! - **Token verifier** — HS256 JWT verification for the auth middleware.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;
use wheeler_core::Role;
use wheeler_media::BlobStore;
use wheeler_payments::PaymentGateway;

use crate::auth::TokenVerifier;

// -- Generic In-Memory Store --------------------------------------------------

/// A record that can live in a [`Store`].
pub trait Record: Clone + Send + Sync {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is never held across `.await` points, so a synchronous
/// `parking_lot::RwLock` is enough. Listings are ordered by creation time
/// (then id) so responses are stable regardless of hash order.
#[derive(Debug)]
pub struct Store<T: Record> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Record> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

fn creation_order<T: Record>(a: &T, b: &T) -> std::cmp::Ordering {
    a.created_at()
        .cmp(&b.created_at())
        .then_with(|| a.id().cmp(&b.id()))
}

impl<T: Record> Store<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record keyed by its id, returning the previous value.
    pub fn insert(&self, value: T) -> Option<T> {
        self.data.write().insert(value.id(), value)
    }

    /// Insert unless an existing record satisfies `conflicts`.
    ///
    /// The check and the insert run under one write lock. Returns `false`
    /// (and leaves the store untouched) on conflict.
    pub fn insert_unless(&self, value: T, conflicts: impl Fn(&T) -> bool) -> bool {
        let mut guard = self.data.write();
        if guard.values().any(conflicts) {
            return false;
        }
        guard.insert(value.id(), value);
        true
    }

    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// All records in creation order.
    pub fn list(&self) -> Vec<T> {
        let mut all: Vec<T> = self.data.read().values().cloned().collect();
        all.sort_by(creation_order);
        all
    }

    /// Matching records in creation order.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let mut matched: Vec<T> = self
            .data
            .read()
            .values()
            .filter(|v| pred(v))
            .cloned()
            .collect();
        matched.sort_by(creation_order);
        matched
    }

    /// The earliest-created record matching `pred`.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.data
            .read()
            .values()
            .filter(|v| pred(v))
            .min_by(|a, b| creation_order(*a, *b))
            .cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole contents (startup hydration).
    pub fn replace_all(&self, records: Vec<T>) {
        let mut guard = self.data.write();
        guard.clear();
        guard.extend(records.into_iter().map(|r| (r.id(), r)));
    }
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Records ------------------------------------------------------------------

/// Vehicle manufacturer. `cars` is the back-reference list, maintained by
/// car creation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Stored image reference (local path or remote share link).
    pub image: String,
    pub cars: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Car listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub brand: Uuid,
    pub images: Vec<String>,
    pub price: Decimal,
    pub fuel_type: String,
    pub transmission: String,
    pub engine_size: String,
    pub mileage: String,
    pub safety_rating: String,
    pub warranty: String,
    pub seater: i32,
    pub size: String,
    pub fuel_tank: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account used for authorization only. This service never writes users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Recorded, gateway not yet answered.
    Pending,
    Settled,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "settled" => Some(Self::Settled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a checkout cart, snapshotted onto the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    /// Car id. Storefronts that send `_id` are accepted too.
    #[serde(alias = "_id")]
    pub product: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: Uuid,
    pub products: Vec<CartItem>,
    /// Gateway result (or failure) as returned by the payment adapter.
    #[schema(value_type = Object)]
    pub payment: serde_json::Value,
    pub buyer: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> Uuid {
                self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        })*
    };
}

impl_record!(BrandRecord, CarRecord, UserRecord, OrderRecord);

// -- Configuration ------------------------------------------------------------

/// Runtime knobs that shape the router.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Request body limit for the API routes (multipart uploads included).
    pub max_upload_bytes: usize,
    pub metrics_enabled: bool,
    /// Allowed CORS origins. Empty disables the CORS layer.
    pub cors_origins: Vec<String>,
    /// Directory served under `/storage` when images are kept on local disk.
    pub static_root: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            metrics_enabled: true,
            cors_origins: Vec::new(),
            static_root: None,
        }
    }
}

// -- AppState -----------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub brands: Store<BrandRecord>,
    pub cars: Store<CarRecord>,
    pub users: Store<UserRecord>,
    pub orders: Store<OrderRecord>,

    pub blobs: Arc<dyn BlobStore>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub tokens: TokenVerifier,

    /// When `None`, the API runs in in-memory-only mode.
    pub db_pool: Option<PgPool>,

    pub config: AppConfig,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("brands", &self.brands.len())
            .field("cars", &self.cars.len())
            .field("users", &self.users.len())
            .field("orders", &self.orders.len())
            .field("blobs", &self.blobs.backend())
            .field("payments", &self.payments.as_ref().map(|g| g.name()))
            .field("db_pool", &self.db_pool.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Empty in-memory state with no database and no payment gateway.
    pub fn new(tokens: TokenVerifier, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            brands: Store::new(),
            cars: Store::new(),
            users: Store::new(),
            orders: Store::new(),
            blobs,
            payments: None,
            tokens,
            db_pool: None,
            config: AppConfig::default(),
        }
    }

    pub fn with_payments(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(gateway);
        self
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Load every table into the in-memory stores. No-op without a database.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };

        let users = crate::db::users::load_all(pool).await?;
        let brands = crate::db::brands::load_all(pool).await?;
        let cars = crate::db::cars::load_all(pool).await?;
        let orders = crate::db::orders::load_all(pool).await?;

        tracing::info!(
            users = users.len(),
            brands = brands.len(),
            cars = cars.len(),
            orders = orders.len(),
            "hydrated in-memory stores from database"
        );

        self.users.replace_all(users);
        self.brands.replace_all(brands);
        self.cars.replace_all(cars);
        self.orders.replace_all(orders);
        Ok(())
    }
}
