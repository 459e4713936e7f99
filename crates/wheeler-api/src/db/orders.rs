//! Order persistence. Orders are inserted as `pending` before the gateway
//! is called and updated once it answers.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::{CartItem, OrderRecord, OrderStatus};

pub async fn insert(pool: &PgPool, record: &OrderRecord) -> Result<(), sqlx::Error> {
    let products = serde_json::to_value(&record.products)
        .map_err(|e| sqlx::Error::Protocol(format!("failed to serialize order products: {e}")))?;

    sqlx::query(
        "INSERT INTO orders (id, products, payment, buyer_id, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(record.id)
    .bind(&products)
    .bind(&record.payment)
    .bind(record.buyer)
    .bind(record.status.as_str())
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record the gateway outcome.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: OrderStatus,
    payment: &serde_json::Value,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET status = $1, payment = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(status.as_str())
    .bind(payment)
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<OrderRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, products, payment, buyer_id, status, created_at, updated_at
         FROM orders ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(OrderRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    products: serde_json::Value,
    payment: serde_json::Value,
    buyer_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_record(self) -> OrderRecord {
        let products: Vec<CartItem> =
            serde_json::from_value(self.products).unwrap_or_else(|e| {
                tracing::warn!(
                    order_id = %self.id,
                    error = %e,
                    "failed to deserialize order products from database"
                );
                Vec::new()
            });

        let status = OrderStatus::parse(&self.status).unwrap_or_else(|| {
            tracing::warn!(
                order_id = %self.id,
                status = %self.status,
                "unknown order status in database, treating as failed"
            );
            OrderStatus::Failed
        });

        OrderRecord {
            id: self.id,
            products,
            payment: self.payment,
            buyer: self.buyer_id,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
