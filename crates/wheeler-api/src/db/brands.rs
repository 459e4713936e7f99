//! Brand persistence. `name` is UNIQUE in the table; callers detect a
//! clash with [`super::is_unique_violation`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::BrandRecord;

pub async fn insert(pool: &PgPool, record: &BrandRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO brands (id, name, slug, image, car_ids, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.slug)
    .bind(&record.image)
    .bind(&record.cars)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Rename a brand. Returns `false` when the id does not exist.
pub async fn update_name(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    slug: &str,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE brands SET name = $1, slug = $2, updated_at = $3 WHERE id = $4")
        .bind(name)
        .bind(slug)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Append a car to the back-reference list. Returns `false` when the brand
/// does not exist.
pub async fn append_car(
    pool: &PgPool,
    id: Uuid,
    car_id: Uuid,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE brands SET car_ids = array_append(car_ids, $1), updated_at = $2 WHERE id = $3",
    )
    .bind(car_id)
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all brands into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<BrandRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, slug, image, car_ids, created_at, updated_at
         FROM brands ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(BrandRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct BrandRow {
    id: Uuid,
    name: String,
    slug: String,
    image: String,
    car_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BrandRow {
    fn into_record(self) -> BrandRecord {
        BrandRecord {
            id: self.id,
            name: self.name,
            slug: self.slug,
            image: self.image,
            cars: self.car_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
