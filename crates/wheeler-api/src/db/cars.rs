//! Car persistence.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::routes::cars::UpdateCarRequest;
use crate::state::CarRecord;

const COLUMNS: &str = "id, name, slug, description, brand_id, images, price, fuel_type, \
    transmission, engine_size, mileage, safety_rating, warranty, seater, size, fuel_tank, \
    created_at, updated_at";

pub async fn insert(pool: &PgPool, record: &CarRecord) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO cars ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
    ))
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.slug)
    .bind(&record.description)
    .bind(record.brand)
    .bind(&record.images)
    .bind(record.price)
    .bind(&record.fuel_type)
    .bind(&record.transmission)
    .bind(&record.engine_size)
    .bind(&record.mileage)
    .bind(&record.safety_rating)
    .bind(&record.warranty)
    .bind(record.seater)
    .bind(&record.size)
    .bind(&record.fuel_tank)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Write only the columns present in `patch` (absent ones keep their
/// stored value). Returns `false` when the id does not exist.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: &UpdateCarRequest,
    slug: Option<&str>,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE cars SET
             name = COALESCE($1, name),
             slug = COALESCE($2, slug),
             description = COALESCE($3, description),
             brand_id = COALESCE($4, brand_id),
             images = COALESCE($5, images),
             price = COALESCE($6, price),
             fuel_type = COALESCE($7, fuel_type),
             transmission = COALESCE($8, transmission),
             engine_size = COALESCE($9, engine_size),
             mileage = COALESCE($10, mileage),
             safety_rating = COALESCE($11, safety_rating),
             warranty = COALESCE($12, warranty),
             seater = COALESCE($13, seater),
             size = COALESCE($14, size),
             fuel_tank = COALESCE($15, fuel_tank),
             updated_at = $16
         WHERE id = $17",
    )
    .bind(patch.name.as_deref())
    .bind(slug)
    .bind(patch.description.as_deref())
    .bind(patch.brand)
    .bind(patch.images.as_deref())
    .bind(patch.price)
    .bind(patch.fuel_type.as_deref())
    .bind(patch.transmission.as_deref())
    .bind(patch.engine_size.as_deref())
    .bind(patch.mileage.as_deref())
    .bind(patch.safety_rating.as_deref())
    .bind(patch.warranty.as_deref())
    .bind(patch.seater)
    .bind(patch.size.as_deref())
    .bind(patch.fuel_tank.as_deref())
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cars WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<CarRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CarRow>(&format!(
        "SELECT {COLUMNS} FROM cars ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CarRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    brand_id: Uuid,
    images: Vec<String>,
    price: Decimal,
    fuel_type: String,
    transmission: String,
    engine_size: String,
    mileage: String,
    safety_rating: String,
    warranty: String,
    seater: i32,
    size: String,
    fuel_tank: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CarRow {
    fn into_record(self) -> CarRecord {
        CarRecord {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            brand: self.brand_id,
            images: self.images,
            price: self.price,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            engine_size: self.engine_size,
            mileage: self.mileage,
            safety_rating: self.safety_rating,
            warranty: self.warranty,
            seater: self.seater,
            size: self.size,
            fuel_tank: self.fuel_tank,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
