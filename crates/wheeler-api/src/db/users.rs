//! User lookup. Users are managed elsewhere; this service only reads them
//! to resolve admin roles.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wheeler_core::Role;

use crate::state::UserRecord;

pub async fn load_all(pool: &PgPool) -> Result<Vec<UserRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, role, created_at FROM users ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: i16,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            role: Role::from_code(self.role),
            created_at: self.created_at,
        }
    }
}
