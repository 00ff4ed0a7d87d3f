//! Database operations for the `brands` table.

use batcave_core::{BrandConfig, BrandRecord};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub name: String,
    pub aliases: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BrandRow> for BrandRecord {
    fn from(row: BrandRow) -> Self {
        BrandRecord {
            name: row.name,
            aliases: row.aliases,
        }
    }
}

/// Returns every registered brand, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, aliases, created_at, updated_at \
         FROM brands \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Upsert brands from config into the database, keyed on name.
///
/// Returns the number of brands processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_brands(pool: &PgPool, brands: &[BrandConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for brand in brands {
        let record = BrandRecord::from(brand);
        sqlx::query(
            "INSERT INTO brands (name, aliases) \
             VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET \
                 aliases = EXCLUDED.aliases, \
                 updated_at = NOW()",
        )
        .bind(&record.name)
        .bind(&record.aliases)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    tracing::info!(brands = count, "brand registry seeded");
    Ok(count)
}
