//! Database operations for the `mentions` table.

use batcave_core::PersistedMention;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `mentions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MentionRow {
    pub id: i64,
    pub brand_name: String,
    pub timestamp: i64,
    pub source: String,
    pub text: String,
    pub source_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Appends one mention. Mentions are never updated or deduplicated here.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_mention(pool: &PgPool, mention: &PersistedMention) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO mentions (brand_name, timestamp, source, text, source_link) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(&mention.name)
    .bind(mention.timestamp)
    .bind(&mention.source)
    .bind(&mention.text)
    .bind(&mention.source_link)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Number of mentions stored for `brand_name`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_mentions_for_brand(pool: &PgPool, brand_name: &str) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mentions WHERE brand_name = $1")
        .bind(brand_name)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// The newest `limit` mentions for `brand_name`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_mentions(
    pool: &PgPool,
    brand_name: &str,
    limit: i64,
) -> Result<Vec<MentionRow>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(
        "SELECT id, brand_name, timestamp, source, text, source_link, created_at \
         FROM mentions \
         WHERE brand_name = $1 \
         ORDER BY timestamp DESC, id DESC \
         LIMIT $2",
    )
    .bind(brand_name)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
