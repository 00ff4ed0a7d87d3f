//! Postgres-backed brand store and mention sink for the crawler.

use async_trait::async_trait;
use batcave_core::{BrandRecord, PersistedMention};
use batcave_crawler::{BrandStore, CrawlError, MentionSink};
use sqlx::PgPool;

use crate::{brands, mentions, DbError};

/// One pool serving both the crawler's brand reloads and its mention appends.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: DbError) -> CrawlError {
    CrawlError::StoreUnavailable(err.to_string())
}

#[async_trait]
impl BrandStore for PgStore {
    async fn load_brands(&self) -> Result<Vec<BrandRecord>, CrawlError> {
        let rows = brands::list_brands(&self.pool).await.map_err(unavailable)?;
        Ok(rows.into_iter().map(BrandRecord::from).collect())
    }
}

#[async_trait]
impl MentionSink for PgStore {
    async fn append_mention(&self, mention: &PersistedMention) -> Result<(), CrawlError> {
        mentions::insert_mention(&self.pool, mention)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_surface_as_store_unavailable() {
        let err = unavailable(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        assert!(
            matches!(err, CrawlError::StoreUnavailable(ref msg) if msg.contains("timed out")),
            "got: {err:?}"
        );
    }
}
