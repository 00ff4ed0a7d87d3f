//! Capabilities the crawler consumes from the outside world.
//!
//! BrandStore  - the brand registry, reloaded at the start of every sweep.
//! PageSource  - one page of feed-search results per call.
//! MentionSink - append-only mention store; duplicate suppression is the
//!               crawler's job, the sink may be at-least-once.

use async_trait::async_trait;
use batcave_core::{BrandRecord, PersistedMention};

use crate::cursor::Cursor;
use crate::error::{CrawlError, FetchError};
use crate::types::{Page, SearchQuery};

#[async_trait]
pub trait BrandStore: Send + Sync {
    /// The complete current brand set.
    ///
    /// Fails with [`CrawlError::StoreUnavailable`] if the store cannot be reached.
    async fn load_brands(&self) -> Result<Vec<BrandRecord>, CrawlError>;
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the first page for `query` (no cursor) or the page `cursor`
    /// points at.
    async fn fetch_page(&self, query: &SearchQuery, cursor: Option<&Cursor>)
        -> Result<Page, FetchError>;
}

#[async_trait]
pub trait MentionSink: Send + Sync {
    /// Fails with [`CrawlError::StoreUnavailable`] if the store cannot be reached.
    async fn append_mention(&self, mention: &PersistedMention) -> Result<(), CrawlError>;
}

#[async_trait]
impl<T: BrandStore + ?Sized> BrandStore for std::sync::Arc<T> {
    async fn load_brands(&self) -> Result<Vec<BrandRecord>, CrawlError> {
        (**self).load_brands().await
    }
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for std::sync::Arc<T> {
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        cursor: Option<&Cursor>,
    ) -> Result<Page, FetchError> {
        (**self).fetch_page(query, cursor).await
    }
}

#[async_trait]
impl<T: MentionSink + ?Sized> MentionSink for std::sync::Arc<T> {
    async fn append_mention(&self, mention: &PersistedMention) -> Result<(), CrawlError> {
        (**self).append_mention(mention).await
    }
}
