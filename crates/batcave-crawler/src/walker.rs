//! Depth-limited pagination walk for one brand.
//!
//! Per page:
//! 1. fetch it (first page without a cursor, later pages by cursor);
//! 2. stop if it has no next cursor or the page index exceeds
//!    `max_additional_pages`;
//! 3. read the next cursor's depth; from the second pass on, stop if a prior
//!    cycle already walked that deep;
//! 4. raise the walk's searched depth, normalize and emit the page's records,
//!    and stop if they reached previously seen mentions.
//!
//! The walk never touches the brand. Everything it learns is returned in a
//! [`WalkOutcome`] which the caller commits only once the walk has finished.

use crate::cursor::Cursor;
use crate::error::CrawlError;
use crate::normalize::{HighWaterMark, MentionNormalizer};
use crate::source::{MentionSink, PageSource};
use crate::types::{Brand, SearchQuery};

/// Why a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last fetched page had no next cursor.
    Exhausted,
    /// The page ceiling was reached.
    PageLimit,
    /// A prior cycle already walked this deep.
    AlreadySearched { depth: i64 },
    /// The next cursor carried no readable depth.
    MalformedCursor,
    /// Records reached the brand's high-water mark.
    ReachedSeen,
}

/// Everything a finished walk learned about a brand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    pub pages_fetched: usize,
    pub mentions_emitted: usize,
    /// Deepest cursor depth walked, never below the brand's prior value.
    pub searched_depth: i64,
    /// Newest mention timestamp seen, never below the brand's prior mark.
    pub newest_mention: i64,
    pub stop: StopReason,
}

pub struct PaginationWalker<'a, P: ?Sized, S: ?Sized> {
    source: &'a P,
    sink: &'a S,
    normalizer: &'a MentionNormalizer,
    max_additional_pages: usize,
    page_limit: u32,
}

impl<'a, P, S> PaginationWalker<'a, P, S>
where
    P: PageSource + ?Sized,
    S: MentionSink + ?Sized,
{
    #[must_use]
    pub fn new(
        source: &'a P,
        sink: &'a S,
        normalizer: &'a MentionNormalizer,
        max_additional_pages: usize,
        page_limit: u32,
    ) -> Self {
        Self {
            source,
            sink,
            normalizer,
            max_additional_pages,
            page_limit,
        }
    }

    /// Walks `brand`'s result pages, emitting new mentions to the sink.
    ///
    /// At most `max_additional_pages + 1` pages are fetched.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Fetch`] if a page cannot be fetched and
    /// [`CrawlError::StoreUnavailable`] if a mention cannot be appended. The
    /// brand must then be left uncommitted; mentions already appended will be
    /// offered again on its next walk.
    pub async fn walk(&self, brand: &Brand) -> Result<WalkOutcome, CrawlError> {
        let query = SearchQuery::for_brand(brand, self.page_limit);
        let pass = brand.current_pass();
        let mut mark = HighWaterMark::new(brand.last_crawled_at);
        let mut searched_depth = brand.searched_depth;
        let mut cursor: Option<Cursor> = None;
        let mut pages_fetched = 0usize;
        let mut mentions_emitted = 0usize;

        let stop = loop {
            let page = self.source.fetch_page(&query, cursor.as_ref()).await?;
            pages_fetched += 1;
            tracing::debug!(
                brand = %brand.name,
                pass,
                page = pages_fetched,
                records = page.records.len(),
                "fetched result page"
            );

            let Some(next) = page.next_cursor else {
                break StopReason::Exhausted;
            };
            if pages_fetched > self.max_additional_pages {
                break StopReason::PageLimit;
            }

            let depth = match next.depth() {
                Ok(depth) => depth,
                Err(e) => {
                    tracing::warn!(brand = %brand.name, error = %e, "stopping pagination on malformed cursor");
                    break StopReason::MalformedCursor;
                }
            };
            if pass > 1 && brand.searched_depth >= depth {
                break StopReason::AlreadySearched { depth };
            }
            searched_depth = searched_depth.max(depth);

            let normalized = self
                .normalizer
                .normalize_page(&brand.name, &page.records, &mut mark);
            for mention in &normalized.mentions {
                self.sink.append_mention(mention).await?;
                mentions_emitted += 1;
            }
            if normalized.reached_seen {
                break StopReason::ReachedSeen;
            }

            cursor = Some(next);
        };

        Ok(WalkOutcome {
            pages_fetched,
            mentions_emitted,
            searched_depth,
            newest_mention: mark.newest(),
            stop,
        })
    }
}

#[cfg(test)]
#[path = "walker_test.rs"]
mod tests;
