use batcave_core::{BrandRecord, PersistedMention};

use crate::cursor::Cursor;
use crate::heap::Prioritized;
use crate::walker::WalkOutcome;

/// A brand plus its crawl bookkeeping.
///
/// Owned by exactly one holder at a time: the scheduler's queue, or the walk
/// currently in flight for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brand {
    pub name: String,
    pub aliases: Vec<String>,
    /// Unix seconds. High-water mark of the newest mention seen, raised to the
    /// wall clock after every completed cycle. Never decreases.
    pub last_crawled_at: i64,
    /// Deepest cursor depth (an `until` timestamp) walked so far.
    pub searched_depth: i64,
    /// Completed crawl cycles.
    pub pass_count: u32,
}

impl Brand {
    /// A never-crawled brand: zero high-water mark, zero depth, pass 0.
    #[must_use]
    pub fn new(record: BrandRecord) -> Self {
        Self {
            name: record.name,
            aliases: record.aliases,
            last_crawled_at: 0,
            searched_depth: 0,
            pass_count: 0,
        }
    }

    /// 1-based number of the cycle currently being walked.
    #[must_use]
    pub fn current_pass(&self) -> u32 {
        self.pass_count + 1
    }

    /// Commits a completed walk.
    ///
    /// `last_crawled_at` becomes the newest of the prior mark, the newest
    /// mention the walk saw, and `now`; a brand that produced nothing still
    /// moves to the back of the queue.
    pub fn commit(&mut self, outcome: &WalkOutcome, now: i64) {
        self.searched_depth = self.searched_depth.max(outcome.searched_depth);
        self.last_crawled_at = self
            .last_crawled_at
            .max(outcome.newest_mention)
            .max(now);
        self.pass_count += 1;
    }
}

impl Prioritized for Brand {
    type Key = i64;

    fn priority(&self) -> i64 {
        self.last_crawled_at
    }
}

/// One record as extracted from a result page, fields still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub text: String,
    pub id: String,
    pub time: String,
}

impl RawRecord {
    #[must_use]
    pub fn new(text: impl Into<String>, id: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            id: id.into(),
            time: time.into(),
        }
    }
}

/// A decoded mention, alive only while a page is being normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub text: String,
    /// Upstream post id; `0` when the id could not be parsed.
    pub id: i64,
    /// Unix seconds.
    pub timestamp: i64,
}

impl Mention {
    #[must_use]
    pub fn into_persisted(self, brand: &str, source: &str) -> PersistedMention {
        PersistedMention {
            name: brand.to_string(),
            timestamp: self.timestamp,
            source: source.to_string(),
            text: self.text,
            source_link: None,
        }
    }
}

/// One fetched page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<RawRecord>,
    pub next_cursor: Option<Cursor>,
}

/// What to search for and how many records per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub limit: u32,
}

impl SearchQuery {
    #[must_use]
    pub fn for_brand(brand: &Brand, limit: u32) -> Self {
        Self {
            term: brand.name.clone(),
            limit,
        }
    }
}
