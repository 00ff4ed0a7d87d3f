//! In-memory fakes of the crawler's external capabilities.
//!
//! ScriptedFeed  - serves a fixed list of pages; cursors point at page indexes.
//! EndlessFeed   - every page has a next cursor; for page-ceiling tests.
//! RecordingSink - keeps appended mentions; can be switched to fail.
//! FixedStore    - serves a brand list; can be switched to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use batcave_core::{BrandRecord, PersistedMention};
use chrono::DateTime;

use crate::cursor::Cursor;
use crate::error::{CrawlError, FetchError};
use crate::source::{BrandStore, MentionSink, PageSource};
use crate::types::{Page, RawRecord, SearchQuery};

/// Wire timestamp for `secs` past the Unix epoch.
pub(crate) fn wire(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .unwrap()
        .format("%Y-%m-%dT%H:%M:%S+0000")
        .to_string()
}

/// Records with the given timestamps, newest first as the feed returns them.
pub(crate) fn records(timestamps: &[i64]) -> Vec<RawRecord> {
    timestamps
        .iter()
        .map(|ts| RawRecord::new(format!("mention at {ts}"), ts.to_string(), wire(*ts)))
        .collect()
}

fn cursor_to(page: usize, until: i64) -> Cursor {
    Cursor::new(format!("https://feed.test/search?page={page}&until={until}"))
}

fn page_index(cursor: &Cursor) -> usize {
    cursor
        .as_str()
        .split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|v| v.parse().ok())
        .unwrap()
}

/// A feed of fixed pages per search term.
#[derive(Default)]
pub(crate) struct ScriptedFeed {
    pages: HashMap<String, Vec<Page>>,
    failing: Mutex<Vec<String>>,
    fetches: AtomicUsize,
}

impl ScriptedFeed {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds `term`'s pages. Each entry is `(record timestamps, next depth)`;
    /// a `Some` depth links to the following entry.
    pub(crate) fn with_brand(mut self, term: &str, pages: Vec<(Vec<i64>, Option<i64>)>) -> Self {
        let built = pages
            .into_iter()
            .enumerate()
            .map(|(i, (timestamps, until))| Page {
                records: records(&timestamps),
                next_cursor: until.map(|u| cursor_to(i + 1, u)),
            })
            .collect();
        self.pages.insert(term.to_string(), built);
        self
    }

    /// Replaces one page's next cursor with `raw`.
    pub(crate) fn with_raw_cursor(mut self, term: &str, page: usize, raw: &str) -> Self {
        if let Some(pages) = self.pages.get_mut(term) {
            pages[page].next_cursor = Some(Cursor::new(raw));
        }
        self
    }

    pub(crate) fn fail_brand(&self, term: &str) {
        self.failing.lock().unwrap().push(term.to_string());
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for ScriptedFeed {
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        cursor: Option<&Cursor>,
    ) -> Result<Page, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&query.term) {
            return Err(FetchError::UnexpectedStatus {
                status: 503,
                url: format!("https://feed.test/search?q={}", query.term),
            });
        }
        let index = cursor.map_or(0, page_index);
        Ok(self
            .pages
            .get(&query.term)
            .and_then(|pages| pages.get(index))
            .cloned()
            .unwrap_or_default())
    }
}

/// A feed that never runs out of pages. Every page holds one fresh record.
pub(crate) struct EndlessFeed {
    newest: i64,
    fetches: AtomicUsize,
}

impl EndlessFeed {
    pub(crate) fn new(newest: i64) -> Self {
        Self {
            newest,
            fetches: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for EndlessFeed {
    async fn fetch_page(
        &self,
        _query: &SearchQuery,
        _cursor: Option<&Cursor>,
    ) -> Result<Page, FetchError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        let step = i64::try_from(n).unwrap();
        let ts = self.newest - step * 100;
        Ok(Page {
            records: records(&[ts]),
            next_cursor: Some(cursor_to(n + 1, ts - 50)),
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    mentions: Mutex<Vec<PersistedMention>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn mentions(&self) -> Vec<PersistedMention> {
        self.mentions.lock().unwrap().clone()
    }

    pub(crate) fn timestamps_for(&self, brand: &str) -> Vec<i64> {
        self.mentions()
            .iter()
            .filter(|m| m.name == brand)
            .map(|m| m.timestamp)
            .collect()
    }
}

#[async_trait]
impl MentionSink for RecordingSink {
    async fn append_mention(&self, mention: &PersistedMention) -> Result<(), CrawlError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CrawlError::StoreUnavailable("sink offline".to_string()));
        }
        self.mentions.lock().unwrap().push(mention.clone());
        Ok(())
    }
}

pub(crate) struct FixedStore {
    brands: Mutex<Option<Vec<BrandRecord>>>,
}

impl FixedStore {
    pub(crate) fn new(names: &[&str]) -> Self {
        Self {
            brands: Mutex::new(Some(names.iter().map(|n| BrandRecord::new(*n)).collect())),
        }
    }

    pub(crate) fn set_brands(&self, names: &[&str]) {
        *self.brands.lock().unwrap() = Some(names.iter().map(|n| BrandRecord::new(*n)).collect());
    }

    pub(crate) fn set_unavailable(&self) {
        *self.brands.lock().unwrap() = None;
    }
}

#[async_trait]
impl BrandStore for FixedStore {
    async fn load_brands(&self) -> Result<Vec<BrandRecord>, CrawlError> {
        self.brands
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CrawlError::StoreUnavailable("brand store offline".to_string()))
    }
}
