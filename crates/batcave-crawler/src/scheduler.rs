//! Brand fairness queue.
//!
//! Brands come out oldest-crawled-first. Every completed crawl pushes the
//! brand back with a `last_crawled_at` of at least the wall clock, so each
//! brand is crawled once per sweep and none is starved.

use batcave_core::BrandRecord;

use crate::error::CrawlError;
use crate::heap::MinQueue;
use crate::types::Brand;

/// What [`BrandScheduler::reload`] did with a new registry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Same number of brands; the existing queue and its state were kept.
    Kept,
    /// Brand count changed; the queue was rebuilt from scratch.
    Rebuilt { brands: usize },
}

#[derive(Default)]
pub struct BrandScheduler {
    queue: MinQueue<Brand>,
}

impl BrandScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A scheduler holding every record as a never-crawled brand.
    #[must_use]
    pub fn from_records(records: Vec<BrandRecord>) -> Self {
        Self {
            queue: records.into_iter().map(Brand::new).collect(),
        }
    }

    /// Removes the most overdue brand.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::EmptyQueue`] when no brands remain.
    pub fn pop_next_brand(&mut self) -> Result<Brand, CrawlError> {
        self.queue.pop().ok_or(CrawlError::EmptyQueue)
    }

    pub fn push_brand(&mut self, brand: Brand) {
        self.queue.push(brand);
    }

    /// Replaces the working set with `records`.
    ///
    /// A snapshot with the same number of brands as the queue keeps the
    /// current queue, accumulated crawl state included. Any other size
    /// rebuilds every brand from zero.
    pub fn reload(&mut self, records: Vec<BrandRecord>) -> ReloadOutcome {
        if records.len() == self.queue.len() {
            return ReloadOutcome::Kept;
        }

        let brands = records.len();
        *self = Self::from_records(records);
        ReloadOutcome::Rebuilt { brands }
    }

    /// Removes every brand in crawl order.
    pub fn drain_sweep(&mut self) -> Vec<Brand> {
        let mut sweep = Vec::with_capacity(self.queue.len());
        while let Ok(brand) = self.pop_next_brand() {
            sweep.push(brand);
        }
        sweep
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued brands, most overdue first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<&Brand> {
        let mut brands: Vec<&Brand> = self.queue.iter().collect();
        brands.sort_by_key(|b| b.last_crawled_at);
        brands
    }
}
