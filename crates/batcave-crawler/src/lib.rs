//! Brand mention crawler.
//!
//! Rotates through the brand registry oldest-crawled-first, walks a bounded
//! number of feed-search result pages per brand, and forwards mentions newer
//! than each brand's high-water mark to the mention store exactly once.

pub mod cursor;
pub mod driver;
pub mod error;
pub mod graph;
pub mod heap;
pub mod normalize;
pub mod scheduler;
pub mod settings;
pub mod source;
pub mod types;
pub mod walker;

mod retry;

#[cfg(test)]
mod testing;

pub use cursor::Cursor;
pub use driver::{CrawlDriver, SweepReport};
pub use error::{CrawlError, FetchError, MalformedRecord};
pub use graph::GraphClient;
pub use heap::{MinQueue, Prioritized};
pub use normalize::{HighWaterMark, MentionNormalizer, NormalizedPage};
pub use scheduler::{BrandScheduler, ReloadOutcome};
pub use settings::CrawlSettings;
pub use source::{BrandStore, MentionSink, PageSource};
pub use types::{Brand, Mention, Page, RawRecord, SearchQuery};
pub use walker::{PaginationWalker, StopReason, WalkOutcome};
