use std::time::Duration;

use batcave_core::AppConfig;

/// Result pages walked per brand per cycle beyond the first.
pub const DEFAULT_MAX_ADDITIONAL_PAGES: usize = 4;
/// Records requested per result page.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;
const DEFAULT_CRAWL_INTERVAL_SECS: u64 = 5;
const DEFAULT_RELOAD_BACKOFF_MAX_SECS: u64 = 300;
const DEFAULT_FEED_SOURCE: &str = "facebook";

/// Tuning for the crawl loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Sleep between sweeps.
    pub crawl_interval: Duration,
    pub max_additional_pages: usize,
    pub page_limit: u32,
    /// Brands walked at the same time within one sweep. Pages of one brand
    /// are always fetched in sequence.
    pub max_concurrent_brands: usize,
    /// Tag written as the source of every mention.
    pub feed_source: String,
    /// Upper bound on the inter-sweep sleep while brand reloads keep failing.
    pub reload_backoff_max: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            crawl_interval: Duration::from_secs(DEFAULT_CRAWL_INTERVAL_SECS),
            max_additional_pages: DEFAULT_MAX_ADDITIONAL_PAGES,
            page_limit: DEFAULT_PAGE_LIMIT,
            max_concurrent_brands: 1,
            feed_source: DEFAULT_FEED_SOURCE.to_string(),
            reload_backoff_max: Duration::from_secs(DEFAULT_RELOAD_BACKOFF_MAX_SECS),
        }
    }
}

impl CrawlSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            crawl_interval: Duration::from_secs(config.crawl_interval_secs),
            max_additional_pages: config.max_additional_pages,
            page_limit: config.page_limit,
            max_concurrent_brands: config.max_concurrent_brands.max(1),
            feed_source: config.feed_source.clone(),
            reload_backoff_max: Duration::from_secs(config.reload_backoff_max_secs),
        }
    }

    /// Sleep before the next sweep after `reload_failures` consecutive failed
    /// brand reloads: the crawl interval doubled per failure, capped.
    #[must_use]
    pub fn sweep_delay(&self, reload_failures: u32) -> Duration {
        if reload_failures == 0 {
            return self.crawl_interval;
        }
        let factor = 1u32 << reload_failures.min(16);
        self.crawl_interval
            .saturating_mul(factor)
            .min(self.reload_backoff_max.max(self.crawl_interval))
    }
}
