//! Crawl cycle driver.
//!
//! One sweep: reload the brand registry, drain the scheduler in fairness
//! order, walk every brand, and commit and push back each brand the moment
//! its own walk ends.
//! [`CrawlDriver::run`] repeats sweeps with a short sleep in between until
//! the shutdown future resolves.

use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::error::CrawlError;
use crate::normalize::MentionNormalizer;
use crate::scheduler::{BrandScheduler, ReloadOutcome};
use crate::settings::CrawlSettings;
use crate::source::{BrandStore, MentionSink, PageSource};
use crate::walker::PaginationWalker;

/// Totals for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub brands: usize,
    pub crawled: usize,
    pub failed: usize,
    pub pages_fetched: usize,
    pub mentions_emitted: usize,
    /// The registry reload failed and the previous snapshot was crawled.
    pub stale_registry: bool,
}

pub struct CrawlDriver<B, P, S> {
    store: B,
    source: P,
    sink: S,
    scheduler: BrandScheduler,
    normalizer: MentionNormalizer,
    settings: CrawlSettings,
    reload_failures: u32,
}

impl<B, P, S> CrawlDriver<B, P, S>
where
    B: BrandStore,
    P: PageSource,
    S: MentionSink,
{
    #[must_use]
    pub fn new(store: B, source: P, sink: S, settings: CrawlSettings) -> Self {
        Self {
            store,
            source,
            sink,
            scheduler: BrandScheduler::new(),
            normalizer: MentionNormalizer::new(settings.feed_source.clone()),
            settings,
            reload_failures: 0,
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &BrandScheduler {
        &self.scheduler
    }

    /// Consecutive failed brand reloads.
    #[must_use]
    pub fn reload_failures(&self) -> u32 {
        self.reload_failures
    }

    /// Refreshes the scheduler from the brand store.
    ///
    /// On failure the current snapshot stays in place and the failure is
    /// counted towards the inter-sweep backoff.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::StoreUnavailable`] if the store cannot be reached.
    pub async fn reload(&mut self) -> Result<ReloadOutcome, CrawlError> {
        match self.store.load_brands().await {
            Ok(records) => {
                self.reload_failures = 0;
                let outcome = self.scheduler.reload(records);
                if let ReloadOutcome::Rebuilt { brands } = outcome {
                    tracing::info!(brands, "brand registry changed; scheduler rebuilt");
                }
                Ok(outcome)
            }
            Err(e) => {
                self.reload_failures = self.reload_failures.saturating_add(1);
                tracing::warn!(
                    error = %e,
                    failures = self.reload_failures,
                    brands = self.scheduler.len(),
                    "brand reload failed; keeping last snapshot"
                );
                Err(e)
            }
        }
    }

    /// Runs one full sweep over every brand.
    pub async fn run_sweep(&mut self) -> SweepReport {
        let mut report = SweepReport {
            stale_registry: self.reload().await.is_err(),
            ..SweepReport::default()
        };

        let sweep = self.scheduler.drain_sweep();
        report.brands = sweep.len();
        tracing::info!(brands = report.brands, "sweep started");

        let walker = PaginationWalker::new(
            &self.source,
            &self.sink,
            &self.normalizer,
            self.settings.max_additional_pages,
            self.settings.page_limit,
        );
        let scheduler = &mut self.scheduler;
        let mut walks = stream::iter(sweep)
            .map(|brand| {
                let walker = &walker;
                async move {
                    let result = walker.walk(&brand).await;
                    let finished_at = chrono::Utc::now().timestamp();
                    (brand, result, finished_at)
                }
            })
            .buffer_unordered(self.settings.max_concurrent_brands.max(1));

        // Each brand is committed as soon as its own walk ends; later walks
        // in the sweep must not push its mark past mentions they overlap.
        while let Some((mut brand, result, finished_at)) = walks.next().await {
            match result {
                Ok(outcome) => {
                    brand.commit(&outcome, finished_at);
                    report.crawled += 1;
                    report.pages_fetched += outcome.pages_fetched;
                    report.mentions_emitted += outcome.mentions_emitted;
                    tracing::info!(
                        brand = %brand.name,
                        pass = brand.pass_count,
                        pages = outcome.pages_fetched,
                        mentions = outcome.mentions_emitted,
                        stop = ?outcome.stop,
                        "brand crawled"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        brand = %brand.name,
                        error = %e,
                        "brand walk abandoned; state left uncommitted"
                    );
                }
            }
            scheduler.push_brand(brand);
        }

        tracing::info!(
            brands = report.brands,
            crawled = report.crawled,
            failed = report.failed,
            mentions = report.mentions_emitted,
            "sweep finished"
        );
        report
    }

    /// Sweeps forever, sleeping between sweeps, until `shutdown` resolves.
    ///
    /// Shutdown is observed between sweeps and during the sleep; a sweep in
    /// progress always runs to completion.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            self.run_sweep().await;

            let delay = self.settings.sweep_delay(self.reload_failures);
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("crawl loop stopping");
                    return;
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}
