//! Command handlers for crawling and managing the brand registry.

use std::path::Path;
use std::sync::Arc;

use batcave_core::AppConfig;
use batcave_crawler::{CrawlDriver, CrawlSettings, GraphClient};
use batcave_db::PgStore;

/// Crawls until Ctrl-C / SIGTERM, or for a single sweep when `once` is set.
///
/// # Errors
///
/// Returns an error if the feed client cannot be constructed. Failures inside
/// a sweep are logged by the driver and never end the loop.
pub(crate) async fn run_crawl(
    pool: sqlx::PgPool,
    config: &AppConfig,
    once: bool,
) -> anyhow::Result<()> {
    let source = GraphClient::from_app_config(config)?;
    let store = Arc::new(PgStore::new(pool));
    let settings = CrawlSettings::from_app_config(config);
    tracing::info!(
        feed = %config.feed_base_url,
        interval_secs = config.crawl_interval_secs,
        max_additional_pages = settings.max_additional_pages,
        max_concurrent_brands = settings.max_concurrent_brands,
        "crawler starting"
    );

    let mut driver = CrawlDriver::new(Arc::clone(&store), source, store, settings);
    if once {
        let report = driver.run_sweep().await;
        println!(
            "swept {} brands: {} crawled, {} failed, {} pages, {} new mentions",
            report.brands,
            report.crawled,
            report.failed,
            report.pages_fetched,
            report.mentions_emitted
        );
    } else {
        driver.run(shutdown_signal()).await;
    }
    Ok(())
}

pub(crate) async fn print_brands(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let brands = batcave_db::list_brands(pool).await?;
    if brands.is_empty() {
        println!("no brands registered; run `batcave seed` first");
        return Ok(());
    }
    for brand in brands {
        let mentions = batcave_db::count_mentions_for_brand(pool, &brand.name).await?;
        if brand.aliases.is_empty() {
            println!("{}\t{mentions} mentions", brand.name);
        } else {
            println!(
                "{}\t{mentions} mentions\taliases: {}",
                brand.name,
                brand.aliases.join(", ")
            );
        }
    }
    Ok(())
}

pub(crate) async fn print_recent_mentions(
    pool: &sqlx::PgPool,
    brand: &str,
    limit: i64,
) -> anyhow::Result<()> {
    let mentions = batcave_db::list_recent_mentions(pool, brand, limit.max(0)).await?;
    if mentions.is_empty() {
        println!("no mentions stored for {brand}");
        return Ok(());
    }
    for mention in mentions {
        println!(
            "{}\t{}\t{}",
            format_timestamp(mention.timestamp),
            mention.source,
            mention.text
        );
    }
    Ok(())
}

/// RFC 3339 in UTC, or the raw seconds if they fall outside chrono's range.
fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map_or_else(|| secs.to_string(), |t| t.to_rfc3339())
}

/// Validates the YAML brand file at `path` and upserts it.
///
/// # Errors
///
/// Returns an error if the file fails to load or validate, or the upsert fails.
pub(crate) async fn seed_from_file(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let file = batcave_core::load_brands(path)?;
    let count = batcave_db::seed_brands(pool, &file.brands).await?;
    println!("seeded {count} brands from {}", path.display());
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, finishing current sweep");
}
