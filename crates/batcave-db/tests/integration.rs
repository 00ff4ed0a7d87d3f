//! Offline unit tests for batcave-db pool configuration and row types.
//! These tests do not require a live database connection.

use batcave_core::{AppConfig, BrandRecord, Environment};
use batcave_db::{BrandRow, PoolConfig};
use chrono::Utc;
use std::path::PathBuf;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        brands_path: PathBuf::from("./config/brands.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        crawl_interval_secs: 5,
        max_additional_pages: 4,
        page_limit: 100,
        max_concurrent_brands: 1,
        feed_base_url: "https://graph.facebook.com".to_string(),
        feed_source: "facebook".to_string(),
        feed_access_token: None,
        request_timeout_secs: 30,
        user_agent: "ua".to_string(),
        max_retries: 2,
        retry_backoff_base_ms: 500,
        reload_backoff_max_secs: 300,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn brand_row_converts_to_registry_record() {
    let row = BrandRow {
        id: 1,
        name: "Acme".to_string(),
        aliases: vec!["ACME Corp".to_string()],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let record = BrandRecord::from(row);

    assert_eq!(record.name, "Acme");
    assert_eq!(record.aliases, vec!["ACME Corp".to_string()]);
}
