use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("BATCAVE_ENV", "development"));
    let log_level = or_default("BATCAVE_LOG_LEVEL", "info");
    let brands_path = PathBuf::from(or_default("BATCAVE_BRANDS_PATH", "./config/brands.yaml"));

    let db_max_connections = parse_u32("BATCAVE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BATCAVE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BATCAVE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let crawl_interval_secs = parse_u64("BATCAVE_CRAWL_INTERVAL_SECS", "5")?;
    let max_additional_pages = parse_usize("BATCAVE_MAX_ADDITIONAL_PAGES", "4")?;
    let page_limit = parse_u32("BATCAVE_PAGE_LIMIT", "100")?;
    if page_limit == 0 {
        return Err(invalid("BATCAVE_PAGE_LIMIT", "must be at least 1".to_string()));
    }
    let max_concurrent_brands = parse_usize("BATCAVE_MAX_CONCURRENT_BRANDS", "1")?;
    if max_concurrent_brands == 0 {
        return Err(invalid(
            "BATCAVE_MAX_CONCURRENT_BRANDS",
            "must be at least 1".to_string(),
        ));
    }

    let feed_base_url = or_default("BATCAVE_FEED_BASE_URL", "https://graph.facebook.com");
    if !(feed_base_url.starts_with("http://") || feed_base_url.starts_with("https://")) {
        return Err(invalid(
            "BATCAVE_FEED_BASE_URL",
            format!("\"{feed_base_url}\" is not an http(s) URL"),
        ));
    }
    let feed_source = or_default("BATCAVE_FEED_SOURCE", "facebook");
    let feed_access_token = lookup("BATCAVE_FEED_ACCESS_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let request_timeout_secs = parse_u64("BATCAVE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BATCAVE_USER_AGENT", "batcave/0.1 (brand-mentions)");
    let max_retries = parse_u32("BATCAVE_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("BATCAVE_RETRY_BACKOFF_BASE_MS", "500")?;
    let reload_backoff_max_secs = parse_u64("BATCAVE_RELOAD_BACKOFF_MAX_SECS", "300")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        brands_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        crawl_interval_secs,
        max_additional_pages,
        page_limit,
        max_concurrent_brands,
        feed_base_url,
        feed_source,
        feed_access_token,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        reload_backoff_max_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
