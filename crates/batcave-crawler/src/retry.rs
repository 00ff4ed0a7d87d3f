//! Retry with exponential back-off and jitter for feed page fetches.
//!
//! Only transient failures are retried. Anything else, and anything still
//! failing once retries are exhausted, goes back to the walker, which
//! abandons the brand for this sweep.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: network failures (timeout, connect, transport), 429, and 5xx.
/// Not retriable: other statuses, bad JSON, bad URLs.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.is_request()
                || e.status().is_some_and(|s| s.is_server_error())
        }
        FetchError::RateLimited { .. } => true,
        FetchError::UnexpectedStatus { status, .. } => *status >= 500,
        FetchError::Deserialize { .. } | FetchError::InvalidUrl { .. } => false,
    }
}

/// How long to wait before retry number `attempt` (1-based).
///
/// A rate-limited response is retried after the wait the feed asked for.
/// Anything else backs off `backoff_base_ms * 2^(attempt-1)`, capped at
/// 30 s, with ±25 % jitter so parallel walks do not retry in lockstep.
pub(crate) fn retry_delay(err: &FetchError, attempt: u32, backoff_base_ms: u64) -> Duration {
    if let FetchError::RateLimited { retry_after_secs } = err {
        return Duration::from_secs(*retry_after_secs);
    }
    let exponent = attempt.saturating_sub(1).min(10);
    let capped = backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (0.75 + rand::random::<f64>() * 0.5)) as u64;
    Duration::from_millis(jittered)
}

/// Runs one page fetch, retrying transient failures up to `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut fetch: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match fetch().await {
            Ok(value) => return Ok(value),
            Err(err) if retries < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        retries += 1;
        let delay = retry_delay(&err, retries, backoff_base_ms);
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "feed fetch failed; retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
