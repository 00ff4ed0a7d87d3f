use thiserror::Error;

/// Failures that abort a brand walk, a reload, or a scheduler pop.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A page could not be fetched; abandons the current brand's walk only.
    #[error("feed fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The brand/mention store could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The scheduler has no brands left this sweep. Not a failure: it marks the
    /// end of a sweep.
    #[error("no brands left in the scheduler")]
    EmptyQueue,
}

/// Transport-level failures from a feed-search page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by feed (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid feed URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// A field of a raw record or cursor that could not be parsed.
///
/// Never aborts a walk: the normalizer substitutes a sentinel or skips the
/// record, and the walker stops paginating the affected brand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("unparseable mention id \"{0}\"")]
    Id(String),

    #[error("unparseable mention timestamp \"{0}\"")]
    Timestamp(String),

    #[error("cursor has no usable depth: \"{0}\"")]
    CursorDepth(String),
}
