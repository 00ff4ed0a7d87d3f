//! HTTP client for a Graph-style public post search endpoint.
//!
//! The first page of a brand's results is requested from `{base}/search`;
//! every later page is requested by following the `paging.next` URL the
//! previous response returned, unchanged.

mod parse;

use std::time::Duration;

use async_trait::async_trait;
use batcave_core::AppConfig;
use reqwest::{Client, Url};

use crate::cursor::Cursor;
use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::source::PageSource;
use crate::types::{Page, SearchQuery};

/// Fields requested for every post.
const POST_FIELDS: &str = "message,created_time";

/// Seconds to wait when a 429 carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Feed client implementing [`PageSource`].
pub struct GraphClient {
    client: Client,
    search_url: Url,
    access_token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GraphClient {
    /// Creates a client against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FetchError::InvalidUrl`] if `base_url`
    /// does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        access_token: Option<String>,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let raw = format!("{}/search", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            search_url,
            access_token,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Creates a client from the `BATCAVE_FEED_*` and request settings.
    ///
    /// # Errors
    ///
    /// See [`GraphClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::new(
            &config.feed_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.feed_access_token.clone(),
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// First-page URL for `query`, with every parameter percent-encoded.
    #[must_use]
    pub fn search_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("fields", POST_FIELDS);
            pairs.append_pair("q", &query.term);
            pairs.append_pair("type", "post");
            pairs.append_pair("limit", &query.limit.to_string());
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }
        url
    }

    fn page_url(&self, query: &SearchQuery, cursor: Option<&Cursor>) -> Result<Url, FetchError> {
        match cursor {
            None => Ok(self.search_url(query)),
            Some(cursor) => Url::parse(cursor.as_str()).map_err(|e| FetchError::InvalidUrl {
                url: cursor.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Sends one GET and maps the response status.
    ///
    /// 429 becomes [`FetchError::RateLimited`]; any other non-2xx becomes
    /// [`FetchError::UnexpectedStatus`].
    async fn get_once(&self, url: &Url) -> Result<Page, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(FetchError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact_token(url),
            });
        }

        let body = response.text().await?;
        parse::parse_search_page(&body, &redact_token(url))
    }
}

#[async_trait]
impl PageSource for GraphClient {
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        cursor: Option<&Cursor>,
    ) -> Result<Page, FetchError> {
        let url = self.page_url(query, cursor)?;
        tracing::debug!(term = %query.term, url = %redact_token(&url), "fetching search page");
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.get_once(&url)).await
    }
}

/// URL text safe for logs and error messages.
fn redact_token(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "access_token") {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" {
                "[redacted]".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str, token: Option<&str>) -> GraphClient {
        GraphClient::new(base_url, 30, "batcave-test", token.map(str::to_string), 0, 0)
            .expect("client construction should not fail")
    }

    #[test]
    fn search_url_encodes_brand_name() {
        let client = client("https://graph.facebook.com/", None);
        let url = client.search_url(&SearchQuery {
            term: "Acme & Sons".to_string(),
            limit: 100,
        });
        assert_eq!(
            url.as_str(),
            "https://graph.facebook.com/search?fields=message%2Ccreated_time&q=Acme+%26+Sons&type=post&limit=100"
        );
    }

    #[test]
    fn search_url_appends_access_token() {
        let client = client("https://graph.facebook.com", Some("abc"));
        let url = client.search_url(&SearchQuery {
            term: "acme".to_string(),
            limit: 5,
        });
        assert!(url.as_str().ends_with("&limit=5&access_token=abc"), "{url}");
    }

    #[test]
    fn cursor_url_is_followed_verbatim() {
        let client = client("https://graph.facebook.com", None);
        let cursor = Cursor::new("https://graph.facebook.com/search?q=acme&until=1367366400");
        let query = SearchQuery {
            term: "acme".to_string(),
            limit: 100,
        };
        let url = client.page_url(&query, Some(&cursor)).unwrap();
        assert_eq!(url.as_str(), cursor.as_str());
    }

    #[test]
    fn unparseable_cursor_is_invalid_url() {
        let client = client("https://graph.facebook.com", None);
        let query = SearchQuery {
            term: "acme".to_string(),
            limit: 100,
        };
        let err = client
            .page_url(&query, Some(&Cursor::new("not a url")))
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let result = GraphClient::new("not a url", 30, "batcave-test", None, 0, 0);
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn redacts_access_token() {
        let url = Url::parse("https://graph.test/search?q=acme&access_token=secret").unwrap();
        let shown = redact_token(&url);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("q=acme"));
    }
}
