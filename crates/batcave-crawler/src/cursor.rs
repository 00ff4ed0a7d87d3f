//! Next-page cursors.
//!
//! A cursor is the opaque next-page URL returned by the feed. The only part
//! the crawler reads is its depth: the integer `until` query parameter, the
//! timestamp boundary below which the next page's results lie.
//!
//! ```text
//! https://graph.facebook.com/search?q=acme&type=post&limit=100&until=1367366400
//! ```

use reqwest::Url;

use crate::error::MalformedRecord;

const DEPTH_PARAM: &str = "until";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The depth timestamp embedded in the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord::CursorDepth`] if there is no `until`
    /// parameter or its value is not an integer.
    pub fn depth(&self) -> Result<i64, MalformedRecord> {
        Url::parse(&self.0)
            .ok()
            .and_then(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == DEPTH_PARAM)
                    .and_then(|(_, value)| value.parse::<i64>().ok())
            })
            .ok_or_else(|| MalformedRecord::CursorDepth(self.0.clone()))
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
