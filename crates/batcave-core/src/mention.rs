//! Records exchanged with the external brand/mention store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A brand as the registry stores it: identity plus informational aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRecord {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl BrandRecord {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }
}

/// A mention in the shape the store persists it.
///
/// Once handed to the store the crawler never touches it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMention {
    /// Brand the mention was collected for.
    pub name: String,
    /// Unix seconds at which the mention was created upstream.
    pub timestamp: i64,
    /// Feed tag, e.g. `facebook`.
    pub source: String,
    pub text: String,
    /// Permalink to the upstream post. `None` when the feed payload carries none.
    pub source_link: Option<String>,
}

impl PersistedMention {
    /// Upstream creation time as a UTC datetime, if the timestamp is in range.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}
