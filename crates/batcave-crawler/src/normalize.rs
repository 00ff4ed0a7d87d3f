//! Raw record to mention conversion and high-water-mark dedup.
//!
//! The feed is reverse-chronological. The first record on a page that is not
//! strictly newer than the brand's high-water mark (as of the start of the
//! cycle) means everything after it, on this page and later pages, was
//! already seen. Normalization reports that so the walker can stop.

use batcave_core::PersistedMention;
use chrono::DateTime;

use crate::error::MalformedRecord;
use crate::types::{Mention, RawRecord};

/// Wire format of record timestamps, e.g. `2013-05-01T12:00:00+0000`.
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Id substituted when a record's id cannot be parsed.
pub const SENTINEL_ID: i64 = 0;

/// Per-walk high-water-mark accumulator.
///
/// `prior` is the brand's mark when the walk started and is the dedup
/// threshold for the whole walk. `newest` tracks the newest timestamp seen so
/// far and is committed to the brand only after the walk completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighWaterMark {
    prior: i64,
    newest: i64,
}

impl HighWaterMark {
    #[must_use]
    pub fn new(prior: i64) -> Self {
        Self {
            prior,
            newest: prior,
        }
    }

    #[must_use]
    pub fn prior(&self) -> i64 {
        self.prior
    }

    /// Newest timestamp observed, never below `prior`.
    #[must_use]
    pub fn newest(&self) -> i64 {
        self.newest
    }

    /// Whether `timestamp` is strictly newer than the start-of-cycle mark.
    #[must_use]
    pub fn is_new(&self, timestamp: i64) -> bool {
        timestamp > self.prior
    }

    pub fn observe(&mut self, timestamp: i64) {
        self.newest = self.newest.max(timestamp);
    }
}

/// Result of normalizing one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPage {
    /// Mentions newer than the high-water mark, in page order.
    pub mentions: Vec<PersistedMention>,
    /// A record at or below the high-water mark was reached; nothing further
    /// in this walk is new.
    pub reached_seen: bool,
    /// Records dropped because their timestamp could not be parsed.
    pub skipped: usize,
}

/// Converts raw page records into persisted mentions for one feed.
#[derive(Debug, Clone)]
pub struct MentionNormalizer {
    source: String,
}

impl MentionNormalizer {
    /// `source` is the feed tag written on every mention, e.g. `facebook`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Normalizes `records` for `brand`, advancing `mark` as new mentions are
    /// found.
    ///
    /// An unparseable id is replaced by [`SENTINEL_ID`]. A record whose
    /// timestamp cannot be parsed is skipped: it can be neither emitted nor
    /// compared against the mark. Both are logged and neither stops the page.
    pub fn normalize_page(
        &self,
        brand: &str,
        records: &[RawRecord],
        mark: &mut HighWaterMark,
    ) -> NormalizedPage {
        let mut page = NormalizedPage::default();

        for record in records {
            let Some(mention) = decode(brand, record) else {
                page.skipped += 1;
                continue;
            };

            if !mark.is_new(mention.timestamp) {
                tracing::debug!(
                    brand,
                    timestamp = mention.timestamp,
                    high_water_mark = mark.prior(),
                    "reached previously seen mentions"
                );
                page.reached_seen = true;
                break;
            }

            mark.observe(mention.timestamp);
            page.mentions
                .push(mention.into_persisted(brand, &self.source));
        }

        page
    }
}

/// Decodes a raw record, logging malformed fields.
fn decode(brand: &str, record: &RawRecord) -> Option<Mention> {
    let timestamp = match parse_timestamp(&record.time) {
        Ok(ts) => ts,
        Err(e) => {
            tracing::warn!(brand, id = %record.id, error = %e, "skipping mention with malformed timestamp");
            return None;
        }
    };

    let id = parse_id(&record.id).unwrap_or_else(|e| {
        tracing::warn!(brand, error = %e, "mention id replaced with sentinel");
        SENTINEL_ID
    });

    Some(Mention {
        text: record.text.clone(),
        id,
        timestamp,
    })
}

/// Parses a record id as a 64-bit integer.
///
/// # Errors
///
/// Returns [`MalformedRecord::Id`] if `raw` is not an integer.
pub fn parse_id(raw: &str) -> Result<i64, MalformedRecord> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| MalformedRecord::Id(raw.to_string()))
}

/// Parses a wire timestamp into Unix seconds.
///
/// # Errors
///
/// Returns [`MalformedRecord::Timestamp`] if `raw` does not match
/// [`WIRE_TIME_FORMAT`].
pub fn parse_timestamp(raw: &str) -> Result<i64, MalformedRecord> {
    DateTime::parse_from_str(raw.trim(), WIRE_TIME_FORMAT)
        .map(|dt| dt.timestamp())
        .map_err(|_| MalformedRecord::Timestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wire timestamp for `secs` past the Unix epoch.
    fn wire(secs: i64) -> String {
        DateTime::from_timestamp(secs, 0)
            .unwrap()
            .format("%Y-%m-%dT%H:%M:%S+0000")
            .to_string()
    }

    fn record(text: &str, id: &str, secs: i64) -> RawRecord {
        RawRecord::new(text, id, wire(secs))
    }

    #[test]
    fn parse_timestamp_reads_wire_format() {
        assert_eq!(parse_timestamp("2013-05-01T12:00:00+0000"), Ok(1_367_409_600));
    }

    #[test]
    fn parse_timestamp_honours_offset() {
        assert_eq!(parse_timestamp("2013-05-01T14:00:00+0200"), Ok(1_367_409_600));
    }

    #[test]
    fn parse_timestamp_rejects_other_formats() {
        assert!(matches!(
            parse_timestamp("May 1 2013"),
            Err(MalformedRecord::Timestamp(_))
        ));
    }

    #[test]
    fn parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("1234"), Ok(1234));
        assert!(matches!(parse_id("12x"), Err(MalformedRecord::Id(_))));
    }

    #[test]
    fn emits_only_mentions_newer_than_mark_and_stops() {
        let normalizer = MentionNormalizer::new("facebook");
        let records = vec![
            record("newest", "1", 100),
            record("equal", "2", 80),
            record("older", "3", 50),
            record("oldest", "4", 30),
        ];
        let mut mark = HighWaterMark::new(80);

        let page = normalizer.normalize_page("Acme", &records, &mut mark);

        assert_eq!(page.mentions.len(), 1);
        assert_eq!(page.mentions[0].timestamp, 100);
        assert_eq!(page.mentions[0].text, "newest");
        assert!(page.reached_seen);
        assert_eq!(mark.newest(), 100);
        assert_eq!(mark.prior(), 80);
    }

    #[test]
    fn tags_source_and_leaves_link_unknown() {
        let normalizer = MentionNormalizer::new("facebook");
        let mut mark = HighWaterMark::new(0);
        let page = normalizer.normalize_page("Acme", &[record("hi", "7", 10)], &mut mark);

        assert!(!page.reached_seen);
        let mention = &page.mentions[0];
        assert_eq!(mention.name, "Acme");
        assert_eq!(mention.source, "facebook");
        assert!(mention.source_link.is_none());
    }

    #[test]
    fn unparseable_id_still_emits_and_continues() {
        let normalizer = MentionNormalizer::new("facebook");
        let records = vec![
            record("bad id", "not-a-number", 300),
            record("good", "9", 200),
        ];
        let mut mark = HighWaterMark::new(0);

        let page = normalizer.normalize_page("Acme", &records, &mut mark);

        assert_eq!(page.mentions.len(), 2);
        assert_eq!(page.mentions[0].text, "bad id");
        assert_eq!(page.mentions[1].text, "good");
        assert_eq!(page.skipped, 0);
    }

    #[test]
    fn unparseable_timestamp_skips_record_only() {
        let normalizer = MentionNormalizer::new("facebook");
        let records = vec![
            RawRecord::new("garbled", "1", "yesterday"),
            record("fine", "2", 200),
        ];
        let mut mark = HighWaterMark::new(100);

        let page = normalizer.normalize_page("Acme", &records, &mut mark);

        assert_eq!(page.skipped, 1);
        assert_eq!(page.mentions.len(), 1);
        assert_eq!(page.mentions[0].text, "fine");
        assert!(!page.reached_seen);
    }

    #[test]
    fn tentative_mark_tracks_maximum_across_pages() {
        let normalizer = MentionNormalizer::new("facebook");
        let mut mark = HighWaterMark::new(10);

        normalizer.normalize_page("Acme", &[record("a", "1", 50), record("b", "2", 40)], &mut mark);
        normalizer.normalize_page("Acme", &[record("c", "3", 30)], &mut mark);

        assert_eq!(mark.newest(), 50);
        assert_eq!(mark.prior(), 10);
    }

    #[test]
    fn dedup_threshold_is_the_start_of_cycle_mark() {
        let normalizer = MentionNormalizer::new("facebook");
        let mut mark = HighWaterMark::new(10);

        normalizer.normalize_page("Acme", &[record("new", "1", 50)], &mut mark);
        // 30 is below the tentative 50 but above the start-of-cycle 10.
        let page = normalizer.normalize_page("Acme", &[record("later page", "2", 30)], &mut mark);

        assert_eq!(page.mentions.len(), 1);
        assert!(!page.reached_seen);
    }
}
