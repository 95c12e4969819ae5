//! Cached answer records.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Paper;

/// One cached unit of work, stored under its normalized query key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Normalized query, unique per store.
    pub key: String,

    /// Raw query text, for display only.
    pub original_query: String,

    /// Generated answer, opaque to the cache.
    pub answer: String,

    /// Papers the answer was generated from.
    pub papers: Vec<Paper>,

    /// Number of cache hits served from this entry.
    #[serde(default)]
    pub usage_count: u64,

    /// Creation time. Expiry is measured from here and never refreshed.
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a fresh entry with a zero usage count.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        original_query: impl Into<String>,
        answer: impl Into<String>,
        papers: Vec<Paper>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            original_query: original_query.into(),
            answer: answer.into(),
            papers,
            usage_count: 0,
            created_at,
        }
    }

    /// Whether the entry is older than `retention` at `now`.
    #[must_use]
    pub fn is_expired(&self, retention: Duration, now: DateTime<Utc>) -> bool {
        self.is_stale(expiry_cutoff(retention, now))
    }

    /// Whether the entry was created at or before `cutoff`.
    #[must_use]
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_at <= cutoff
    }
}

/// Latest creation time that counts as expired at `now`.
///
/// Entries created at or before the cutoff are older than `retention`.
/// Retentions too long to represent never expire anything.
#[must_use]
pub fn expiry_cutoff(retention: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
    chrono::Duration::from_std(retention)
        .ok()
        .and_then(|retention| now.checked_sub_signed(retention))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// What a cache hit returns to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResult {
    /// Cached answer text.
    pub answer: String,

    /// Papers backing the answer.
    pub papers: Vec<Paper>,
}

impl From<CacheEntry> for CachedResult {
    fn from(entry: CacheEntry) -> Self {
        Self { answer: entry.answer, papers: entry.papers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn entry_at(created_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new("crispr", "What is CRISPR?", "answer", vec![], created_at)
    }

    #[test]
    fn test_new_entry_has_zero_usage() {
        let entry = entry_at(Utc::now());
        assert_eq!(entry.usage_count, 0);
        assert_eq!(entry.key, "crispr");
        assert_eq!(entry.original_query, "What is CRISPR?");
    }

    #[test]
    fn test_expiry_is_measured_from_creation() {
        let now = Utc::now();
        let retention = Duration::from_secs(30 * 24 * 3600);

        assert!(!entry_at(now).is_expired(retention, now));
        assert!(!entry_at(now - chrono::Duration::days(29)).is_expired(retention, now));
        assert!(entry_at(now - chrono::Duration::days(30)).is_expired(retention, now));
        assert!(entry_at(now - chrono::Duration::days(45)).is_expired(retention, now));
    }

    #[test]
    fn test_cutoff_matches_expiry() {
        let now = Utc::now();
        let retention = Duration::from_secs(7 * 24 * 3600);
        let cutoff = expiry_cutoff(retention, now);

        for age_days in [0, 6, 7, 8, 365] {
            let entry = entry_at(now - chrono::Duration::days(age_days));
            assert_eq!(entry.is_stale(cutoff), entry.is_expired(retention, now), "age {age_days}d");
        }
    }

    #[test]
    fn test_unrepresentable_retention_never_expires() {
        let now = Utc::now();
        assert_eq!(expiry_cutoff(Duration::MAX, now), DateTime::<Utc>::MIN_UTC);
        assert!(!entry_at(now - chrono::Duration::days(10_000)).is_expired(Duration::MAX, now));
    }

    #[test]
    fn test_cached_result_from_entry() {
        let paper = Paper::new(Source::SemanticScholar, "p1", "Title", "Abstract");
        let entry = CacheEntry::new("k", "q", "the answer", vec![paper.clone()], Utc::now());
        let result = CachedResult::from(entry);
        assert_eq!(result.answer, "the answer");
        assert_eq!(result.papers, vec![paper]);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(entry_at(Utc::now())).unwrap();
        assert!(json.get("originalQuery").is_some());
        assert!(json.get("usageCount").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
