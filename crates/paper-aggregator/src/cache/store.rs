//! Storage seam for cached answers.

use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::models::CacheEntry;

/// A keyed document store with insert-if-absent writes.
///
/// Implementations may expire entries at any time; a missing entry is never an
/// error. Concurrent `insert_if_absent` calls for one key must leave exactly
/// one stored entry.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up an entry by normalized key.
    async fn find(&self, key: &str) -> StoreResult<Option<CacheEntry>>;

    /// Store `entry` unless a live entry already holds its key.
    ///
    /// An existing entry created at or before `stale_cutoff` counts as absent
    /// and is replaced, even if the store has not evicted it yet. Returns
    /// `true` if this call stored the entry, `false` if a live entry was kept.
    async fn insert_if_absent(&self, entry: CacheEntry, stale_cutoff: DateTime<Utc>) -> StoreResult<bool>;

    /// Add one to the entry's usage count. A missing key is not an error.
    async fn increment_usage(&self, key: &str) -> StoreResult<()>;
}
