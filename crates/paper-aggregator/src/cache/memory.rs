//! In-process store backed by a moka TTL cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};

use super::CacheStore;
use crate::config::{self, Config};
use crate::error::StoreResult;
use crate::models::CacheEntry;

/// Stored entry plus its live usage counter.
#[derive(Debug)]
struct Slot {
    entry: CacheEntry,
    usage: AtomicU64,
}

impl Slot {
    fn new(entry: CacheEntry) -> Self {
        let usage = AtomicU64::new(entry.usage_count);
        Self { entry, usage }
    }

    fn snapshot(&self) -> CacheEntry {
        CacheEntry { usage_count: self.usage.load(Ordering::Relaxed), ..self.entry.clone() }
    }
}

/// Cache store kept in process memory.
///
/// Entries live for `retention` after insertion. Reads never extend their
/// lifetime and only stale entries are ever overwritten, so the TTL is
/// measured from creation.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Cache<String, Arc<Slot>>,
}

impl MemoryStore {
    /// Create a store with the given lifetime and capacity.
    ///
    /// Lifetimes beyond [`config::cache::MAX_RETENTION`] are capped to it.
    #[must_use]
    pub fn new(retention: Duration, max_entries: u64) -> Self {
        let ttl = retention.min(config::cache::MAX_RETENTION);
        let entries = Cache::builder().max_capacity(max_entries).time_to_live(ttl).build();
        Self { entries }
    }

    /// Create a store sized from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_retention, config.cache_max_entries)
    }

    /// Apply pending evictions, including expired entries.
    pub async fn purge_expired(&self) {
        self.entries.run_pending_tasks().await;
    }

    /// Approximate number of live entries (exact after [`purge_expired`](Self::purge_expired)).
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn find(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        Ok(self.entries.get(key).await.map(|slot| slot.snapshot()))
    }

    async fn insert_if_absent(&self, entry: CacheEntry, stale_cutoff: DateTime<Utc>) -> StoreResult<bool> {
        let key = entry.key.clone();

        // Runs under moka's per-key lock, so concurrent writers are serialized
        let outcome = self
            .entries
            .entry(key)
            .and_compute_with(|existing| {
                let op = match existing {
                    Some(slot) if !slot.value().entry.is_stale(stale_cutoff) => Op::Nop,
                    _ => Op::Put(Arc::new(Slot::new(entry))),
                };
                std::future::ready(op)
            })
            .await;

        Ok(matches!(outcome, CompResult::Inserted(_) | CompResult::ReplacedWith(_)))
    }

    async fn increment_usage(&self, key: &str) -> StoreResult<()> {
        if let Some(slot) = self.entries.get(key).await {
            slot.usage.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").field("entries", &self.entries.entry_count()).finish()
    }
}
