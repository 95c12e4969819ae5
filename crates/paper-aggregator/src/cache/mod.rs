//! Answer cache keyed by normalized query.
//!
//! Caching is purely an optimization: every storage fault is logged and
//! swallowed, so a broken store behaves like an empty one.
//!
//! - Reads treat "missing" and "expired" the same.
//! - Hits bump the usage counter in a detached task.
//! - Writes insert only if the key is absent or holds an expired entry; a
//!   losing concurrent writer is a no-op.

mod lazy;
mod memory;
mod store;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::config::{self, Config};
use crate::models::{CacheEntry, CachedResult, Paper, expiry_cutoff};
use crate::normalize::{is_cacheable_key, normalize_query};

pub use lazy::LazyStore;
pub use memory::MemoryStore;
pub use store::CacheStore;

/// Result cache over a pluggable [`CacheStore`].
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    retention: Duration,
}

impl ResultCache {
    /// Create a cache over `store` with the default 30-day retention.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_retention(store, config::cache::RETENTION)
    }

    /// Create a cache that treats entries older than `retention` as absent.
    #[must_use]
    pub fn with_retention(store: Arc<dyn CacheStore>, retention: Duration) -> Self {
        Self { store, retention }
    }

    /// Create an in-memory cache sized from configuration.
    #[must_use]
    pub fn in_memory(config: &Config) -> Self {
        Self::with_retention(Arc::new(MemoryStore::from_config(config)), config.cache_retention)
    }

    /// Look up the cached answer for `query`.
    ///
    /// Returns `None` on a miss, on an expired entry, and on any storage fault.
    /// Must be called from within a Tokio runtime.
    pub async fn get(&self, query: &str) -> Option<CachedResult> {
        let key = normalize_query(query);
        if !is_cacheable_key(&key) {
            return None;
        }

        let entry = match self.store.find(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache lookup failed, treating as miss");
                return None;
            }
        };

        if entry.is_expired(self.retention, Utc::now()) {
            tracing::debug!(key = %key, "Cache entry expired");
            return None;
        }

        tracing::debug!(key = %key, usage = entry.usage_count + 1, "Cache hit");
        self.spawn_usage_increment(key);

        Some(entry.into())
    }

    /// Store an answer unless a live one is already cached for the same key.
    ///
    /// An entry past retention is replaced, matching what [`get`](Self::get)
    /// treats as absent. Never fails: storage faults are logged and dropped.
    pub async fn put(&self, query: &str, answer: &str, papers: Vec<Paper>) {
        let key = normalize_query(query);
        if !is_cacheable_key(&key) {
            tracing::debug!(query, "Query normalizes to an empty key, not caching");
            return;
        }

        let now = Utc::now();
        let entry = CacheEntry::new(key.clone(), query, answer, papers, now);
        match self.store.insert_if_absent(entry, expiry_cutoff(self.retention, now)).await {
            Ok(true) => tracing::debug!(key = %key, "Cached answer"),
            Ok(false) => tracing::debug!(key = %key, "Answer already cached, dropping write"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Cache write failed"),
        }
    }

    /// Run [`put`](Self::put) as a detached background task.
    ///
    /// The handle may be dropped; the write proceeds either way.
    pub fn spawn_put(&self, query: impl Into<String>, answer: impl Into<String>, papers: Vec<Paper>) -> JoinHandle<()> {
        let cache = self.clone();
        let query = query.into();
        let answer = answer.into();
        tokio::spawn(async move { cache.put(&query, &answer, papers).await })
    }

    fn spawn_usage_increment(&self, key: String) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.increment_usage(&key).await {
                tracing::warn!(key = %key, error = %e, "Usage count update failed");
            }
        });
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache").field("retention", &self.retention).finish()
    }
}
