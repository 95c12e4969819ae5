//! Process-wide store handle that connects on first use.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tokio::sync::OnceCell;

use super::CacheStore;
use crate::error::StoreResult;
use crate::models::CacheEntry;

type Connector = Box<dyn Fn() -> BoxFuture<'static, StoreResult<Arc<dyn CacheStore>>> + Send + Sync>;

/// A [`CacheStore`] that opens its backing store once, on first use.
///
/// Concurrent first calls share a single connection attempt. A failed attempt
/// is reported to the caller and the next operation tries again.
pub struct LazyStore {
    connector: Connector,
    store: OnceCell<Arc<dyn CacheStore>>,
}

impl LazyStore {
    /// Create a handle that calls `connect` when the store is first needed.
    pub fn new<F>(connect: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, StoreResult<Arc<dyn CacheStore>>> + Send + Sync + 'static,
    {
        Self { connector: Box::new(connect), store: OnceCell::new() }
    }

    /// Whether the backing store has been connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    async fn store(&self) -> StoreResult<&Arc<dyn CacheStore>> {
        self.store
            .get_or_try_init(|| async {
                tracing::debug!("Connecting cache store");
                (self.connector)().await
            })
            .await
    }
}

#[async_trait::async_trait]
impl CacheStore for LazyStore {
    async fn find(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        self.store().await?.find(key).await
    }

    async fn insert_if_absent(&self, entry: CacheEntry, stale_cutoff: DateTime<Utc>) -> StoreResult<bool> {
        self.store().await?.insert_if_absent(entry, stale_cutoff).await
    }

    async fn increment_usage(&self, key: &str) -> StoreResult<()> {
        self.store().await?.increment_usage(key).await
    }
}

impl std::fmt::Debug for LazyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyStore").field("connected", &self.is_connected()).finish()
    }
}
