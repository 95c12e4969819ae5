//! Data models shared by sources, the aggregator and the cache.
//!
//! All models serialize with `#[serde(rename_all = "camelCase")]` so cached
//! payloads keep the field names the web layer reads.

mod cache;
mod paper;

pub use cache::{CacheEntry, CachedResult, expiry_cutoff};
pub use paper::{Paper, Source, normalize_doi};
