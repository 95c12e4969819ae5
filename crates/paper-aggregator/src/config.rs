//! Configuration for sources, aggregation policy and the result cache.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Semantic Scholar Graph API endpoint.
    pub const SEMANTIC_SCHOLAR_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// OpenAlex API endpoint.
    pub const OPENALEX_API: &str = "https://api.openalex.org";

    /// arXiv export query endpoint.
    pub const ARXIV_API: &str = "https://export.arxiv.org/api/query";

    /// Hard deadline for one source call, including body download.
    pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(9);

    /// Longest configurable source deadline, in seconds.
    pub const MAX_SOURCE_TIMEOUT_SECS: u64 = 300;

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum keepalive connections per host.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// User agent sent to every source.
    pub const USER_AGENT: &str = concat!("paper-aggregator/", env!("CARGO_PKG_VERSION"));
}

/// Candidate counts and merge policy defaults.
pub mod limits {
    /// Candidates requested from Semantic Scholar.
    pub const SEMANTIC_SCHOLAR_PAGE_SIZE: usize = 10;

    /// Candidates requested from OpenAlex.
    pub const OPENALEX_PAGE_SIZE: usize = 10;

    /// Candidates requested from arXiv (lower signal, no citation counts).
    pub const ARXIV_PAGE_SIZE: usize = 5;

    /// Papers kept after ranking.
    pub const MAX_RESULTS: usize = 15;

    /// Title prefix length used as the dedup fingerprint.
    pub const DEDUP_PREFIX_LEN: usize = 50;
}

/// Result cache defaults.
pub mod cache {
    use std::time::Duration;

    pub(crate) const SECS_PER_DAY: u64 = 24 * 3600;

    /// Entries expire this long after creation (30 days).
    pub const RETENTION: Duration = Duration::from_secs(30 * SECS_PER_DAY);

    /// Longest configurable retention, in days.
    pub const MAX_RETENTION_DAYS: u64 = 3650;

    /// Longest retention any store is built with.
    pub const MAX_RETENTION: Duration = Duration::from_secs(MAX_RETENTION_DAYS * SECS_PER_DAY);

    /// Maximum entries held by the in-memory store.
    pub const MAX_ENTRIES: u64 = 10_000;
}

/// Semantic Scholar fields requested on search.
pub const SEMANTIC_SCHOLAR_FIELDS: &[&str] = &[
    "paperId",
    "title",
    "abstract",
    "year",
    "citationCount",
    "authors",
    "venue",
    "journal",
    "url",
    "openAccessPdf",
    "externalIds",
];

/// Aggregator and cache configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Semantic Scholar API key (optional).
    pub semantic_scholar_api_key: Option<String>,

    /// Contact address for the OpenAlex polite pool (optional).
    pub openalex_mailto: Option<String>,

    /// Base URL for the Semantic Scholar Graph API (for testing with mock servers).
    pub semantic_scholar_url: String,

    /// Base URL for OpenAlex.
    pub openalex_url: String,

    /// Full URL of the arXiv query endpoint.
    pub arxiv_url: String,

    /// Per-source deadline.
    pub source_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Candidates requested from Semantic Scholar.
    pub semantic_scholar_page_size: usize,

    /// Candidates requested from OpenAlex.
    pub openalex_page_size: usize,

    /// Candidates requested from arXiv.
    pub arxiv_page_size: usize,

    /// Papers kept after ranking.
    pub max_results: usize,

    /// Title prefix length for deduplication.
    pub dedup_prefix_len: usize,

    /// Cache entry lifetime measured from creation.
    pub cache_retention: Duration,

    /// Maximum cache entries.
    pub cache_max_entries: u64,
}

impl Config {
    /// Create a new configuration with an optional Semantic Scholar API key.
    #[must_use]
    pub fn new(semantic_scholar_api_key: Option<String>) -> Self {
        Self {
            semantic_scholar_api_key,
            openalex_mailto: None,
            semantic_scholar_url: api::SEMANTIC_SCHOLAR_API.to_string(),
            openalex_url: api::OPENALEX_API.to_string(),
            arxiv_url: api::ARXIV_API.to_string(),
            source_timeout: api::SOURCE_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            semantic_scholar_page_size: limits::SEMANTIC_SCHOLAR_PAGE_SIZE,
            openalex_page_size: limits::OPENALEX_PAGE_SIZE,
            arxiv_page_size: limits::ARXIV_PAGE_SIZE,
            max_results: limits::MAX_RESULTS,
            dedup_prefix_len: limits::DEDUP_PREFIX_LEN,
            cache_retention: cache::RETENTION,
            cache_max_entries: cache::MAX_ENTRIES,
        }
    }

    /// Create a test configuration pointing every source at one mock server.
    ///
    /// Paths mirror the real APIs: `/graph/v1/paper/search`, `/works`, `/api/query`.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            semantic_scholar_url: format!("{}/graph/v1", base_url),
            openalex_url: base_url.to_string(),
            arxiv_url: format!("{}/api/query", base_url),
            source_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
            ..Self::new(None)
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a numeric variable is present but not a valid number
    /// or out of range.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from any variable lookup.
    ///
    /// Numeric settings must parse and fall in range:
    /// - `PAPER_SOURCE_TIMEOUT_SECS`: 1 to 300
    /// - `PAPER_MAX_RESULTS`, `PAPER_DEDUP_PREFIX_LEN`: at least 1
    /// - `PAPER_CACHE_RETENTION_DAYS`: 1 to 3650
    ///
    /// # Errors
    ///
    /// Returns error naming the first invalid variable.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(lookup("SEMANTIC_SCHOLAR_API_KEY"));
        config.openalex_mailto = lookup("OPENALEX_MAILTO");

        if let Some(secs) = var_in_range(&lookup, "PAPER_SOURCE_TIMEOUT_SECS", 1..=api::MAX_SOURCE_TIMEOUT_SECS)? {
            config.source_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = var_in_range(&lookup, "PAPER_MAX_RESULTS", 1..=usize::MAX)? {
            config.max_results = max;
        }
        if let Some(len) = var_in_range(&lookup, "PAPER_DEDUP_PREFIX_LEN", 1..=usize::MAX)? {
            config.dedup_prefix_len = len;
        }
        if let Some(days) = var_in_range(&lookup, "PAPER_CACHE_RETENTION_DAYS", 1..=cache::MAX_RETENTION_DAYS)? {
            let secs = days
                .checked_mul(cache::SECS_PER_DAY)
                .with_context(|| format!("PAPER_CACHE_RETENTION_DAYS too large: {days}"))?;
            config.cache_retention = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Check if a Semantic Scholar API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.semantic_scholar_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

fn var_in_range<F, T>(lookup: &F, name: &str, range: RangeInclusive<T>) -> anyhow::Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };

    let value: T = raw.trim().parse().with_context(|| format!("invalid {name}: {raw:?}"))?;
    anyhow::ensure!(
        range.contains(&value),
        "{name} out of range: {value} (expected {} to {})",
        range.start(),
        range.end()
    );
    Ok(Some(value))
}
