//! Concurrent multi-source search with merge, dedup and ranking.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::config::{Config, limits};
use crate::error::SourceResult;
use crate::models::Paper;
use crate::sources::{ArxivSource, OpenAlexSource, PaperSource, SemanticScholarSource, build_http_client};

/// How merged results are deduplicated and capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// Papers kept after ranking.
    pub max_results: usize,

    /// Title prefix length used as the dedup fingerprint.
    pub dedup_prefix_len: usize,
}

impl MergePolicy {
    /// Policy from configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self { max_results: config.max_results, dedup_prefix_len: config.dedup_prefix_len }
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self { max_results: limits::MAX_RESULTS, dedup_prefix_len: limits::DEDUP_PREFIX_LEN }
    }
}

/// Merge per-source batches into one ranked list.
///
/// Batches must be in source priority order. Incomplete papers are dropped,
/// the first paper per title fingerprint wins, the rest are stable-sorted by
/// citation count (descending) and truncated to `policy.max_results`.
#[must_use]
pub fn merge_results(batches: Vec<Vec<Paper>>, policy: &MergePolicy) -> Vec<Paper> {
    let mut seen = HashSet::new();

    let mut merged: Vec<Paper> = batches
        .into_iter()
        .flatten()
        .filter(Paper::is_complete)
        .filter(|paper| seen.insert(paper.fingerprint(policy.dedup_prefix_len)))
        .collect();

    // sort_by is stable: equal citation counts keep concatenation order
    merged.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
    merged.truncate(policy.max_results);
    merged
}

/// Fans a query out to every source and merges what comes back.
#[derive(Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn PaperSource>>,
    policy: MergePolicy,
}

impl Aggregator {
    /// Create an aggregator over `sources`, given in priority order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn PaperSource>>, policy: MergePolicy) -> Self {
        Self { sources, policy }
    }

    /// Build the standard Semantic Scholar, OpenAlex and arXiv sources over one
    /// shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn from_config(config: &Config) -> SourceResult<Self> {
        let client = build_http_client(config)?;

        let sources: Vec<Arc<dyn PaperSource>> = vec![
            Arc::new(SemanticScholarSource::new(client.clone(), config)),
            Arc::new(OpenAlexSource::new(client.clone(), config)),
            Arc::new(ArxivSource::new(client, config)),
        ];

        Ok(Self::new(sources, MergePolicy::from_config(config)))
    }

    /// Search every source concurrently and return the merged ranking.
    ///
    /// Waits for all sources to settle. A failed or timed-out source
    /// contributes nothing; if all fail the result is empty, which means
    /// "no papers found" rather than an error.
    pub async fn search_all(&self, query: &str) -> Vec<Paper> {
        let searches = self.sources.iter().map(|source| source.search(query, source.page_size()));
        let batches = join_all(searches).await;

        let candidates: usize = batches.iter().map(Vec::len).sum();
        let merged = merge_results(batches, &self.policy);

        tracing::debug!(candidates, kept = merged.len(), "Merged source results");
        merged
    }

    /// Merge policy in use.
    #[must_use]
    pub const fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// Number of configured sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<_> = self.sources.iter().map(|s| s.source()).collect();
        f.debug_struct("Aggregator").field("sources", &sources).field("policy", &self.policy).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn paper(source: Source, id: &str, title: &str, citations: u32) -> Paper {
        let mut paper = Paper::new(source, id, title, format!("Abstract of {title}"));
        paper.citation_count = citations;
        paper
    }

    #[test]
    fn test_ranking_is_stable() {
        let batch = vec![
            paper(Source::SemanticScholar, "a", "Alpha", 10),
            paper(Source::SemanticScholar, "b", "Beta", 50),
            paper(Source::SemanticScholar, "c", "Gamma", 50),
            paper(Source::SemanticScholar, "d", "Delta", 5),
        ];

        let merged = merge_results(vec![batch], &MergePolicy::default());
        let ids: Vec<_> = merged.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_dedup_keeps_earliest_source() {
        let s2 = vec![paper(Source::SemanticScholar, "s2", "Deep Learning", 5)];
        let oa = vec![paper(Source::OpenAlex, "oa", "deep learning", 500)];

        let merged = merge_results(vec![s2, oa], &MergePolicy::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, Source::SemanticScholar);
        assert_eq!(merged[0].citation_count, 5);
    }

    #[test]
    fn test_dedup_uses_title_prefix() {
        let policy = MergePolicy { dedup_prefix_len: 20, ..MergePolicy::default() };
        let s2 = vec![paper(Source::SemanticScholar, "1", "A Survey of Graph Neural Networks", 1)];
        let arxiv = vec![paper(Source::Arxiv, "2", "A Survey of Graph Neural Networks: Methods", 1)];

        assert_eq!(merge_results(vec![s2.clone(), arxiv.clone()], &policy).len(), 1);

        let long = MergePolicy { dedup_prefix_len: 200, ..MergePolicy::default() };
        assert_eq!(merge_results(vec![s2, arxiv], &long).len(), 2);
    }

    #[test]
    fn test_incomplete_papers_dropped() {
        let mut no_abstract = paper(Source::OpenAlex, "x", "Has title", 1000);
        no_abstract.r#abstract = String::new();
        let no_title = paper(Source::OpenAlex, "y", "", 1000);
        let ok = paper(Source::OpenAlex, "z", "Fine", 1);

        let merged = merge_results(vec![vec![no_abstract, no_title, ok]], &MergePolicy::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "z");
    }

    #[test]
    fn test_incomplete_duplicate_does_not_shadow_complete_one() {
        let mut empty = paper(Source::SemanticScholar, "s2", "Same Title", 1);
        empty.r#abstract = String::new();
        let full = paper(Source::OpenAlex, "oa", "Same Title", 1);

        let merged = merge_results(vec![vec![empty], vec![full]], &MergePolicy::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, Source::OpenAlex);
    }

    #[test]
    fn test_truncates_after_sorting() {
        let policy = MergePolicy { max_results: 2, ..MergePolicy::default() };
        let batch = vec![
            paper(Source::Arxiv, "low", "Low", 1),
            paper(Source::Arxiv, "high", "High", 100),
            paper(Source::Arxiv, "mid", "Mid", 10),
        ];

        let merged = merge_results(vec![batch], &policy);
        let ids: Vec<_> = merged.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid"]);
    }

    #[test]
    fn test_empty_batches() {
        assert!(merge_results(vec![vec![], vec![], vec![]], &MergePolicy::default()).is_empty());
    }

    #[test]
    fn test_from_config_builds_three_sources() {
        let aggregator = Aggregator::from_config(&Config::default()).unwrap();
        assert_eq!(aggregator.source_count(), 3);
        assert_eq!(aggregator.policy().max_results, limits::MAX_RESULTS);
    }
}
