//! Cache-or-aggregate research flow.
//!
//! 1. Serve from the [`ResultCache`] when the normalized query is cached.
//! 2. Otherwise aggregate papers from every source.
//! 3. Hand them to the external [`AnswerGenerator`].
//! 4. Cache the result in the background.

use std::sync::Arc;

use serde::Serialize;

use crate::aggregator::Aggregator;
use crate::cache::ResultCache;
use crate::error::PipelineError;
use crate::models::{CachedResult, Paper};

/// Turns a query and its supporting papers into prose.
///
/// Implemented outside this crate (LLM call).
#[async_trait::async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer for `query` grounded in `papers`.
    async fn generate(&self, query: &str, papers: &[Paper]) -> anyhow::Result<String>;
}

/// What the pipeline produced for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ResearchOutcome {
    /// Served from the cache without touching any source.
    Cached {
        /// Cached answer.
        answer: String,
        /// Papers cached with it.
        papers: Vec<Paper>,
    },

    /// Freshly aggregated and generated.
    Fresh {
        /// Generated answer.
        answer: String,
        /// Ranked papers the answer was generated from.
        papers: Vec<Paper>,
    },

    /// Every source came back empty. Not an error.
    NoPapers,
}

impl ResearchOutcome {
    /// The answer text, if any.
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Cached { answer, .. } | Self::Fresh { answer, .. } => Some(answer.as_str()),
            Self::NoPapers => None,
        }
    }

    /// The supporting papers (empty for [`NoPapers`](Self::NoPapers)).
    #[must_use]
    pub fn papers(&self) -> &[Paper] {
        match self {
            Self::Cached { papers, .. } | Self::Fresh { papers, .. } => papers.as_slice(),
            Self::NoPapers => &[],
        }
    }

    /// Whether this outcome came from the cache.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }
}

impl From<CachedResult> for ResearchOutcome {
    fn from(hit: CachedResult) -> Self {
        Self::Cached { answer: hit.answer, papers: hit.papers }
    }
}

/// Ties the aggregator, cache and answer generator together.
#[derive(Clone)]
pub struct ResearchPipeline {
    aggregator: Aggregator,
    cache: ResultCache,
    generator: Arc<dyn AnswerGenerator>,
}

impl ResearchPipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(aggregator: Aggregator, cache: ResultCache, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { aggregator, cache, generator }
    }

    /// Answer a research question.
    ///
    /// The cache write after a fresh answer runs in a detached task; this
    /// returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyQuery`] for blank input and
    /// [`PipelineError::Generation`] if the generator fails.
    pub async fn research(&self, query: &str) -> Result<ResearchOutcome, PipelineError> {
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }

        if let Some(hit) = self.cache.get(query).await {
            return Ok(hit.into());
        }

        let papers = self.aggregator.search_all(query).await;
        if papers.is_empty() {
            tracing::info!(query, "No papers found");
            return Ok(ResearchOutcome::NoPapers);
        }

        let answer = self.generator.generate(query, &papers).await.map_err(PipelineError::Generation)?;

        // Fire-and-forget; failures are logged inside the cache
        drop(self.cache.spawn_put(query, answer.clone(), papers.clone()));

        Ok(ResearchOutcome::Fresh { answer, papers })
    }

    /// The underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &ResultCache {
        &self.cache
    }
}

impl std::fmt::Debug for ResearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchPipeline")
            .field("aggregator", &self.aggregator)
            .field("cache", &self.cache)
            .finish()
    }
}
