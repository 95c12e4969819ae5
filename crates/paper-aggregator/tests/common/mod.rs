//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use paper_aggregator::SourceError;
use paper_aggregator::error::SourceResult;
use paper_aggregator::models::{Paper, Source};
use paper_aggregator::sources::PaperSource;

/// Build a complete paper with the given citation count.
pub fn paper(source: Source, id: &str, title: &str, citations: u32) -> Paper {
    let mut paper = Paper::new(source, id, title, format!("Abstract of {title}"));
    paper.citation_count = citations;
    paper
}

/// What a [`FakeSource`] does when searched.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Return these papers.
    Papers(Vec<Paper>),
    /// Fail with an upstream status error.
    Fail,
    /// Sleep past the deadline, then return these papers.
    Hang(Vec<Paper>),
}

/// In-memory [`PaperSource`] that counts how often it is called.
#[derive(Debug)]
pub struct FakeSource {
    source: Source,
    behavior: Behavior,
    timeout: Duration,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(source: Source, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self { source, behavior, timeout: Duration::from_millis(200), calls: AtomicUsize::new(0) })
    }

    pub fn returning(source: Source, papers: Vec<Paper>) -> Arc<Self> {
        Self::new(source, Behavior::Papers(papers))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PaperSource for FakeSource {
    fn source(&self) -> Source {
        self.source
    }

    fn page_size(&self) -> usize {
        10
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, _query: &str, _max_results: usize) -> SourceResult<Vec<Paper>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Papers(papers) => Ok(papers.clone()),
            Behavior::Fail => Err(SourceError::status(502, "Bad Gateway")),
            Behavior::Hang(papers) => {
                tokio::time::sleep(self.timeout * 10).await;
                Ok(papers.clone())
            }
        }
    }
}
