//! Upstream academic search sources.
//!
//! Every source maps its provider-specific payload into [`Paper`] and obeys the
//! same contract: [`PaperSource::search`] never fails. Transport errors, bad
//! statuses, malformed bodies and timeouts are logged and yield an empty list.

mod arxiv;
mod openalex;
mod semantic_scholar;

use std::time::Duration;

use reqwest::Client;

use crate::config::{Config, api};
use crate::error::{SourceError, SourceResult};
use crate::models::{Paper, Source};

pub use arxiv::{ArxivSource, parse_feed};
pub use openalex::{OpenAlexSource, parse_response as parse_openalex_response, rebuild_abstract};
pub use semantic_scholar::{
    SemanticScholarSource, parse_response as parse_semantic_scholar_response,
};

/// A search backend that returns papers for free-text queries.
#[async_trait::async_trait]
pub trait PaperSource: Send + Sync {
    /// Which upstream this is.
    fn source(&self) -> Source;

    /// Number of candidates to request per query.
    fn page_size(&self) -> usize;

    /// Deadline for one [`search`](Self::search) call.
    fn timeout(&self) -> Duration;

    /// Query the upstream. May fail; callers should use [`search`](Self::search).
    async fn fetch(&self, query: &str, max_results: usize) -> SourceResult<Vec<Paper>>;

    /// Query the upstream under the source deadline, returning an empty list on
    /// any failure.
    async fn search(&self, query: &str, max_results: usize) -> Vec<Paper> {
        let deadline = self.timeout();
        let outcome = match tokio::time::timeout(deadline, self.fetch(query, max_results)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(deadline)),
        };

        match outcome {
            Ok(papers) => {
                tracing::debug!(source = %self.source(), count = papers.len(), "Source returned papers");
                papers
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(source = %self.source(), timeout = ?deadline, "Source timed out, skipping");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(source = %self.source(), error = %e, "Source failed, skipping");
                Vec::new()
            }
        }
    }
}

/// Build the HTTP client shared by all sources.
///
/// # Errors
///
/// Returns error if HTTP client initialization fails.
pub fn build_http_client(config: &Config) -> SourceResult<Client> {
    let client = Client::builder()
        .user_agent(api::USER_AGENT)
        .timeout(config.source_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(api::MAX_KEEPALIVE)
        .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Map API response status codes to errors.
async fn check_status(response: reqwest::Response) -> SourceResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(SourceError::rate_limited(retry_after))
        }
        code => {
            let text = response.text().await.unwrap_or_default();
            Err(SourceError::status(code, text))
        }
    }
}

/// Trim and drop blank strings.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Collapse internal whitespace runs (feeds wrap long text across lines).
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
