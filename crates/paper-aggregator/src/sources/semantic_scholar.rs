//! Semantic Scholar Graph API search.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{PaperSource, check_status, non_blank};
use crate::config::{Config, SEMANTIC_SCHOLAR_FIELDS};
use crate::error::SourceResult;
use crate::models::{Paper, Source, normalize_doi};

/// Search response envelope.
#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<S2Paper>>,
}

/// Paper as returned by `/paper/search`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    #[serde(default)]
    paper_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    r#abstract: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    citation_count: Option<i64>,
    #[serde(default)]
    authors: Option<Vec<S2Author>>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    journal: Option<S2Journal>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    open_access_pdf: Option<S2OpenAccessPdf>,
    #[serde(default)]
    external_ids: Option<S2ExternalIds>,
}

#[derive(Debug, Default, Deserialize)]
struct S2Author {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct S2Journal {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct S2OpenAccessPdf {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
}

impl From<S2Paper> for Paper {
    fn from(raw: S2Paper) -> Self {
        let doi = raw.external_ids.and_then(|ids| ids.doi).and_then(|d| normalize_doi(&d));

        // Open-access PDF, then the S2 landing page, then the DOI resolver
        let url = non_blank(raw.open_access_pdf.and_then(|pdf| pdf.url))
            .or_else(|| non_blank(raw.url))
            .or_else(|| doi.as_ref().map(|d| format!("https://doi.org/{d}")));

        let journal = non_blank(raw.journal.and_then(|j| j.name)).or_else(|| non_blank(raw.venue));

        let authors = raw
            .authors
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| non_blank(a.name))
            .collect();

        Self {
            id: raw.paper_id.unwrap_or_default(),
            title: raw.title.unwrap_or_default().trim().to_string(),
            authors,
            year: raw.year,
            r#abstract: raw.r#abstract.unwrap_or_default().trim().to_string(),
            journal,
            doi,
            url,
            citation_count: raw.citation_count.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32,
            source: Source::SemanticScholar,
        }
    }
}

/// Parse a `/paper/search` response body into papers.
///
/// # Errors
///
/// Returns error if the body is not a JSON object of the expected shape.
pub fn parse_response(body: &[u8]) -> SourceResult<Vec<Paper>> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response.data.unwrap_or_default().into_iter().map(Paper::from).collect())
}

/// Semantic Scholar search source.
#[derive(Clone)]
pub struct SemanticScholarSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    page_size: usize,
    timeout: Duration,
}

impl SemanticScholarSource {
    /// Create a source sharing the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.semantic_scholar_url.clone(),
            api_key: config.semantic_scholar_api_key.clone(),
            page_size: config.semantic_scholar_page_size,
            timeout: config.source_timeout,
        }
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait::async_trait]
impl PaperSource for SemanticScholarSource {
    fn source(&self) -> Source {
        Source::SemanticScholar
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, max_results: usize) -> SourceResult<Vec<Paper>> {
        let url = Url::parse_with_params(
            &format!("{}/paper/search", self.base_url),
            &[
                ("query", query.to_string()),
                ("limit", max_results.to_string()),
                ("fields", SEMANTIC_SCHOLAR_FIELDS.join(",")),
            ],
        )?;

        let mut request = self.client.get(url).timeout(self.timeout);
        if let Some(ref key) = self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = check_status(request.send().await?).await?;
        let body = response.bytes().await?;
        parse_response(&body)
    }
}

impl std::fmt::Debug for SemanticScholarSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticScholarSource")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.has_api_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_record_mapping() {
        let body = json!({
            "total": 1,
            "data": [{
                "paperId": "649def34",
                "title": "Attention Is All You Need",
                "abstract": "The dominant sequence transduction models...",
                "year": 2017,
                "citationCount": 90000,
                "authors": [{"authorId": "1", "name": "Ashish Vaswani"}, {"authorId": "2", "name": "Noam Shazeer"}],
                "venue": "NeurIPS",
                "journal": {"name": "Neural Information Processing Systems"},
                "url": "https://www.semanticscholar.org/paper/649def34",
                "openAccessPdf": {"url": "https://arxiv.org/pdf/1706.03762", "status": "GREEN"},
                "externalIds": {"DOI": "10.48550/arXiv.1706.03762", "ArXiv": "1706.03762"}
            }]
        });

        let papers = parse_response(body.to_string().as_bytes()).unwrap();
        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        assert_eq!(paper.id, "649def34");
        assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(paper.year, Some(2017));
        assert_eq!(paper.citation_count, 90000);
        assert_eq!(paper.journal.as_deref(), Some("Neural Information Processing Systems"));
        assert_eq!(paper.doi.as_deref(), Some("10.48550/arXiv.1706.03762"));
        assert_eq!(paper.url.as_deref(), Some("https://arxiv.org/pdf/1706.03762"));
        assert_eq!(paper.source, Source::SemanticScholar);
    }

    #[test]
    fn test_sparse_record_defaults() {
        let body = json!({"data": [{"paperId": "x", "title": "Only a title", "abstract": null,
            "citationCount": null, "authors": null, "openAccessPdf": null}]});

        let papers = parse_response(body.to_string().as_bytes()).unwrap();
        let paper = &papers[0];
        assert_eq!(paper.r#abstract, "");
        assert_eq!(paper.citation_count, 0);
        assert!(paper.authors.is_empty());
        assert!(paper.url.is_none());
        assert!(paper.year.is_none());
        assert!(!paper.is_complete());
    }

    #[test]
    fn test_url_falls_back_to_landing_page_then_doi() {
        let body = json!({"data": [
            {"title": "A", "openAccessPdf": {"url": ""}, "url": "https://s2/landing"},
            {"title": "B", "externalIds": {"DOI": "10.1/b"}}
        ]});

        let papers = parse_response(body.to_string().as_bytes()).unwrap();
        assert_eq!(papers[0].url.as_deref(), Some("https://s2/landing"));
        assert_eq!(papers[1].url.as_deref(), Some("https://doi.org/10.1/b"));
    }

    #[test]
    fn test_venue_used_when_journal_missing() {
        let body = json!({"data": [{"title": "A", "venue": "ICML", "journal": {"name": " "}}]});
        let papers = parse_response(body.to_string().as_bytes()).unwrap();
        assert_eq!(papers[0].journal.as_deref(), Some("ICML"));
    }

    #[test]
    fn test_missing_data_is_empty() {
        assert!(parse_response(b"{}").unwrap().is_empty());
        assert!(parse_response(b"{\"data\": null}").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_body_is_error() {
        assert!(parse_response(b"<html>oops</html>").is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = Config::new(Some("super-secret-key".to_string()));
        let source = SemanticScholarSource::new(Client::new(), &config);
        let debug = format!("{source:?}");
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("has_api_key"));
    }
}
