//! OpenAlex works search.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{PaperSource, check_status, non_blank};
use crate::config::Config;
use crate::error::SourceResult;
use crate::models::{Paper, Source, normalize_doi};

const OPENALEX_ID_PREFIX: &str = "https://openalex.org/";

#[derive(Debug, Default, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    results: Option<Vec<Work>>,
}

/// A work from `/works`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct Work {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    publication_year: Option<i32>,
    #[serde(default)]
    cited_by_count: Option<i64>,
    #[serde(default)]
    authorships: Option<Vec<Authorship>>,
    #[serde(default)]
    abstract_inverted_index: Option<HashMap<String, Vec<u32>>>,
    #[serde(default)]
    primary_location: Option<Location>,
    #[serde(default)]
    best_oa_location: Option<Location>,
    #[serde(default)]
    open_access: Option<OpenAccess>,
}

#[derive(Debug, Default, Deserialize)]
struct Authorship {
    #[serde(default)]
    author: Option<AuthorObj>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorObj {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    #[serde(default)]
    landing_page_url: Option<String>,
    #[serde(default)]
    pdf_url: Option<String>,
    #[serde(default)]
    source: Option<LocationSource>,
}

#[derive(Debug, Default, Deserialize)]
struct LocationSource {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAccess {
    #[serde(default)]
    oa_url: Option<String>,
}

/// Reassemble an abstract from OpenAlex's word -> positions map.
///
/// Words are placed by ascending position and joined with single spaces.
#[must_use]
pub fn rebuild_abstract(index: &HashMap<String, Vec<u32>>) -> String {
    let mut placed: Vec<(u32, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |&pos| (pos, word.as_str())))
        .collect();
    placed.sort_unstable();
    placed.into_iter().map(|(_, word)| word).collect::<Vec<_>>().join(" ")
}

impl From<Work> for Paper {
    fn from(raw: Work) -> Self {
        let doi = raw.doi.as_deref().and_then(normalize_doi);

        let (primary_landing, primary_pdf, journal) = match raw.primary_location {
            Some(loc) => (
                non_blank(loc.landing_page_url),
                non_blank(loc.pdf_url),
                non_blank(loc.source.and_then(|s| s.display_name)),
            ),
            None => (None, None, None),
        };
        let best_oa_pdf = raw.best_oa_location.and_then(|loc| non_blank(loc.pdf_url));

        // Open-access copy first, then the publisher landing page, then the DOI resolver
        let url = non_blank(raw.open_access.and_then(|oa| oa.oa_url))
            .or(best_oa_pdf)
            .or(primary_pdf)
            .or(primary_landing)
            .or_else(|| doi.as_ref().map(|d| format!("https://doi.org/{d}")));

        let authors = raw
            .authorships
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| non_blank(a.author.and_then(|author| author.display_name)))
            .collect();

        let id = raw.id.unwrap_or_default();
        let id = id.strip_prefix(OPENALEX_ID_PREFIX).map_or_else(|| id.clone(), str::to_string);

        Self {
            id,
            title: non_blank(raw.title).or_else(|| non_blank(raw.display_name)).unwrap_or_default(),
            authors,
            year: raw.publication_year,
            r#abstract: raw.abstract_inverted_index.as_ref().map(rebuild_abstract).unwrap_or_default(),
            journal,
            doi,
            url,
            citation_count: raw.cited_by_count.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32,
            source: Source::OpenAlex,
        }
    }
}

/// Parse a `/works` response body into papers.
///
/// # Errors
///
/// Returns error if the body is not a JSON object of the expected shape.
pub fn parse_response(body: &[u8]) -> SourceResult<Vec<Paper>> {
    let response: WorksResponse = serde_json::from_slice(body)?;
    Ok(response.results.unwrap_or_default().into_iter().map(Paper::from).collect())
}

/// OpenAlex search source.
#[derive(Debug, Clone)]
pub struct OpenAlexSource {
    client: Client,
    base_url: String,
    mailto: Option<String>,
    page_size: usize,
    timeout: Duration,
}

impl OpenAlexSource {
    /// Create a source sharing the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.openalex_url.clone(),
            mailto: config.openalex_mailto.clone(),
            page_size: config.openalex_page_size,
            timeout: config.source_timeout,
        }
    }
}

#[async_trait::async_trait]
impl PaperSource for OpenAlexSource {
    fn source(&self) -> Source {
        Source::OpenAlex
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, max_results: usize) -> SourceResult<Vec<Paper>> {
        let mut url = Url::parse(&format!("{}/works", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("search", query)
            .append_pair("per-page", &max_results.to_string());
        if let Some(ref mailto) = self.mailto {
            url.query_pairs_mut().append_pair("mailto", mailto);
        }

        let response = check_status(self.client.get(url).timeout(self.timeout).send().await?).await?;
        let body = response.bytes().await?;
        parse_response(&body)
    }
}
