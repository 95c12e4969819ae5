//! arXiv export API search (Atom feed).

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use reqwest::Client;
use url::Url;

use super::{PaperSource, check_status, collapse_whitespace, non_blank};
use crate::config::Config;
use crate::error::{SourceError, SourceResult};
use crate::models::{Paper, Source, normalize_doi};

const ABS_PREFIXES: &[&str] = &["http://arxiv.org/abs/", "https://arxiv.org/abs/"];

/// Entry child element whose text is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
    Doi,
    JournalRef,
}

/// Fields collected from one `<entry>`.
#[derive(Debug, Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    pdf_link: Option<String>,
    abs_link: Option<String>,
    doi: Option<String>,
    journal_ref: Option<String>,
}

impl EntryBuilder {
    fn commit(&mut self, field: Field, text: &str) {
        match field {
            Field::Id => self.id = text.trim().to_string(),
            Field::Title => self.title = collapse_whitespace(text),
            Field::Summary => self.summary = collapse_whitespace(text),
            Field::Published => self.published = text.trim().to_string(),
            Field::AuthorName => {
                if let Some(name) = non_blank(Some(collapse_whitespace(text))) {
                    self.authors.push(name);
                }
            }
            Field::Doi => self.doi = normalize_doi(text),
            Field::JournalRef => self.journal_ref = non_blank(Some(collapse_whitespace(text))),
        }
    }

    fn link(&mut self, element: &BytesStart<'_>) {
        let mut href = None;
        let mut rel = None;
        let mut title = None;
        let mut mime = None;

        for attr in element.attributes().flatten() {
            let value = String::from_utf8_lossy(&attr.value).to_string();
            match attr.key.as_ref() {
                b"href" => href = Some(value),
                b"rel" => rel = Some(value),
                b"title" => title = Some(value),
                b"type" => mime = Some(value),
                _ => {}
            }
        }

        let Some(href) = non_blank(href) else {
            return;
        };

        if title.as_deref() == Some("pdf") || mime.as_deref() == Some("application/pdf") {
            self.pdf_link.get_or_insert(href);
        } else if rel.as_deref().is_none_or(|r| r == "alternate") {
            self.abs_link.get_or_insert(href);
        }
    }

    fn build(self) -> Paper {
        let id = ABS_PREFIXES
            .iter()
            .find_map(|prefix| self.id.strip_prefix(*prefix))
            .unwrap_or(&self.id)
            .to_string();

        let landing = non_blank(Some(self.id.clone()));
        let year = self.published.get(..4).and_then(|y| y.parse().ok());

        Paper {
            id,
            title: self.title,
            authors: self.authors,
            year,
            r#abstract: self.summary,
            journal: self.journal_ref,
            doi: self.doi,
            url: self.pdf_link.or(self.abs_link).or(landing),
            citation_count: 0,
            source: Source::Arxiv,
        }
    }
}

/// Parse an arXiv Atom feed into papers.
///
/// # Errors
///
/// Returns error if the XML is malformed.
pub fn parse_feed(xml: &str) -> SourceResult<Vec<Paper>> {
    let mut reader = Reader::from_str(xml);

    let mut papers = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut in_author = false;
    let mut field: Option<Field> = None;
    // Open elements nested inside the field being collected
    let mut inline_depth = 0usize;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) if field.is_some() => inline_depth += 1,
            Ok(Event::Start(ref e)) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"entry" => {
                        entry = Some(EntryBuilder::default());
                        in_author = false;
                    }
                    b"author" if entry.is_some() => in_author = true,
                    b"link" => {
                        if let Some(builder) = entry.as_mut() {
                            builder.link(e);
                        }
                    }
                    name if entry.is_some() => {
                        field = match name {
                            b"id" if !in_author => Some(Field::Id),
                            b"title" => Some(Field::Title),
                            b"summary" => Some(Field::Summary),
                            b"published" => Some(Field::Published),
                            b"name" if in_author => Some(Field::AuthorName),
                            b"doi" => Some(Field::Doi),
                            b"journal_ref" => Some(Field::JournalRef),
                            _ => None,
                        };
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(builder) = entry.as_mut() {
                        builder.link(e);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if field.is_some() {
                    let chunk = e.unescape().map_err(SourceError::xml)?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::CData(ref e)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(_)) if inline_depth > 0 => inline_depth -= 1,
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(builder) = entry.take() {
                        papers.push(builder.build());
                    }
                    field = None;
                }
                b"author" => in_author = false,
                _ => {
                    if let (Some(f), Some(builder)) = (field.take(), entry.as_mut()) {
                        builder.commit(f, &text);
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::xml(e)),
            _ => {}
        }
    }

    if entry.is_some() {
        return Err(SourceError::xml("feed ended inside <entry>"));
    }

    Ok(papers)
}

/// arXiv search source.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Client,
    endpoint: String,
    page_size: usize,
    timeout: Duration,
}

impl ArxivSource {
    /// Create a source sharing the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.arxiv_url.clone(),
            page_size: config.arxiv_page_size,
            timeout: config.source_timeout,
        }
    }
}

#[async_trait::async_trait]
impl PaperSource for ArxivSource {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, max_results: usize) -> SourceResult<Vec<Paper>> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("search_query", format!("all:{query}")),
                ("start", "0".to_string()),
                ("max_results", max_results.to_string()),
                ("sortBy", "relevance".to_string()),
            ],
        )?;

        let response = check_status(self.client.get(url).timeout(self.timeout).send().await?).await?;
        let body = response.text().await?;
        parse_feed(&body)
    }
}
