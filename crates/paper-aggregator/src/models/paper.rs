//! Normalized paper record produced by every source.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The upstream a paper came from. Declaration order is merge priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    /// Semantic Scholar Graph API.
    #[serde(rename = "Semantic Scholar")]
    SemanticScholar,

    /// OpenAlex works API.
    #[serde(rename = "OpenAlex")]
    OpenAlex,

    /// arXiv export API.
    #[serde(rename = "arXiv")]
    Arxiv,
}

impl Source {
    /// Display label stored on each paper.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SemanticScholar => "Semantic Scholar",
            Self::OpenAlex => "OpenAlex",
            Self::Arxiv => "arXiv",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An academic paper in the common shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// Source-provided identifier, not unique across sources.
    pub id: String,

    /// Paper title.
    pub title: String,

    /// Author display names in citation order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Abstract text, empty when the source had none.
    #[serde(default)]
    pub r#abstract: String,

    /// Venue name.
    #[serde(default)]
    pub journal: Option<String>,

    /// Bare DOI without resolver prefix.
    #[serde(default)]
    pub doi: Option<String>,

    /// Best-effort link to full text or landing page.
    #[serde(default)]
    pub url: Option<String>,

    /// Number of citations, 0 when unknown.
    #[serde(default)]
    pub citation_count: u32,

    /// Which source produced this record.
    pub source: Source,
}

impl Paper {
    /// Create a paper with only the mandatory fields set.
    #[must_use]
    pub fn new(
        source: Source,
        id: impl Into<String>,
        title: impl Into<String>,
        r#abstract: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            year: None,
            r#abstract: r#abstract.into(),
            journal: None,
            doi: None,
            url: None,
            citation_count: 0,
            source,
        }
    }

    /// True when both title and abstract carry text.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.r#abstract.trim().is_empty()
    }

    /// Dedup fingerprint: lowercased title truncated to `prefix_len` chars.
    #[must_use]
    pub fn fingerprint(&self, prefix_len: usize) -> String {
        self.title.to_lowercase().chars().take(prefix_len).collect()
    }

    /// Year for display, "n.d." when unknown.
    #[must_use]
    pub fn year_label(&self) -> String {
        self.year.map_or_else(|| "n.d.".to_string(), |y| y.to_string())
    }

    /// Author names as a comma-separated string.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors.join(", ")
    }
}

/// Strip resolver prefixes from a DOI. Returns `None` for blank input.
#[must_use]
pub fn normalize_doi(raw: &str) -> Option<String> {
    const PREFIXES: &[&str] =
        &["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"];

    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let bare = PREFIXES
        .iter()
        .find(|prefix| lower.starts_with(*prefix))
        .map_or(trimmed, |prefix| trimmed[prefix.len()..].trim_start());

    if bare.is_empty() { None } else { Some(bare.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels_and_order() {
        assert_eq!(Source::SemanticScholar.to_string(), "Semantic Scholar");
        assert_eq!(Source::OpenAlex.label(), "OpenAlex");
        assert_eq!(Source::Arxiv.label(), "arXiv");
        assert!(Source::SemanticScholar < Source::OpenAlex);
        assert!(Source::OpenAlex < Source::Arxiv);
    }

    #[test]
    fn test_source_serializes_as_label() {
        let json = serde_json::to_string(&Source::Arxiv).unwrap();
        assert_eq!(json, "\"arXiv\"");
    }

    #[test]
    fn test_paper_camel_case_keys() {
        let mut paper = Paper::new(Source::OpenAlex, "W1", "Title", "Abstract");
        paper.citation_count = 7;
        let json = serde_json::to_value(&paper).unwrap();
        assert_eq!(json["citationCount"], 7);
        assert_eq!(json["abstract"], "Abstract");
        assert_eq!(json["source"], "OpenAlex");
    }

    #[test]
    fn test_is_complete() {
        assert!(Paper::new(Source::Arxiv, "1", "T", "A").is_complete());
        assert!(!Paper::new(Source::Arxiv, "1", "", "A").is_complete());
        assert!(!Paper::new(Source::Arxiv, "1", "T", "").is_complete());
        assert!(!Paper::new(Source::Arxiv, "1", "T", "   ").is_complete());
    }

    #[test]
    fn test_fingerprint_truncates_chars() {
        let paper = Paper::new(Source::Arxiv, "1", "Attention Is All You Need", "A");
        assert_eq!(paper.fingerprint(9), "attention");
        assert_eq!(paper.fingerprint(500), "attention is all you need");

        // Multi-byte chars count as one
        let paper = Paper::new(Source::Arxiv, "2", "Ünïcode Títle", "A");
        assert_eq!(paper.fingerprint(3), "ünï");
    }

    #[test]
    fn test_year_label() {
        let mut paper = Paper::new(Source::Arxiv, "1", "T", "A");
        assert_eq!(paper.year_label(), "n.d.");
        paper.year = Some(2017);
        assert_eq!(paper.year_label(), "2017");
    }

    #[test]
    fn test_normalize_doi() {
        assert_eq!(normalize_doi("https://doi.org/10.1000/xyz").as_deref(), Some("10.1000/xyz"));
        assert_eq!(normalize_doi("http://dx.doi.org/10.1/a").as_deref(), Some("10.1/a"));
        assert_eq!(normalize_doi("doi:10.1/b").as_deref(), Some("10.1/b"));
        assert_eq!(normalize_doi("HTTPS://DOI.ORG/10.1/C").as_deref(), Some("10.1/C"));
        assert_eq!(normalize_doi("10.1/plain").as_deref(), Some("10.1/plain"));
        assert_eq!(normalize_doi("  "), None);
        assert_eq!(normalize_doi("https://doi.org/"), None);
    }
}
