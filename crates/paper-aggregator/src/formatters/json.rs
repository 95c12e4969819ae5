//! JSON output formatting.

use serde_json::{Value, json};

use crate::models::Paper;
use crate::pipeline::ResearchOutcome;

/// Create a compact paper representation for JSON output.
///
/// Drops the abstract and any absent optional fields.
#[must_use]
pub fn compact_paper(paper: &Paper) -> Value {
    let mut obj = json!({
        "id": paper.id,
        "title": paper.title,
        "year": paper.year,
        "citations": paper.citation_count,
        "source": paper.source,
    });

    if !paper.authors.is_empty() {
        obj["authors"] = json!(paper.authors);
    }

    if let Some(journal) = &paper.journal {
        obj["journal"] = json!(journal);
    }

    if let Some(doi) = &paper.doi {
        obj["doi"] = json!(doi);
    }

    if let Some(url) = &paper.url {
        obj["url"] = json!(url);
    }

    obj
}

/// Create a compact representation of a research outcome.
#[must_use]
pub fn compact_outcome(outcome: &ResearchOutcome) -> Value {
    let status = match outcome {
        ResearchOutcome::Cached { .. } => "cached",
        ResearchOutcome::Fresh { .. } => "fresh",
        ResearchOutcome::NoPapers => "noPapers",
    };

    let mut obj = json!({
        "status": status,
        "papers": outcome.papers().iter().map(compact_paper).collect::<Vec<_>>(),
    });

    if let Some(answer) = outcome.answer() {
        obj["answer"] = json!(answer);
    }

    obj
}
