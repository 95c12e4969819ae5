//! Markdown output formatting.

use std::fmt::Write;

use crate::models::Paper;

const ABSTRACT_PREVIEW_CHARS: usize = 300;

/// Format a list of papers as Markdown.
#[must_use]
pub fn format_papers_markdown(papers: &[Paper]) -> String {
    if papers.is_empty() {
        return "No papers found.".to_string();
    }

    let mut output = format!("# Papers ({} results)\n\n", papers.len());

    for (i, paper) in papers.iter().enumerate() {
        output.push_str(&format_paper_markdown(paper, i + 1));
        output.push_str("\n---\n\n");
    }

    output
}

/// Format a single paper as Markdown.
#[must_use]
pub fn format_paper_markdown(paper: &Paper, index: usize) -> String {
    let mut output = String::new();

    let _ = write!(output, "## {}. {}\n\n", index, paper.title);

    if !paper.authors.is_empty() {
        let _ = write!(output, "**Authors**: {}\n\n", paper.author_names());
    }

    let mut meta = vec![
        format!("**Year**: {}", paper.year_label()),
        format!("**Citations**: {}", paper.citation_count),
        format!("**Source**: {}", paper.source),
    ];
    if let Some(journal) = &paper.journal {
        meta.push(format!("**Journal**: {journal}"));
    }
    let _ = write!(output, "{}\n\n", meta.join(" | "));

    let mut links = Vec::new();
    if let Some(doi) = &paper.doi {
        links.push(format!("[DOI](https://doi.org/{doi})"));
    }
    if let Some(url) = &paper.url {
        links.push(format!("[Full text]({url})"));
    }
    if !links.is_empty() {
        let _ = write!(output, "**Links**: {}\n\n", links.join(" | "));
    }

    if !paper.r#abstract.is_empty() {
        let _ = writeln!(output, "**Abstract**: {}", abstract_preview(&paper.r#abstract));
    }

    output
}

/// First 300 characters of an abstract, with an ellipsis when cut.
fn abstract_preview(text: &str) -> String {
    match text.char_indices().nth(ABSTRACT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
