//! Query normalization into stable cache keys.
//!
//! Two queries that differ only in case, punctuation, surrounding whitespace or
//! stop words share a key. Word order is kept: "gut microbiome mental health"
//! and "mental health gut microbiome" are different keys.

use std::sync::LazyLock;

use regex::Regex;

/// Anything that is neither a word character nor whitespace.
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// Words removed from keys. Includes the apostrophe-stripped interrogatives
/// ("what's" becomes "whats" after punctuation removal).
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", //
    "in", "of", "for", "to", //
    "and", "or", //
    "is", "are", "was", "were", //
    "what", "how", "why", "when", "where", "which", //
    "whats", "hows", "whys", "whens", "wheres", "whos",
];

/// Canonicalize free text into a cache key.
///
/// Lowercases, trims, strips punctuation, collapses whitespace and drops
/// [`STOP_WORDS`]. Idempotent: `normalize_query(&normalize_query(x)) == normalize_query(x)`.
#[must_use]
pub fn normalize_query(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(lowered.trim(), "");

    // Splitting on whitespace collapses runs and trims; filtering whole words
    // cannot leave doubled separators behind.
    stripped
        .split_whitespace()
        .filter(|word| !is_stop_word(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a key is usable for caching. Queries made only of stop words and
/// punctuation normalize to "" and would otherwise all collide.
#[must_use]
pub fn is_cacheable_key(key: &str) -> bool {
    !key.is_empty()
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}
