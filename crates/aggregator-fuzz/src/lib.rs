//! Fuzzing library for paper-aggregator.
//!
//! This crate provides fuzzing targets for the query normalizer and the
//! upstream response parsers.
//!
//! # Usage
//!
//! ```bash
//! cd crates/aggregator-fuzz
//! cargo +nightly fuzz run fuzz_arxiv_feed -- -max_total_time=60
//! ```

pub use paper_aggregator::{normalize, sources};
