//! Paper Aggregator
//!
//! Searches several academic sources for a research question, merges the
//! results into one ranked list, and caches generated answers under a
//! normalized form of the question.
//!
//! # Features
//!
//! - **Three sources**: Semantic Scholar, OpenAlex and arXiv, queried concurrently
//! - **Never fails**: a slow or broken source just contributes nothing
//! - **Deduplicated**: title-prefix dedup, ranked by citation count
//! - **Cached**: answers keyed by a stop-word-free normalized query
//!
//! # Example
//!
//! ```no_run
//! use paper_aggregator::{Aggregator, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let aggregator = Aggregator::from_config(&config)?;
//!
//!     for paper in aggregator.search_all("What is CRISPR?").await {
//!         println!("{} ({})", paper.title, paper.source);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod sources;

pub use aggregator::{Aggregator, MergePolicy, merge_results};
pub use cache::ResultCache;
pub use config::Config;
pub use error::{PipelineError, SourceError, StoreError};
pub use normalize::normalize_query;
pub use pipeline::{AnswerGenerator, ResearchOutcome, ResearchPipeline};
