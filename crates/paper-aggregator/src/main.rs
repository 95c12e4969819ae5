//! Paper Aggregator - Entry Point
//!
//! Command-line access to the query normalizer and the multi-source search.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paper_aggregator::{Aggregator, config::Config, formatters, normalize_query};

#[derive(Parser, Debug)]
#[command(name = "paper-aggregator")]
#[command(about = "Search Semantic Scholar, OpenAlex and arXiv at once")]
#[command(version)]
struct Cli {
    /// Semantic Scholar API key (optional, enables higher rate limits)
    #[arg(long, env = "SEMANTIC_SCHOLAR_API_KEY", global = true)]
    api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the cache key a query normalizes to
    Normalize {
        /// Research question
        query: String,
    },

    /// Search every source and print the merged ranking
    Search {
        /// Research question
        query: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable Markdown
    #[default]
    Markdown,
    /// Compact JSON
    Json,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    match cli.command {
        Command::Normalize { query } => {
            println!("{}", normalize_query(&query));
        }
        Command::Search { query, format } => {
            let mut config = Config::from_env()?;
            if cli.api_key.is_some() {
                config.semantic_scholar_api_key = cli.api_key;
            }

            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                api_key = config.has_api_key(),
                "Searching all sources"
            );

            let aggregator = Aggregator::from_config(&config)?;
            let papers = aggregator.search_all(&query).await;
            tracing::info!(count = papers.len(), "Search finished");

            let output = match format {
                OutputFormat::Markdown => formatters::format_papers_markdown(&papers),
                OutputFormat::Json => {
                    let compact: Vec<_> = papers.iter().map(formatters::compact_paper).collect();
                    serde_json::to_string_pretty(&compact)?
                }
            };
            println!("{output}");
        }
    }

    Ok(())
}
