//! Error types for the aggregation and caching core.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Source and store errors are internal: adapters and the result cache log and
//! swallow them. Only [`PipelineError`] reaches callers.

use std::time::Duration;

/// Errors from a single upstream search source.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The source did not answer within its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Rate limited by the upstream API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time, informational only (no retries are made)
        retry_after: Duration,
    },

    /// Any other non-success HTTP status
    #[error("Unexpected status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Atom/XML parsing error
    #[error("Failed to parse feed: {0}")]
    Xml(String),

    /// Endpoint URL could not be built
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl SourceError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create an unexpected status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into() }
    }

    /// Create an XML parse error.
    #[must_use]
    pub fn xml(message: impl std::fmt::Display) -> Self {
        Self::Xml(message.to_string())
    }

    /// Returns true if this error came from the upstream deadline.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Errors from the cache storage layer.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Could not establish the storage connection
    #[error("Storage connection failed: {0}")]
    Connect(String),

    /// Storage reachable but the operation failed
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a connection error.
    #[must_use]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Errors surfaced by the research pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The query was blank
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// The answer generator failed; nothing was cached
    #[error("Answer generation failed: {0}")]
    Generation(#[source] anyhow::Error),
}

impl PipelineError {
    /// Convert to a user-facing message.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::EmptyQuery => "Please enter a research question.".to_string(),
            Self::Generation(_) => {
                "Could not generate an answer right now. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_timeout() {
        assert!(SourceError::Timeout(Duration::from_secs(9)).is_timeout());
        assert!(!SourceError::rate_limited(60).is_timeout());
        assert!(!SourceError::status(500, "boom").is_timeout());
    }

    #[test]
    fn test_source_error_messages() {
        let err = SourceError::status(503, "Service Unavailable");
        assert!(err.to_string().contains("503"));

        let err = SourceError::rate_limited(30);
        assert!(err.to_string().contains("30s"));

        let err = SourceError::xml("unexpected EOF");
        assert!(err.to_string().contains("unexpected EOF"));
    }

    #[test]
    fn test_store_error_messages() {
        assert!(StoreError::connect("refused").to_string().contains("refused"));
        assert!(StoreError::unavailable("disk full").to_string().contains("disk full"));
    }

    #[test]
    fn test_pipeline_error_user_message() {
        let err = PipelineError::EmptyQuery;
        assert!(err.to_user_message().contains("research question"));

        let err = PipelineError::Generation(anyhow::anyhow!("upstream 500"));
        assert!(!err.to_user_message().contains("upstream"));
        assert!(err.to_string().contains("upstream 500"));
    }
}
