//! Error types for the adapter library.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while building requests, talking to a site, or
/// parsing its response.
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The site answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The site served a CAPTCHA challenge instead of results.
    #[error("CAPTCHA challenge from {0}")]
    Captcha(String),

    /// The site returned an API-level error or an inconsistent page.
    #[error("Engine API error: {0}")]
    Api(String),

    /// Search timeout exceeded.
    #[error("Search timeout exceeded")]
    Timeout,

    /// Invalid query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// An option value the engine recognizes but cannot serve.
    #[error("Unsupported option: {0}")]
    UnsupportedOption(String),

    /// No adapter is registered under the given name.
    #[error("Engine '{0}' not found")]
    UnknownEngine(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl SearchError {
    /// Returns true for errors raised while building a request.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidQuery(_) | SearchError::UnsupportedOption(_)
        )
    }
}
