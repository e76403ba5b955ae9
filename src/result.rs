//! Search result types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single normalized search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result URL.
    pub url: String,
    /// Result title.
    pub title: String,
    /// Result description/snippet. May be empty.
    pub content: String,
    /// Thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Published or last-updated date (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl SearchResult {
    /// Creates a new search result.
    pub fn new(url: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
            thumbnail: None,
            published_date: None,
        }
    }

    /// Sets the thumbnail URL.
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Sets the published date.
    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }

    /// Builds a result only when both `url` and `title` are non-empty after
    /// trimming.
    pub fn checked(url: &str, title: &str, content: &str) -> Option<Self> {
        let url = url.trim();
        let title = title.trim();
        if url.is_empty() || title.is_empty() {
            return None;
        }
        Some(Self::new(url, title, content.trim()))
    }
}

/// Why an engine contributed no results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No adapter is registered under the requested name.
    NotFound,
    /// The adapter rejected the query or its options.
    RequestBuild,
    /// Network failure or non-success HTTP status.
    Transport,
    /// The per-engine timeout elapsed.
    Timeout,
    /// The response body could not be turned into results.
    Parse,
    /// The batch deadline passed before the engine finished.
    Cancelled,
    /// The adapter panicked.
    Unexpected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::NotFound => "not found",
            FailureKind::RequestBuild => "request-build failure",
            FailureKind::Transport => "transport error",
            FailureKind::Timeout => "timeout",
            FailureKind::Parse => "parse error",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Unexpected => "unexpected error",
        };
        f.write_str(label)
    }
}

/// A classified per-engine failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    pub kind: FailureKind,
    pub reason: String,
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)
    }
}

/// What a single engine produced during a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOutcome {
    /// Engine name as requested by the caller.
    pub engine: String,
    /// Results in the engine's own order.
    pub results: Vec<SearchResult>,
    /// Set when the engine failed; `results` is then empty.
    pub failure: Option<EngineFailure>,
    /// Time spent on this engine in milliseconds.
    pub duration_ms: u64,
}

impl EngineOutcome {
    /// Creates a successful outcome.
    pub fn succeeded(engine: impl Into<String>, results: Vec<SearchResult>) -> Self {
        Self {
            engine: engine.into(),
            results,
            failure: None,
            duration_ms: 0,
        }
    }

    /// Creates a failed outcome with no results.
    pub fn failed(engine: impl Into<String>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            results: Vec::new(),
            failure: Some(EngineFailure {
                kind,
                reason: reason.into(),
            }),
            duration_ms: 0,
        }
    }

    /// Sets the duration.
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Returns whether the engine failed.
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Returns the failure kind, if any.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|f| f.kind)
    }
}

/// Per-engine results of one search, in the order the engines were requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    outcomes: Vec<EngineOutcome>,
    /// Total search duration in milliseconds.
    pub duration_ms: u64,
}

impl SearchResults {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container from outcomes.
    pub fn from_outcomes(outcomes: Vec<EngineOutcome>) -> Self {
        Self {
            outcomes,
            duration_ms: 0,
        }
    }

    /// Returns all outcomes.
    pub fn outcomes(&self) -> &[EngineOutcome] {
        &self.outcomes
    }

    /// Returns the outcome for an engine name (case-insensitive).
    pub fn outcome(&self, engine: &str) -> Option<&EngineOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.engine.eq_ignore_ascii_case(engine))
    }

    /// Iterates over every result paired with the engine that produced it.
    pub fn items(&self) -> impl Iterator<Item = (&str, &SearchResult)> {
        self.outcomes
            .iter()
            .flat_map(|o| o.results.iter().map(move |r| (o.engine.as_str(), r)))
    }

    /// Returns the outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &EngineOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Total number of results across engines.
    pub fn count(&self) -> usize {
        self.outcomes.iter().map(|o| o.results.len()).sum()
    }

    /// Sets the search duration.
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_new() {
        let result = SearchResult::new("https://example.com", "Title", "Content");
        assert_eq!(result.url, "https://example.com");
        assert_eq!(result.title, "Title");
        assert_eq!(result.content, "Content");
        assert!(result.thumbnail.is_none());
        assert!(result.published_date.is_none());
    }

    #[test]
    fn test_search_result_builders() {
        let result = SearchResult::new("url", "title", "content")
            .with_thumbnail("https://example.com/thumb.jpg")
            .with_published_date("2024-01-15T00:00:00Z");
        assert_eq!(result.thumbnail.as_deref(), Some("https://example.com/thumb.jpg"));
        assert_eq!(result.published_date.as_deref(), Some("2024-01-15T00:00:00Z"));
    }

    #[test]
    fn test_checked_trims_and_requires_fields() {
        let result = SearchResult::checked(" https://a.com ", " A ", " body ").unwrap();
        assert_eq!(result.url, "https://a.com");
        assert_eq!(result.title, "A");
        assert_eq!(result.content, "body");

        assert!(SearchResult::checked("", "A", "").is_none());
        assert!(SearchResult::checked("https://a.com", "   ", "").is_none());
    }

    #[test]
    fn test_search_result_serialization_skips_empty_extras() {
        let result = SearchResult::new("https://example.com", "Title", "Content");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"url\":\"https://example.com\""));
        assert!(!json.contains("thumbnail"));
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = EngineOutcome::succeeded("bing", vec![SearchResult::new("u", "t", "")]);
        assert!(!ok.is_failure());
        assert_eq!(ok.failure_kind(), None);

        let failed = EngineOutcome::failed("quark", FailureKind::Timeout, "5s").with_duration(5000);
        assert!(failed.is_failure());
        assert_eq!(failed.failure_kind(), Some(FailureKind::Timeout));
        assert!(failed.results.is_empty());
        assert_eq!(failed.duration_ms, 5000);
    }

    #[test]
    fn test_failure_display() {
        let failure = EngineFailure {
            kind: FailureKind::Transport,
            reason: "HTTP status 503".into(),
        };
        assert_eq!(failure.to_string(), "transport error: HTTP status 503");
    }

    #[test]
    fn test_failure_kind_serialization() {
        let json = serde_json::to_string(&FailureKind::RequestBuild).unwrap();
        assert_eq!(json, "\"request_build\"");
    }

    #[test]
    fn test_search_results_accessors() {
        let results = SearchResults::from_outcomes(vec![
            EngineOutcome::succeeded(
                "GitHub",
                vec![
                    SearchResult::new("https://github.com/a/b", "a/b", ""),
                    SearchResult::new("https://github.com/c/d", "c/d", ""),
                ],
            ),
            EngineOutcome::failed("ebay", FailureKind::Transport, "HTTP status 403"),
        ]);

        assert_eq!(results.count(), 2);
        assert_eq!(results.outcomes().len(), 2);
        assert_eq!(results.outcome("github").unwrap().results.len(), 2);
        assert_eq!(results.failures().count(), 1);

        let items: Vec<_> = results.items().collect();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|(engine, _)| *engine == "GitHub"));
    }

    #[test]
    fn test_search_results_set_duration() {
        let mut results = SearchResults::new();
        results.set_duration(150);
        assert_eq!(results.duration_ms, 150);
        assert_eq!(results.count(), 0);
    }
}
