//! Search query representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{EngineCategory, Result, SearchError};

/// Time range filter for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Length of the range in seconds.
    pub fn seconds(self) -> i64 {
        const DAY: i64 = 86_400;
        match self {
            TimeRange::Day => DAY,
            TimeRange::Week => 7 * DAY,
            TimeRange::Month => 30 * DAY,
            TimeRange::Year => 365 * DAY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimeRange::Day),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            other => Err(SearchError::UnsupportedOption(format!(
                "unknown time range '{}'",
                other
            ))),
        }
    }
}

/// The optional parameters an engine may honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    TimeRange,
    Language,
    Category,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::TimeRange => "time_range",
            OptionKind::Language => "language",
            OptionKind::Category => "category",
        };
        f.write_str(name)
    }
}

/// Engine-specific optional parameters.
///
/// Every engine reads only the fields it declares in
/// [`EngineConfig::options`](crate::EngineConfig); the rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Restrict results to a recent time window.
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    /// Language tag (e.g. "en", "zh-CN").
    #[serde(default)]
    pub language: Option<String>,
    /// Vertical to search (general, images, ...).
    #[serde(default)]
    pub category: Option<EngineCategory>,
}

impl EngineOptions {
    /// Returns the kinds of options that are currently set.
    pub fn set_kinds(&self) -> Vec<OptionKind> {
        let mut kinds = Vec::new();
        if self.time_range.is_some() {
            kinds.push(OptionKind::TimeRange);
        }
        if self.language.is_some() {
            kinds.push(OptionKind::Language);
        }
        if self.category.is_some() {
            kinds.push(OptionKind::Category);
        }
        kinds
    }
}

/// A search query with all parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search terms.
    pub query: String,
    /// Page number (1-indexed).
    pub page: u32,
    /// Engine-specific options.
    #[serde(default)]
    pub options: EngineOptions,
    /// Unix timestamp (seconds) the query was issued at. Engines derive
    /// relative time windows from it instead of reading the clock.
    pub issued_at: i64,
}

impl SearchQuery {
    /// Creates a new search query with the given terms.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            options: EngineOptions::default(),
            issued_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the time range filter.
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.options.time_range = Some(range);
        self
    }

    /// Sets the language/locale.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.options.language = Some(language.into());
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: EngineCategory) -> Self {
        self.options.category = Some(category);
        self
    }

    /// Replaces all engine options.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Pins the issue timestamp.
    pub fn with_issued_at(mut self, issued_at: i64) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Zero-based offset of the first result on the current page.
    ///
    /// Fails with [`SearchError::InvalidQuery`] when the page is so deep
    /// that the offset does not fit in a `u32`.
    pub fn offset(&self, per_page: u32) -> Result<u32> {
        self.page
            .saturating_sub(1)
            .checked_mul(per_page)
            .ok_or_else(|| {
                SearchError::InvalidQuery(format!("Page number {} is out of range", self.page))
            })
    }

    /// Checks the invariants every engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("Query cannot be empty".into()));
        }
        if self.page == 0 {
            return Err(SearchError::InvalidQuery(
                "Page number must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_new() {
        let query = SearchQuery::new("test query");
        assert_eq!(query.query, "test query");
        assert_eq!(query.page, 1);
        assert_eq!(query.options, EngineOptions::default());
        assert!(query.issued_at > 0);
    }

    #[test]
    fn test_search_query_builder_chain() {
        let query = SearchQuery::new("rust programming")
            .with_language("en")
            .with_page(2)
            .with_time_range(TimeRange::Month)
            .with_category(EngineCategory::Images)
            .with_issued_at(1_700_000_000);

        assert_eq!(query.query, "rust programming");
        assert_eq!(query.page, 2);
        assert_eq!(query.options.language, Some("en".to_string()));
        assert_eq!(query.options.time_range, Some(TimeRange::Month));
        assert_eq!(query.options.category, Some(EngineCategory::Images));
        assert_eq!(query.issued_at, 1_700_000_000);
    }

    #[test]
    fn test_offset() {
        assert_eq!(SearchQuery::new("q").offset(10).unwrap(), 0);
        assert_eq!(SearchQuery::new("q").with_page(3).offset(10).unwrap(), 20);
        assert_eq!(SearchQuery::new("q").with_page(0).offset(10).unwrap(), 0);
    }

    #[test]
    fn test_offset_out_of_range() {
        let query = SearchQuery::new("q").with_page(u32::MAX);
        assert!(matches!(query.offset(10), Err(SearchError::InvalidQuery(_))));
        assert_eq!(query.offset(1).unwrap(), u32::MAX - 1);
    }

    #[test]
    fn test_validate_rejects_empty_query() {
        for q in ["", "   ", "\t\n  "] {
            let result = SearchQuery::new(q).validate();
            assert!(matches!(result, Err(SearchError::InvalidQuery(_))));
        }
    }

    #[test]
    fn test_validate_rejects_page_zero() {
        let result = SearchQuery::new("rust").with_page(0).validate();
        assert!(matches!(result, Err(SearchError::InvalidQuery(_))));
    }

    #[test]
    fn test_validate_accepts_valid_query() {
        assert!(SearchQuery::new("rust").with_page(4).validate().is_ok());
    }

    #[test]
    fn test_set_kinds() {
        let options = EngineOptions {
            time_range: Some(TimeRange::Day),
            language: None,
            category: Some(EngineCategory::General),
        };
        assert_eq!(
            options.set_kinds(),
            vec![OptionKind::TimeRange, OptionKind::Category]
        );
        assert!(EngineOptions::default().set_kinds().is_empty());
    }

    #[test]
    fn test_time_range_from_str() {
        assert_eq!("day".parse::<TimeRange>().unwrap(), TimeRange::Day);
        assert_eq!("Week".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert!("decade".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_time_range_seconds() {
        assert_eq!(TimeRange::Day.seconds(), 86_400);
        assert_eq!(TimeRange::Week.seconds(), 604_800);
        assert_eq!(TimeRange::Year.seconds(), 365 * 86_400);
    }

    #[test]
    fn test_option_kind_display() {
        assert_eq!(OptionKind::TimeRange.to_string(), "time_range");
        assert_eq!(OptionKind::Language.to_string(), "language");
    }

    #[test]
    fn test_search_query_serialization() {
        let query = SearchQuery::new("test").with_time_range(TimeRange::Year);
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"query\":\"test\""));
        assert!(json.contains("\"time_range\":\"year\""));
    }

    #[test]
    fn test_search_query_deserialization() {
        let json = r#"{"query":"test","page":2,"issued_at":0}"#;
        let query: SearchQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.query, "test");
        assert_eq!(query.page, 2);
        assert!(query.options.language.is_none());
    }
}
