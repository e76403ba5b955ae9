//! Engine adapter trait and configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{OptionKind, RequestSpec, Result, SearchError, SearchQuery, SearchResult};

/// Categories for search engines.
///
/// Also used as the `category` option for engines that serve several
/// verticals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineCategory {
    #[default]
    General,
    Images,
    It,
    Science,
    Shopping,
}

impl EngineCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineCategory::General => "general",
            EngineCategory::Images => "images",
            EngineCategory::It => "it",
            EngineCategory::Science => "science",
            EngineCategory::Shopping => "shopping",
        }
    }
}

impl fmt::Display for EngineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineCategory {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(EngineCategory::General),
            "images" => Ok(EngineCategory::Images),
            "it" => Ok(EngineCategory::It),
            "science" => Ok(EngineCategory::Science),
            "shopping" => Ok(EngineCategory::Shopping),
            other => Err(SearchError::UnsupportedOption(format!(
                "unknown category '{}'",
                other
            ))),
        }
    }
}

/// Configuration for a search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name of the engine.
    pub name: String,
    /// Short identifier (e.g., "wiki" for Wikipedia).
    pub shortcut: String,
    /// Categories this engine belongs to.
    pub categories: Vec<EngineCategory>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Whether the engine is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Whether pagination is supported.
    #[serde(default)]
    pub paging: bool,
    /// Optional parameters this engine honors.
    #[serde(default)]
    pub options: Vec<OptionKind>,
}

fn default_timeout() -> u64 {
    5
}

fn default_enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            shortcut: String::new(),
            categories: vec![EngineCategory::General],
            timeout: 5,
            enabled: true,
            paging: false,
            options: Vec::new(),
        }
    }
}

/// Trait for implementing search engine adapters.
///
/// An adapter never performs I/O: [`request`](Engine::request) describes the
/// HTTP call to make and [`parse`](Engine::parse) turns the raw body into
/// results. Both are pure, so one adapter can serve any number of concurrent
/// searches.
pub trait Engine: Send + Sync {
    /// Returns the engine configuration.
    fn config(&self) -> &EngineConfig;

    /// Builds the request for a query.
    ///
    /// Fails with [`SearchError::InvalidQuery`] or
    /// [`SearchError::UnsupportedOption`] only.
    fn request(&self, query: &SearchQuery) -> Result<RequestSpec>;

    /// Parses a response body, reporting why parsing failed if it did.
    fn parse(&self, body: &str, query: &SearchQuery) -> Result<Vec<SearchResult>>;

    /// Parses a response body, degrading any failure to an empty list.
    fn parse_response(&self, body: &str, query: &SearchQuery) -> Vec<SearchResult> {
        match self.parse(body, query) {
            Ok(results) => results,
            Err(e) => {
                warn!("Engine {} could not parse response: {}", self.name(), e);
                Vec::new()
            }
        }
    }

    /// Returns whether a response status should be handed to
    /// [`parse`](Engine::parse). Defaults to 2xx only.
    fn accepts_status(&self, status: u16) -> bool {
        (200..300).contains(&status)
    }

    /// Returns the engine name.
    fn name(&self) -> &str {
        &self.config().name
    }

    /// Returns the engine shortcut.
    fn shortcut(&self) -> &str {
        &self.config().shortcut
    }

    /// Returns whether the engine is enabled.
    fn is_enabled(&self) -> bool {
        self.config().enabled
    }

    /// Returns whether the engine reads the given option.
    fn honors(&self, option: OptionKind) -> bool {
        self.config().options.contains(&option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticEngine {
        config: EngineConfig,
    }

    impl Engine for StaticEngine {
        fn config(&self) -> &EngineConfig {
            &self.config
        }

        fn request(&self, query: &SearchQuery) -> Result<RequestSpec> {
            query.validate()?;
            Ok(RequestSpec::get(format!(
                "https://example.com/?q={}",
                urlencoding::encode(&query.query)
            )))
        }

        fn parse(&self, body: &str, _query: &SearchQuery) -> Result<Vec<SearchResult>> {
            if body == "ok" {
                Ok(vec![SearchResult::new("https://example.com", "Example", "")])
            } else {
                Err(SearchError::Parse("not ok".into()))
            }
        }
    }

    fn engine() -> StaticEngine {
        StaticEngine {
            config: EngineConfig {
                name: "Static".to_string(),
                shortcut: "st".to_string(),
                options: vec![OptionKind::Language],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_engine_category_default() {
        let default: EngineCategory = Default::default();
        assert_eq!(default, EngineCategory::General);
    }

    #[test]
    fn test_engine_category_from_str() {
        assert_eq!("images".parse::<EngineCategory>().unwrap(), EngineCategory::Images);
        assert_eq!("IT".parse::<EngineCategory>().unwrap(), EngineCategory::It);
        assert!("maps".parse::<EngineCategory>().is_err());
    }

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.name, "");
        assert_eq!(config.shortcut, "");
        assert_eq!(config.categories, vec![EngineCategory::General]);
        assert_eq!(config.timeout, 5);
        assert!(config.enabled);
        assert!(!config.paging);
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_engine_config_deserialization() {
        let json = r#"{"name":"Test","shortcut":"t","categories":["general"],"options":["time_range"]}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name, "Test");
        assert_eq!(config.timeout, 5); // default
        assert!(config.enabled); // default
        assert_eq!(config.options, vec![OptionKind::TimeRange]);
    }

    #[test]
    fn test_engine_category_serialization() {
        let json = serde_json::to_string(&EngineCategory::Shopping).unwrap();
        assert_eq!(json, "\"shopping\"");
    }

    #[test]
    fn test_engine_trait_defaults() {
        let engine = engine();
        assert_eq!(engine.name(), "Static");
        assert_eq!(engine.shortcut(), "st");
        assert!(engine.is_enabled());
        assert!(engine.honors(OptionKind::Language));
        assert!(!engine.honors(OptionKind::TimeRange));
        assert!(engine.accepts_status(200));
        assert!(!engine.accepts_status(404));
    }

    #[test]
    fn test_parse_response_degrades_to_empty() {
        let engine = engine();
        let query = SearchQuery::new("rust");
        assert_eq!(engine.parse_response("ok", &query).len(), 1);
        assert!(engine.parse_response("garbage", &query).is_empty());
    }
}
