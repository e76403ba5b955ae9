//! GitHub repository search using the REST search API.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::util::normalize_date;
use crate::{Engine, EngineCategory, EngineConfig, RequestSpec, Result, SearchError, SearchQuery, SearchResult};

const ACCEPT_HEADER: &str = "application/vnd.github.preview.text-match+json";

/// GitHub repository search, sorted by stars.
pub struct GitHub {
    config: EngineConfig,
}

impl GitHub {
    /// Creates a new GitHub engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "GitHub".to_string(),
                shortcut: "gh".to_string(),
                categories: vec![EngineCategory::It],
                timeout: 5,
                enabled: true,
                paging: true,
                options: Vec::new(),
            },
        }
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for GitHub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    items: Option<Vec<Value>>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct Repository {
    full_name: Option<String>,
    html_url: Option<String>,
    description: Option<String>,
    language: Option<String>,
    owner: Option<Owner>,
    updated_at: Option<String>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct Owner {
    avatar_url: Option<String>,
}

impl Repository {
    fn into_result(self) -> Option<SearchResult> {
        let url = self.html_url?;
        if !url.starts_with("https://github.com/") {
            return None;
        }

        let content = [self.language, self.description]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" / ");

        let mut result = SearchResult::checked(&url, self.full_name.as_deref()?, &content)?;
        if let Some(avatar) = self.owner.and_then(|o| o.avatar_url) {
            result = result.with_thumbnail(avatar);
        }
        if let Some(date) = self
            .updated_at
            .or(self.created_at)
            .as_deref()
            .and_then(normalize_date)
        {
            result = result.with_published_date(date);
        }
        Some(result)
    }
}

impl Engine for GitHub {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request(&self, query: &SearchQuery) -> Result<RequestSpec> {
        query.validate()?;
        let url = format!(
            "https://api.github.com/search/repositories?q={}&sort=stars&order=desc&page={}",
            urlencoding::encode(&query.query),
            query.page
        );
        Ok(RequestSpec::get(url).with_header("Accept", ACCEPT_HEADER))
    }

    fn parse(&self, body: &str, _query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let response: SearchResponse = serde_json::from_str(body)
            .map_err(|e| SearchError::Parse(format!("GitHub JSON: {}", e)))?;

        let items = match (response.items, response.message) {
            (Some(items), _) => items,
            (None, Some(message)) => return Err(SearchError::Api(message)),
            (None, None) => return Ok(Vec::new()),
        };

        let total = items.len();
        let results: Vec<SearchResult> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Repository>(item).ok())
            .filter_map(Repository::into_result)
            .collect();

        if results.len() < total {
            debug!("GitHub skipped {} malformed items", total - results.len());
        }
        Ok(results)
    }
}
