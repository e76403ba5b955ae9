//! Wikipedia engine using the REST v1 page summary API.

use serde_json::Value;

use crate::util::{html_to_text, primary_language};
use crate::{
    Engine, EngineCategory, EngineConfig, OptionKind, RequestSpec, Result, SearchError, SearchQuery,
    SearchResult,
};

const DEFAULT_LANGUAGE: &str = "en";
const INVALID_TITLE_TYPE: &str = "https://mediawiki.org/wiki/HyperSwitch/errors/bad_request";

/// Wikipedia article summary lookup.
///
/// Returns at most one result: the article whose title matches the query.
/// The requested language selects the wiki (`zh-CN` → zh.wikipedia.org) and
/// is also sent as `Accept-Language` so wikis with script variants answer in
/// the requested one.
pub struct Wikipedia {
    config: EngineConfig,
}

impl Wikipedia {
    /// Creates a new Wikipedia engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "Wikipedia".to_string(),
                shortcut: "wiki".to_string(),
                categories: vec![EngineCategory::General],
                timeout: 5,
                enabled: true,
                paging: false,
                options: vec![OptionKind::Language],
            },
        }
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for Wikipedia {
    fn default() -> Self {
        Self::new()
    }
}

/// Title-cases an all-lowercase query so it matches article titles.
///
/// A letter is capitalized when the character before it is not a letter,
/// so `"rust's"` becomes `"Rust'S"` and `"3d"` becomes `"3D"`.
fn article_title(query: &str) -> String {
    let query = query.trim();
    let has_lower = query.chars().any(char::is_lowercase);
    let has_upper = query.chars().any(char::is_uppercase);
    if !has_lower || has_upper {
        return query.to_string();
    }

    let mut title = String::with_capacity(query.len());
    let mut word_start = true;
    for c in query.chars() {
        if word_start {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        word_start = !(c.is_lowercase() || c.is_uppercase());
    }
    title
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str).filter(|s| !s.is_empty())
}

impl Engine for Wikipedia {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request(&self, query: &SearchQuery) -> Result<RequestSpec> {
        query.validate()?;

        let tag = query
            .options
            .language
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);
        let wiki = primary_language(tag).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let url = format!(
            "https://{}.wikipedia.org/api/rest_v1/page/summary/{}",
            wiki,
            urlencoding::encode(&article_title(&query.query))
        );
        Ok(RequestSpec::get(url).with_header("Accept-Language", tag))
    }

    fn parse(&self, body: &str, _query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let summary: Value = serde_json::from_str(body)
            .map_err(|e| SearchError::Parse(format!("Wikipedia JSON: {}", e)))?;

        let kind = str_at(&summary, "/type");
        match kind {
            Some(t) if t.ends_with("/not_found") => return Ok(Vec::new()),
            Some(INVALID_TITLE_TYPE)
                if str_at(&summary, "/detail") == Some("title-invalid-characters") =>
            {
                return Ok(Vec::new())
            }
            Some(t) if t.contains("/errors/") => {
                let detail = str_at(&summary, "/detail").unwrap_or(t);
                return Err(SearchError::Api(format!("Wikipedia: {}", detail)));
            }
            _ => {}
        }

        let title = str_at(&summary, "/titles/display")
            .or_else(|| str_at(&summary, "/title"))
            .map(html_to_text)
            .unwrap_or_default();
        let url = str_at(&summary, "/content_urls/desktop/page").unwrap_or_default();
        let extract = str_at(&summary, "/extract");
        // Disambiguation and other non-article pages describe themselves
        let content = match kind {
            Some("standard") => extract,
            _ => str_at(&summary, "/description").or(extract),
        }
        .unwrap_or_default();

        let Some(mut result) = SearchResult::checked(url, &title, content) else {
            return Ok(Vec::new());
        };
        if let Some(thumbnail) = str_at(&summary, "/thumbnail/source") {
            result = result.with_thumbnail(thumbnail);
        }
        Ok(vec![result])
    }

    fn accepts_status(&self, status: u16) -> bool {
        // 404 is "no such article" and 400 may be "invalid title"; parse decides
        (200..300).contains(&status) || status == 400 || status == 404
    }
}
