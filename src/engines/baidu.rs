//! Baidu search engine implementation.
//!
//! Baidu serves three verticals through different endpoints: web search
//! (`tn=json`), image search (`acjson`) and the developer search on
//! kaifa.baidu.com. The web endpoint does not always honor `tn=json`, so its
//! parser falls back to the HTML result page.

use scraper::Html;
use serde_json::Value;
use tracing::debug;

use crate::util::{element_text, html_to_text, selector, url_host, BROWSER_USER_AGENT};
use crate::{
    Engine, EngineCategory, EngineConfig, OptionKind, RequestSpec, Result, SearchError, SearchQuery,
    SearchResult,
};

const RESULTS_PER_PAGE: u32 = 10;
const CAPTCHA_MARKER: &str = "wappass.baidu.com/static/captcha";

/// Baidu search engine (百度).
pub struct Baidu {
    config: EngineConfig,
}

impl Baidu {
    /// Creates a new Baidu engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "Baidu".to_string(),
                shortcut: "baidu".to_string(),
                categories: vec![
                    EngineCategory::General,
                    EngineCategory::Images,
                    EngineCategory::It,
                ],
                timeout: 10,
                enabled: true,
                paging: true,
                options: vec![OptionKind::TimeRange, OptionKind::Category],
            },
        }
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for Baidu {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the vertical to search; `None` means general.
fn vertical(query: &SearchQuery) -> Result<EngineCategory> {
    match query.options.category.unwrap_or_default() {
        c @ (EngineCategory::General | EngineCategory::Images | EngineCategory::It) => Ok(c),
        other => Err(SearchError::UnsupportedOption(format!(
            "Baidu does not serve category '{}'",
            other
        ))),
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn parse_json(body: &str, what: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| SearchError::Parse(format!("Baidu {} JSON: {}", what, e)))
}

fn parse_general(body: &str) -> Result<Vec<SearchResult>> {
    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(_) => return parse_general_html(body),
    };

    let Some(entries) = data.pointer("/feed/entry").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut results = Vec::new();
    for entry in entries {
        let (Some(title), Some(url)) = (str_field(entry, "title"), str_field(entry, "url")) else {
            continue;
        };
        // Baidu's own properties (baike, zhidao, tieba) are noise here
        if url_host(url).ends_with("baidu.com") {
            continue;
        }
        let content = str_field(entry, "abs").map(html_to_text).unwrap_or_default();
        if let Some(result) = SearchResult::checked(url, &html_to_text(title), &content) {
            results.push(result);
        }
    }
    Ok(results)
}

fn parse_general_html(html: &str) -> Result<Vec<SearchResult>> {
    let document = Html::parse_document(html);

    let result_selector = selector("#content_left .result, #content_left .c-container")?;
    let title_selector = selector("h3 a, .t a")?;
    let snippet_selector = selector(".c-abstract, .c-span-last, [class^=content-right]")?;

    let mut results = Vec::new();

    for element in document.select(&result_selector) {
        let Some(title_elem) = element.select(&title_selector).next() else {
            continue;
        };

        let title = element_text(title_elem);
        let url = title_elem.value().attr("href").unwrap_or_default();
        let content = element
            .select(&snippet_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if let Some(result) = SearchResult::checked(url, &title, &content) {
            results.push(result);
        }
    }

    debug!("Baidu: HTML fallback produced {} results", results.len());
    Ok(results)
}

fn parse_images(body: &str) -> Result<Vec<SearchResult>> {
    // acjson escapes single quotes, which is not valid JSON
    let data = parse_json(&body.replace("\\'", "'"), "images")?;

    let Some(items) = data.get("data").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut results = Vec::new();
    for item in items {
        let title = str_field(item, "fromPageTitleEnc")
            .or_else(|| str_field(item, "fromPageTitle"))
            .map(html_to_text)
            .unwrap_or_default();
        let replace = item.pointer("/replaceUrl/0");
        let url = replace
            .and_then(|r| str_field(r, "FromURL"))
            .or_else(|| replace.and_then(|r| str_field(r, "ObjURL")))
            .or_else(|| str_field(item, "objURL"))
            .unwrap_or_default();
        let content = str_field(item, "fromURLHost").unwrap_or_default();

        let Some(mut result) = SearchResult::checked(url, &title, content) else {
            continue;
        };
        if let Some(thumb) = str_field(item, "thumbURL") {
            result = result.with_thumbnail(thumb);
        }
        results.push(result);
    }
    Ok(results)
}

fn parse_it(body: &str) -> Result<Vec<SearchResult>> {
    let data = parse_json(body, "developer search")?;

    let Some(documents) = data.pointer("/data/documents/data").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let results = documents
        .iter()
        .filter_map(|doc| doc.get("techDocDigest"))
        .filter_map(|digest| {
            SearchResult::checked(
                str_field(digest, "url").unwrap_or_default(),
                &html_to_text(str_field(digest, "title").unwrap_or_default()),
                &html_to_text(str_field(digest, "summary").unwrap_or_default()),
            )
        })
        .collect();
    Ok(results)
}

impl Engine for Baidu {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request(&self, query: &SearchQuery) -> Result<RequestSpec> {
        query.validate()?;

        let encoded = urlencoding::encode(&query.query);
        let offset = query.offset(RESULTS_PER_PAGE)?;

        let url = match vertical(query)? {
            EngineCategory::Images => format!(
                "https://image.baidu.com/search/acjson?word={}&rn={}&pn={}&tn=resultjson_com",
                encoded, RESULTS_PER_PAGE, offset
            ),
            EngineCategory::It => format!(
                "https://kaifa.baidu.com/rest/v1/search?wd={}&pageSize={}&pageNum={}&paramList={}&position=0",
                encoded,
                RESULTS_PER_PAGE,
                query.page,
                urlencoding::encode(&format!(
                    "page_num={},page_size={}",
                    query.page, RESULTS_PER_PAGE
                ))
            ),
            _ => {
                let mut url = format!(
                    "https://www.baidu.com/s?wd={}&rn={}&pn={}&tn=json",
                    encoded, RESULTS_PER_PAGE, offset
                );
                if let Some(range) = query.options.time_range {
                    let window = format!(
                        "stf={},{}|stftype=1",
                        query.issued_at - range.seconds(),
                        query.issued_at
                    );
                    url.push_str("&gpc=");
                    url.push_str(&urlencoding::encode(&window));
                }
                url
            }
        };

        Ok(RequestSpec::get(url).with_header("User-Agent", BROWSER_USER_AGENT))
    }

    fn parse(&self, body: &str, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        if body.contains(CAPTCHA_MARKER) {
            return Err(SearchError::Captcha("Baidu".into()));
        }
        match vertical(query)? {
            EngineCategory::Images => parse_images(body),
            EngineCategory::It => parse_it(body),
            _ => parse_general(body),
        }
    }
}
