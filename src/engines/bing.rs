//! Bing web search engine implementation.
//!
//! Bing wraps many result links in `https://www.bing.com/ck/a?...&u=a1<b64>`
//! redirects; the target is base64url-encoded in the `u` parameter.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use crate::util::{collapse_whitespace, element_text, selector, BROWSER_USER_AGENT};
use crate::{
    Engine, EngineCategory, EngineConfig, OptionKind, RequestSpec, Result, SearchError, SearchQuery,
    SearchResult, TimeRange,
};

const RESULTS_PER_PAGE: u32 = 10;
const REDIRECT_PREFIX: &str = "https://www.bing.com/ck/a?";

/// Bing search engine.
pub struct Bing {
    config: EngineConfig,
}

impl Bing {
    /// Creates a new Bing engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "Bing".to_string(),
                shortcut: "bing".to_string(),
                categories: vec![EngineCategory::General],
                timeout: 5,
                enabled: true,
                paging: true,
                options: vec![OptionKind::TimeRange, OptionKind::Language],
            },
        }
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for Bing {
    fn default() -> Self {
        Self::new()
    }
}

/// 1-based index of the first result on a page.
fn page_offset(page: u32) -> Result<u32> {
    page.saturating_sub(1)
        .checked_mul(RESULTS_PER_PAGE)
        .and_then(|offset| offset.checked_add(1))
        .ok_or_else(|| SearchError::InvalidQuery(format!("Page number {} is out of range", page)))
}

/// Splits a language option into Bing's (ui language, market) pair.
fn language_and_region(tag: Option<&str>) -> (String, String) {
    let tag = tag.map(str::trim).filter(|t| !t.is_empty());
    match tag {
        Some(tag) => match tag.split_once(['-', '_']) {
            Some((lang, region)) => {
                let lang = lang.to_ascii_lowercase();
                let region = format!("{}-{}", lang, region.to_ascii_uppercase());
                (lang, region)
            }
            None => {
                let lang = tag.to_ascii_lowercase();
                let region = format!("{}-{}", lang, lang.to_ascii_uppercase());
                (lang, region)
            }
        },
        None => ("en".to_string(), "en-US".to_string()),
    }
}

fn time_filter(range: TimeRange, issued_at: i64) -> String {
    let code = match range {
        TimeRange::Day => "1".to_string(),
        TimeRange::Week => "2".to_string(),
        TimeRange::Month => "3".to_string(),
        TimeRange::Year => {
            let unix_day = issued_at.div_euclid(86_400);
            format!("5_{}_{}", unix_day - 365, unix_day)
        }
    };
    format!("ex1:\"ez{}\"", code)
}

/// Decodes a `ck/a` redirect link. Returns `None` if the link cannot be
/// decoded.
fn decode_redirect(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link).ok()?;
    let (_, param_u) = parsed.query_pairs().find(|(k, _)| k == "u")?;
    let encoded = param_u.get(2..)?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// Text of every `<p>` in a result block, without Bing's inline
/// `span.algoSlug_icon` labels.
fn snippet_text(block: ElementRef<'_>) -> Result<String> {
    let paragraph = selector("p")?;
    let mut text = String::new();
    for p in block.select(&paragraph) {
        for node in p.descendants() {
            let Some(fragment) = node.value().as_text() else {
                continue;
            };
            let in_icon = node.ancestors().any(|a| {
                ElementRef::wrap(a).is_some_and(|el| {
                    el.value().name() == "span" && el.value().classes().any(|c| c == "algoSlug_icon")
                })
            });
            if !in_icon {
                text.push_str(fragment);
            }
        }
        text.push(' ');
    }
    Ok(collapse_whitespace(&text))
}

/// Reads `(start, total)` from the result-count banner, e.g.
/// `"11-20 of 1,230 results"`.
fn result_range(document: &Html) -> Result<Option<(u32, u64)>> {
    let count = selector("span.sb_count")?;
    let Some(banner) = document.select(&count).next() else {
        return Ok(None);
    };
    let banner = element_text(banner);

    let (start, rest) = match banner.split_once('-') {
        Some((head, tail)) => {
            let start = head.chars().filter(char::is_ascii_digit).collect::<String>();
            let tail = tail.trim_start_matches(|c: char| c.is_ascii_digit());
            (start.parse::<u32>().unwrap_or(1), tail.to_string())
        }
        None => (1, banner),
    };
    let total = rest.chars().filter(char::is_ascii_digit).collect::<String>();
    Ok(total.parse::<u64>().ok().map(|total| (start, total)))
}

fn parse_results(html: &str, page: u32) -> Result<Vec<SearchResult>> {
    let document = Html::parse_document(html);
    let result_selector = selector("ol#b_results > li.b_algo")?;
    let link_selector = selector("h2 a")?;

    let mut results = Vec::new();

    for element in document.select(&result_selector) {
        let Some(link) = element.select(&link_selector).next() else {
            continue;
        };

        let title = element_text(link);
        let mut url = link.value().attr("href").unwrap_or_default().to_string();

        if url.starts_with(REDIRECT_PREFIX) {
            match decode_redirect(&url) {
                Some(target) => url = target,
                None => debug!("Bing: keeping undecodable redirect {}", url),
            }
        }

        let content = snippet_text(element)?;
        if let Some(result) = SearchResult::checked(&url, &title, &content) {
            results.push(result);
        }
    }

    if results.is_empty() {
        return Ok(results);
    }

    // Bing serves page one again when asked for a page past the end.
    if page > 1 {
        if let Some((start, total)) = result_range(&document)? {
            let expected = page_offset(page)?;
            if expected != start {
                if start == 1 && total > 0 && u64::from(expected) > total {
                    return Ok(Vec::new());
                }
                warn!(
                    "Bing: expected results to start at {}, but got results starting at {}",
                    expected, start
                );
            }
        }
    }

    Ok(results)
}

impl Engine for Bing {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request(&self, query: &SearchQuery) -> Result<RequestSpec> {
        query.validate()?;

        let encoded = urlencoding::encode(&query.query);
        let mut url = format!("https://www.bing.com/search?q={}&pq={}", encoded, encoded);

        // `first` must not be sent on page one; FORM is PERE, PERE1, PERE2...
        if query.page > 1 {
            url.push_str(&format!("&first={}", page_offset(query.page)?));
        }
        match query.page {
            0 | 1 => {}
            2 => url.push_str("&FORM=PERE"),
            n => url.push_str(&format!("&FORM=PERE{}", n - 2)),
        }

        if let Some(range) = query.options.time_range {
            url.push_str("&filters=");
            url.push_str(&urlencoding::encode(&time_filter(range, query.issued_at)));
        }

        let (language, region) = language_and_region(query.options.language.as_deref());
        let cookie = format!(
            "_EDGE_CD=m={}&u={}; _EDGE_S=mkt={}&ui={}",
            region, language, region, language
        );

        Ok(RequestSpec::get(url)
            .with_header("Cookie", cookie)
            .with_header("User-Agent", BROWSER_USER_AGENT))
    }

    fn parse(&self, body: &str, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        parse_results(body, query.page)
    }
}
