//! Quark (夸克) search engine implementation.
//!
//! The general result page embeds one hydrate JSON script per result card.
//! Each card names its layout in `extraData.sc`; the card payload lives in
//! `data.initialData` and its shape depends on that layout.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::util::{date_from_timestamp, force_https, html_to_text, BROWSER_USER_AGENT};
use crate::{
    Engine, EngineCategory, EngineConfig, OptionKind, RequestSpec, Result, SearchError, SearchQuery,
    SearchResult, TimeRange,
};

const RESULTS_PER_PAGE: u32 = 10;

const CAPTCHA_PATTERN: &str =
    r#"\{[^{]*?"action"\s*:\s*"captcha"\s*,\s*"url"\s*:\s*"([^"]+)"[^{]*?\}"#;
const HYDRATE_PATTERN: &str = r#"(?s)<script\s+type="application/json"\s+id="s-data-[^"]+"\s+data-used-by="hydrate">(.*?)</script>"#;

static CAPTCHA: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
static HYDRATE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

fn compiled(
    cell: &'static OnceLock<std::result::Result<Regex, regex::Error>>,
    pattern: &str,
) -> Result<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| SearchError::Parse(format!("Failed to compile pattern: {}", e)))
}

/// Quark search engine.
pub struct Quark {
    config: EngineConfig,
}

impl Quark {
    /// Creates a new Quark engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "Quark".to_string(),
                shortcut: "qk".to_string(),
                categories: vec![EngineCategory::General, EngineCategory::Images],
                timeout: 5,
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

impl Default for Quark {
    fn default() -> Self {
        Self::new()
    }
}

fn vertical(query: &SearchQuery) -> Result<EngineCategory> {
    match query.options.category.unwrap_or_default() {
        c @ (EngineCategory::General | EngineCategory::Images) => Ok(c),
        other => Err(SearchError::UnsupportedOption(format!(
            "Quark does not serve category '{}'",
            other
        ))),
    }
}

fn time_code(range: TimeRange) -> &'static str {
    match range {
        TimeRange::Day => "4",
        TimeRange::Week => "3",
        TimeRange::Month => "2",
        TimeRange::Year => "1",
    }
}

/// String at a JSON pointer, ignoring empty values.
fn raw<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Plain text at a JSON pointer.
fn text(value: &Value, pointer: &str) -> String {
    raw(value, pointer).map(html_to_text).unwrap_or_default()
}

/// Unix timestamp at a JSON pointer; Quark sends these as strings or numbers.
fn timestamp(value: &Value, pointer: &str) -> Option<String> {
    let secs = match value.pointer(pointer)? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    date_from_timestamp(secs)
}

fn build(url: &str, title: &str, content: &str) -> Option<SearchResult> {
    SearchResult::checked(url, title, content)
}

fn with_thumbnail(result: Option<SearchResult>, thumbnail: Option<&str>) -> Option<SearchResult> {
    match (result, thumbnail) {
        (Some(r), Some(t)) => Some(r.with_thumbnail(force_https(t))),
        (r, _) => r,
    }
}

fn with_date(result: Option<SearchResult>, date: Option<String>) -> Option<SearchResult> {
    match (result, date) {
        (Some(r), Some(d)) => Some(r.with_published_date(d)),
        (r, _) => r,
    }
}

fn items<'a>(value: &'a Value, pointer: &str) -> impl Iterator<Item = &'a Value> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

// Layout extractors. Each takes a card's `initialData`.

fn ss_doc(data: &Value) -> Vec<SearchResult> {
    let title = raw(data, "/titleProps/content").or_else(|| raw(data, "/title"));
    let url = raw(data, "/sourceProps/dest_url")
        .or_else(|| raw(data, "/normal_url"))
        .or_else(|| raw(data, "/url"));
    let content = raw(data, "/summaryProps/content")
        .or_else(|| raw(data, "/message/replyContent"))
        .or_else(|| raw(data, "/show_body"))
        .or_else(|| raw(data, "/desc"));

    let result = build(
        url.unwrap_or_default(),
        &title.map(html_to_text).unwrap_or_default(),
        &content.map(html_to_text).unwrap_or_default(),
    );
    let result = with_thumbnail(result, raw(data, "/picListProps/0/src"));
    with_date(result, timestamp(data, "/sourceProps/time"))
        .into_iter()
        .collect()
}

fn nature_result(data: &Value) -> Vec<SearchResult> {
    build(
        raw(data, "/url").unwrap_or_default(),
        &text(data, "/title"),
        &text(data, "/desc"),
    )
    .into_iter()
    .collect()
}

fn addition(data: &Value) -> Vec<SearchResult> {
    build(
        raw(data, "/source/url").unwrap_or_default(),
        &text(data, "/title/content"),
        &text(data, "/summary/content"),
    )
    .into_iter()
    .collect()
}

fn ai_page(data: &Value) -> Vec<SearchResult> {
    items(data, "/list")
        .filter_map(|item| {
            let content = match item.get("content") {
                Some(Value::Array(parts)) => parts
                    .iter()
                    .map(|p| p.as_str().map(str::to_string).unwrap_or_else(|| p.to_string()))
                    .collect::<Vec<_>>()
                    .join(" | "),
                Some(Value::String(s)) => s.clone(),
                _ => String::new(),
            };
            let result = build(
                raw(item, "/url").unwrap_or_default(),
                &text(item, "/title"),
                &html_to_text(&content),
            );
            with_date(result, timestamp(item, "/source/time"))
        })
        .collect()
}

fn baike_sc(data: &Value) -> Vec<SearchResult> {
    let result = build(
        raw(data, "/data/url").unwrap_or_default(),
        &text(data, "/data/title"),
        &text(data, "/data/abstract"),
    );
    with_thumbnail(result, raw(data, "/data/img")).into_iter().collect()
}

fn finance_shuidi(data: &Value) -> Vec<SearchResult> {
    let content = [
        "establish_time",
        "company_status",
        "controled_type",
        "company_type",
        "capital",
        "address",
        "business_scope",
    ]
    .iter()
    .filter_map(|key| raw(data, &format!("/{}", key)))
    .collect::<Vec<_>>()
    .join(" | ");

    build(
        raw(data, "/title_url").unwrap_or_default(),
        &text(data, "/company_name"),
        &html_to_text(&content),
    )
    .into_iter()
    .collect()
}

fn kk_yidian_all(data: &Value) -> Vec<SearchResult> {
    let content = items(data, "/list_container")
        .flat_map(|section| items(section, "/list_container"))
        .filter_map(|item| raw(item, "/dot_text"))
        .collect::<Vec<_>>()
        .join(" ");

    build(
        raw(data, "/title_url").unwrap_or_default(),
        &text(data, "/title"),
        &html_to_text(&content),
    )
    .into_iter()
    .collect()
}

fn life_show_general_image(data: &Value) -> Vec<SearchResult> {
    items(data, "/image").filter_map(image_item).collect()
}

fn med_struct(data: &Value) -> Vec<SearchResult> {
    let result = build(
        raw(data, "/message/statistics/nu").unwrap_or_default(),
        &text(data, "/title"),
        &text(data, "/message/content_text"),
    );
    with_thumbnail(result, raw(data, "/message/video_img")).into_iter().collect()
}

fn music_new_song(data: &Value) -> Vec<SearchResult> {
    items(data, "/hit3")
        .filter_map(|item| {
            let title = match (raw(item, "/song_name"), raw(item, "/song_singer")) {
                (Some(song), Some(singer)) => format!("{} | {}", song, singer),
                (Some(song), None) => song.to_string(),
                _ => return None,
            };
            let result = build(
                raw(item, "/play_url").unwrap_or_default(),
                &html_to_text(&title),
                &text(item, "/lyrics"),
            );
            with_thumbnail(result, raw(item, "/image_url"))
        })
        .collect()
}

fn news_uchq(data: &Value) -> Vec<SearchResult> {
    items(data, "/feed")
        .filter_map(|item| {
            let result = build(
                raw(item, "/url").unwrap_or_default(),
                &text(item, "/title"),
                &text(item, "/summary"),
            );
            let date = raw(item, "/time")
                .and_then(|t| chrono::NaiveDate::parse_from_str(t.trim(), "%Y-%m-%d").ok())
                .map(|d| format!("{}T00:00:00Z", d.format("%Y-%m-%d")));
            with_date(with_thumbnail(result, raw(item, "/image")), date)
        })
        .collect()
}

fn ss_note(data: &Value) -> Vec<SearchResult> {
    let result = build(
        raw(data, "/source/dest_url").unwrap_or_default(),
        &text(data, "/title/content"),
        &text(data, "/summary/content"),
    );
    with_date(result, timestamp(data, "/source/time")).into_iter().collect()
}

fn travel_dest_overview(data: &Value) -> Vec<SearchResult> {
    build(
        raw(data, "/strong/baike_url").unwrap_or_default(),
        &text(data, "/strong/title"),
        &text(data, "/strong/baike_text"),
    )
    .into_iter()
    .collect()
}

fn travel_ranking_list(data: &Value) -> Vec<SearchResult> {
    build(
        raw(data, "/title/url").unwrap_or_default(),
        &text(data, "/title/text"),
        &text(data, "/title/title_tag"),
    )
    .into_iter()
    .collect()
}

type Layout = fn(&Value) -> Vec<SearchResult>;

fn layout(sc: &str) -> Option<Layout> {
    let extractor: Layout = match sc {
        "ss_doc" | "ss_kv" | "ss_pic" | "ss_text" | "ss_video" | "baike" | "structure_web_novel" => {
            ss_doc
        }
        "nature_result" => nature_result,
        "addition" => addition,
        "ai_page" => ai_page,
        "baike_sc" => baike_sc,
        "finance_shuidi" => finance_shuidi,
        "kk_yidian_all" => kk_yidian_all,
        "life_show_general_image" => life_show_general_image,
        "med_struct" => med_struct,
        "music_new_song" => music_new_song,
        "news_uchq" => news_uchq,
        "ss_note" => ss_note,
        "travel_dest_overview" => travel_dest_overview,
        "travel_ranking_list" => travel_ranking_list,
        _ => return None,
    };
    Some(extractor)
}

/// One picture from the image API or an inline image card.
fn image_item(item: &Value) -> Option<SearchResult> {
    let mut content = Vec::new();
    if let Some(site) = raw(item, "/site") {
        content.push(site.to_string());
    }
    if let (Some(w), Some(h)) = (item.get("width"), item.get("height")) {
        if !w.is_null() && !h.is_null() {
            let dim = |v: &Value| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
            content.push(format!("{} x {}", dim(w), dim(h)));
        }
    }

    let result = build(
        raw(item, "/imgUrl").unwrap_or_default(),
        &text(item, "/title"),
        &content.join(" | "),
    );
    let thumbnail = raw(item, "/img").or_else(|| raw(item, "/bigPicUrl"));
    with_date(with_thumbnail(result, thumbnail), timestamp(item, "/publish_time"))
}

fn parse_general(html: &str) -> Result<Vec<SearchResult>> {
    let hydrate = compiled(&HYDRATE, HYDRATE_PATTERN)?;

    let mut results = Vec::new();
    for caps in hydrate.captures_iter(html) {
        let Some(script) = caps.get(1) else {
            continue;
        };
        let card: Value = match serde_json::from_str(script.as_str()) {
            Ok(card) => card,
            Err(e) => {
                debug!("Quark: skipping malformed hydrate block: {}", e);
                continue;
            }
        };

        let Some(sc) = raw(&card, "/extraData/sc") else {
            continue;
        };
        let Some(extract) = layout(sc) else {
            debug!("Quark: no extractor for layout '{}'", sc);
            continue;
        };
        let data = card.pointer("/data/initialData").unwrap_or(&Value::Null);
        results.extend(extract(data));
    }
    Ok(results)
}

fn parse_images(body: &str) -> Result<Vec<SearchResult>> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("Quark images JSON: {}", e)))?;
    Ok(items(&data, "/data/hit/imgInfo/item").filter_map(image_item).collect())
}

impl Engine for Quark {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request(&self, query: &SearchQuery) -> Result<RequestSpec> {
        query.validate()?;
        let encoded = urlencoding::encode(&query.query);

        let url = match vertical(query)? {
            EngineCategory::Images => format!(
                "https://vt.sm.cn/api/pic/list?query={}&limit={}&start={}",
                encoded,
                RESULTS_PER_PAGE,
                query.offset(RESULTS_PER_PAGE)?
            ),
            _ => {
                let mut url = format!(
                    "https://quark.sm.cn/s?q={}&layout=html&page={}",
                    encoded, query.page
                );
                if let Some(range) = query.options.time_range {
                    url.push_str("&tl_request=");
                    url.push_str(time_code(range));
                }
                url
            }
        };
        Ok(RequestSpec::get(url).with_header("User-Agent", BROWSER_USER_AGENT))
    }

    fn parse(&self, body: &str, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        if let Some(caps) = compiled(&CAPTCHA, CAPTCHA_PATTERN)?.captures(body) {
            let target = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            return Err(SearchError::Captcha(format!("Quark ({})", target)));
        }
        match vertical(query)? {
            EngineCategory::Images => parse_images(body),
            _ => parse_general(body),
        }
    }
}
