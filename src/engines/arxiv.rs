//! ArXiv preprint search using the Atom export API.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::util::{collapse_whitespace, normalize_date};
use crate::{Engine, EngineCategory, EngineConfig, RequestSpec, Result, SearchError, SearchQuery, SearchResult};

const RESULTS_PER_PAGE: u32 = 10;

/// ArXiv search engine.
pub struct ArXiv {
    config: EngineConfig,
}

impl ArXiv {
    /// Creates a new ArXiv engine.
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                name: "ArXiv".to_string(),
                shortcut: "arx".to_string(),
                categories: vec![EngineCategory::Science],
                timeout: 10,
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

impl Default for ArXiv {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Id,
    Summary,
    Published,
}

#[derive(Default)]
struct Entry {
    title: String,
    id: String,
    summary: String,
    published: String,
}

impl Entry {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Id => &mut self.id,
            Field::Summary => &mut self.summary,
            Field::Published => &mut self.published,
        };
        target.push_str(text);
    }

    fn into_result(self) -> Option<SearchResult> {
        let mut result = SearchResult::checked(
            &self.id,
            &collapse_whitespace(&self.title),
            &collapse_whitespace(&self.summary),
        )?;
        if let Some(date) = normalize_date(&self.published) {
            result = result.with_published_date(date);
        }
        Some(result)
    }
}

fn parse_feed(xml: &str) -> Result<Vec<SearchResult>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut results = Vec::new();
    let mut saw_feed = false;
    let mut entry: Option<Entry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                field = None;
                match e.local_name().as_ref() {
                    b"feed" => saw_feed = true,
                    b"entry" => entry = Some(Entry::default()),
                    b"title" if entry.is_some() => field = Some(Field::Title),
                    b"id" if entry.is_some() => field = Some(Field::Id),
                    b"summary" if entry.is_some() => field = Some(Field::Summary),
                    b"published" if entry.is_some() => field = Some(Field::Published),
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(entry), Some(field)) = (entry.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| SearchError::Parse(format!("ArXiv XML text: {}", e)))?;
                    entry.push(field, &text);
                    entry.push(field, " ");
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(entry), Some(field)) = (entry.as_mut(), field) {
                    entry.push(field, &String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::End(e)) => {
                field = None;
                if e.local_name().as_ref() == b"entry" {
                    if let Some(result) = entry.take().and_then(Entry::into_result) {
                        results.push(result);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SearchError::Parse(format!(
                    "ArXiv XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !saw_feed && !xml.trim().is_empty() {
        return Err(SearchError::Parse("ArXiv response is not an Atom feed".into()));
    }
    Ok(results)
}

impl Engine for ArXiv {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request(&self, query: &SearchQuery) -> Result<RequestSpec> {
        query.validate()?;
        let url = format!(
            "https://export.arxiv.org/api/query?search_query=all:{}&start={}&max_results={}",
            urlencoding::encode(&query.query),
            query.offset(RESULTS_PER_PAGE)?,
            RESULTS_PER_PAGE
        );
        Ok(RequestSpec::get(url))
    }

    fn parse(&self, body: &str, _query: &SearchQuery) -> Result<Vec<SearchResult>> {
        parse_feed(body)
    }
}
