//! Offline tests of the adapter contract against recorded responses.
//!
//! Every built-in engine is checked for the same properties; the
//! orchestrator is exercised over a transport that replays the fixtures.

use std::sync::Arc;

use async_trait::async_trait;

use search_adapters::engines::GitHub;
use search_adapters::{
    Engine, FailureKind, Method, Registry, RequestSpec, Result, Search, SearchError, SearchQuery,
    Transport, TransportResponse,
};

fn fixture(engine: &str) -> &'static str {
    match engine {
        "ArXiv" => include_str!("fixtures/arxiv.xml"),
        "Baidu" => include_str!("fixtures/baidu.json"),
        "Bing" => include_str!("fixtures/bing.html"),
        "eBay" => include_str!("fixtures/ebay.html"),
        "GitHub" => include_str!("fixtures/github.json"),
        "Quark" => include_str!("fixtures/quark.html"),
        "Wikipedia" => include_str!("fixtures/wikipedia.json"),
        other => panic!("no fixture for {}", other),
    }
}

fn engines() -> Vec<Arc<dyn Engine>> {
    Registry::with_defaults().iter().cloned().collect()
}

#[test]
fn test_every_engine_has_a_fixture() {
    assert_eq!(engines().len(), 7);
    for engine in engines() {
        assert!(!fixture(engine.name()).is_empty());
    }
}

#[test]
fn test_empty_query_is_rejected() {
    for engine in engines() {
        for query in ["", "   ", "\t\n"] {
            let result = engine.request(&SearchQuery::new(query));
            assert!(
                matches!(result, Err(SearchError::InvalidQuery(_))),
                "{} accepted an empty query",
                engine.name()
            );
        }
    }
}

#[test]
fn test_page_zero_is_rejected() {
    for engine in engines() {
        let result = engine.request(&SearchQuery::new("python").with_page(0));
        assert!(result.is_err(), "{} accepted page 0", engine.name());
    }
}

#[test]
fn test_deep_page_never_panics() {
    let query = SearchQuery::new("python").with_page(u32::MAX);
    for engine in engines() {
        match engine.request(&query) {
            Ok(spec) => assert!(spec.url.starts_with("https://"), "{}", engine.name()),
            Err(e) => assert!(
                matches!(e, SearchError::InvalidQuery(_)),
                "{} failed with {}",
                engine.name(),
                e
            ),
        }
    }
}

#[test]
fn test_request_contains_encoded_query() {
    let query = SearchQuery::new("Rust 语言 & more");
    let encoded = urlencoding::encode(&query.query).into_owned();

    for engine in engines() {
        let spec = engine.request(&query).unwrap();
        assert_eq!(spec.method, Method::GET, "{}", engine.name());
        assert!(spec.url.starts_with("https://"), "{}: {}", engine.name(), spec.url);
        assert!(
            spec.url.contains(&encoded),
            "{} URL does not contain the encoded query: {}",
            engine.name(),
            spec.url
        );
    }
}

#[test]
fn test_request_is_idempotent() {
    let query = SearchQuery::new("python")
        .with_page(2)
        .with_time_range(search_adapters::TimeRange::Year)
        .with_language("de-DE");

    for engine in engines() {
        let first = engine.request(&query).unwrap();
        let second = engine.request(&query).unwrap();
        assert_eq!(first, second, "{} is not idempotent", engine.name());
    }
}

#[test]
fn test_fixture_parses_to_results() {
    let query = SearchQuery::new("python");
    for engine in engines() {
        let results = engine.parse_response(fixture(engine.name()), &query);
        assert!(!results.is_empty(), "{} parsed nothing", engine.name());
        for result in &results {
            assert!(!result.title.trim().is_empty(), "{}: empty title", engine.name());
            assert!(!result.url.trim().is_empty(), "{}: empty url", engine.name());
        }
    }
}

#[test]
fn test_garbage_parses_to_nothing() {
    let query = SearchQuery::new("python");
    let inputs = [
        "",
        "garbage",
        "{}",
        "[]",
        "null",
        "<html><body><p>nothing here</p></body></html>",
        "\u{0}\u{1}\u{2}",
        "{\"items\": 42",
    ];

    for engine in engines() {
        for input in inputs {
            let results = engine.parse_response(input, &query);
            assert!(
                results.is_empty(),
                "{} produced results from {:?}",
                engine.name(),
                input
            );
        }
    }
}

#[test]
fn test_github_python_scenario() {
    let engine = GitHub::new();
    let query = SearchQuery::new("python");

    let spec = engine.request(&query).unwrap();
    assert!(spec.url.contains("q=python"));
    assert!(spec.url.contains("page=1"));

    let results = engine.parse_response(fixture("GitHub"), &query);
    assert_eq!(results.len(), 2);
    for result in &results {
        let url = url::Url::parse(&result.url).unwrap();
        assert_eq!(url.host_str(), Some("github.com"));
        assert_eq!(url.path_segments().unwrap().count(), 2);
    }
    assert_eq!(results[0].url, "https://github.com/TheAlgorithms/Python");
    assert_eq!(results[1].url, "https://github.com/psf/requests");
}

/// Replays fixtures by host; hosts listed in `failing` get a transport error.
struct FixtureTransport {
    failing: Vec<&'static str>,
}

fn engine_for_host(host: &str) -> Option<&'static str> {
    let engine = match host {
        "export.arxiv.org" => "ArXiv",
        "www.baidu.com" => "Baidu",
        "www.bing.com" => "Bing",
        "www.ebay.com" => "eBay",
        "api.github.com" => "GitHub",
        "quark.sm.cn" => "Quark",
        h if h.ends_with(".wikipedia.org") => "Wikipedia",
        _ => return None,
    };
    Some(engine)
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn execute(&self, request: &RequestSpec) -> Result<TransportResponse> {
        let url = url::Url::parse(&request.url)?;
        let host = url.host_str().unwrap_or_default();
        if self.failing.iter().any(|f| *f == host) {
            return Err(SearchError::Other(format!("connection to {} refused", host)));
        }
        match engine_for_host(host) {
            Some(engine) => Ok(TransportResponse::new(200, fixture(engine))),
            None => Ok(TransportResponse::new(404, "")),
        }
    }
}

#[tokio::test]
async fn test_orchestrator_isolates_failing_engine() {
    let transport = FixtureTransport {
        failing: vec!["www.bing.com"],
    };
    let search = Search::new(Arc::new(transport));
    let names = ["arx", "baidu", "bing", "ebay", "gh", "qk", "wiki"];

    let results = search.search(&SearchQuery::new("python"), &names).await;
    assert_eq!(results.outcomes().len(), names.len());

    for (outcome, name) in results.outcomes().iter().zip(names) {
        assert_eq!(outcome.engine, name);
        if name == "bing" {
            assert!(outcome.results.is_empty());
            assert_eq!(outcome.failure_kind(), Some(FailureKind::Transport));
        } else {
            assert!(outcome.failure.is_none(), "{} failed: {:?}", name, outcome.failure);
            assert!(!outcome.results.is_empty(), "{} returned nothing", name);
        }
    }

    let github = results.outcome("gh").unwrap();
    assert_eq!(github.results.len(), 2);
}

#[tokio::test]
async fn test_orchestrator_search_all() {
    let search = Search::new(Arc::new(FixtureTransport { failing: Vec::new() }));
    let results = search.search_all(&SearchQuery::new("python")).await;

    assert_eq!(results.outcomes().len(), 7);
    assert_eq!(results.failures().count(), 0);
    assert!(results.items().all(|(_, r)| !r.url.is_empty()));
}

#[tokio::test]
async fn test_orchestrator_unknown_engine() {
    let search = Search::new(Arc::new(FixtureTransport { failing: Vec::new() }));
    let results = search
        .search(&SearchQuery::new("python"), &["altavista", "wiki"])
        .await;

    assert_eq!(
        results.outcomes()[0].failure_kind(),
        Some(FailureKind::NotFound)
    );
    assert_eq!(results.outcomes()[1].results.len(), 1);
}

#[tokio::test]
async fn test_orchestrator_unsupported_category() {
    let search = Search::new(Arc::new(FixtureTransport { failing: Vec::new() }));
    let query = SearchQuery::new("python").with_category(search_adapters::EngineCategory::Shopping);
    let results = search.search(&query, &["quark", "ebay"]).await;

    assert_eq!(
        results.outcomes()[0].failure_kind(),
        Some(FailureKind::RequestBuild)
    );
    // eBay does not read the category option
    assert!(!results.outcomes()[1].results.is_empty());
}

/// Answers every request with the same status and body.
struct StaticTransport {
    status: u16,
    body: &'static str,
}

#[async_trait]
impl Transport for StaticTransport {
    async fn execute(&self, _request: &RequestSpec) -> Result<TransportResponse> {
        Ok(TransportResponse::new(self.status, self.body))
    }
}

#[tokio::test]
async fn test_wikipedia_invalid_title_is_empty() {
    let search = Search::new(Arc::new(StaticTransport {
        status: 400,
        body: r#"{"type":"https://mediawiki.org/wiki/HyperSwitch/errors/bad_request","detail":"title-invalid-characters"}"#,
    }));
    let results = search.search(&SearchQuery::new("a|b"), &["wiki"]).await;

    let outcome = &results.outcomes()[0];
    assert!(outcome.failure.is_none(), "{:?}", outcome.failure);
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn test_wikipedia_other_bad_request_fails() {
    let search = Search::new(Arc::new(StaticTransport {
        status: 400,
        body: r#"{"type":"https://mediawiki.org/wiki/HyperSwitch/errors/bad_request","detail":"title too long"}"#,
    }));
    let results = search.search(&SearchQuery::new("python"), &["wiki"]).await;
    assert_eq!(
        results.outcomes()[0].failure_kind(),
        Some(FailureKind::Parse)
    );
}
