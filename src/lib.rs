//! # search-adapters
//!
//! Per-site search engine adapters with a concurrent orchestrator.
//!
//! Each adapter (ArXiv, Baidu, Bing, eBay, GitHub, Quark, Wikipedia) is a
//! pair of pure functions: one describes the HTTP request for a query, the
//! other turns the response body into normalized results. The [`Search`]
//! orchestrator executes requests through a [`Transport`], runs engines
//! concurrently and reports every engine's outcome separately:
//!
//! - Failures, timeouts and panics stay contained in one engine
//! - Results stay attributed to the engine that produced them
//! - Engines are looked up by name or shortcut in an explicit [`Registry`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use search_adapters::{Search, SearchQuery, TimeRange};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let search = Search::http()?;
//!
//!     let query = SearchQuery::new("rust programming").with_time_range(TimeRange::Year);
//!     let results = search.search(&query, &["github", "wikipedia", "bing"]).await;
//!
//!     for (engine, result) in results.items() {
//!         println!("[{}] {}: {}", engine, result.title, result.url);
//!     }
//!     for failed in results.failures() {
//!         eprintln!("{} failed: {:?}", failed.engine, failed.failure);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Adapters can also be used without the orchestrator:
//!
//! ```rust
//! use search_adapters::{engines::GitHub, Engine, SearchQuery};
//!
//! let engine = GitHub::new();
//! let request = engine.request(&SearchQuery::new("tokio")).unwrap();
//! assert!(request.url.starts_with("https://api.github.com/search/repositories?q=tokio"));
//! ```

mod engine;
mod error;
mod query;
mod registry;
mod request;
mod result;
mod search;
mod transport;
mod transport_http;

pub mod engines;
pub mod util;

pub use engine::{Engine, EngineCategory, EngineConfig};
pub use error::{Result, SearchError};
pub use query::{EngineOptions, OptionKind, SearchQuery, TimeRange};
pub use registry::Registry;
pub use request::RequestSpec;
pub use result::{EngineFailure, EngineOutcome, FailureKind, SearchResult, SearchResults};
pub use search::Search;
pub use transport::{Transport, TransportResponse};
pub use transport_http::{HttpTransport, TransportConfig};

pub use reqwest::Method;
