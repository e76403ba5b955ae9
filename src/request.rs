//! Outbound request descriptions produced by engines.

use std::collections::BTreeMap;

use reqwest::Method;

/// Describes a single HTTP call an engine wants made.
///
/// Engines build these without touching the network; a [`Transport`]
/// performs the call.
///
/// [`Transport`]: crate::Transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// Fully encoded request URL.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Extra request headers, ordered by name.
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    /// Creates a GET request for the given URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: BTreeMap::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns a header value by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
