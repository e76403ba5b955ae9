//! HTTP transport using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transport::{Transport, TransportResponse};
use crate::{RequestSpec, Result};

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// User-Agent sent when a request does not set its own.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Client-level timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Proxy URL (`http://`, `https://` or `socks5://`).
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_user_agent() -> String {
    concat!("Mozilla/5.0 (compatible; search-adapters/", env!("CARGO_PKG_VERSION"), ")").to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            proxy: None,
        }
    }
}

/// A transport that performs requests with a shared reqwest client.
///
/// The client's connection pool is reused across engines and searches.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with default settings.
    pub fn new() -> Result<Self> {
        Self::from_config(&TransportConfig::default())
    }

    /// Creates a transport from a configuration.
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout));

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Creates a transport with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &RequestSpec) -> Result<TransportResponse> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(TransportResponse { status, body })
    }
}
