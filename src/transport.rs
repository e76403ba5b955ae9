//! Transport abstraction for executing engine requests.

use async_trait::async_trait;

use crate::{RequestSpec, Result};

/// Status and body returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes the HTTP call described by a [`RequestSpec`].
///
/// Engines never call a transport themselves; the orchestrator does. A
/// non-success status is returned as a normal response, not an error.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request and returns status and body.
    async fn execute(&self, request: &RequestSpec) -> Result<TransportResponse>;
}
