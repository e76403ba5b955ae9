//! Search orchestration.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::{
    Engine, EngineOutcome, FailureKind, HttpTransport, Registry, Result, SearchError, SearchQuery,
    SearchResults, Transport,
};

/// Runs engines concurrently and isolates their failures.
///
/// Every requested engine yields exactly one [`EngineOutcome`], in request
/// order. A failing, slow or panicking engine never affects the others and
/// never fails the search as a whole.
pub struct Search {
    registry: Registry,
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl Search {
    /// Creates a search over the built-in engines using the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_registry(Registry::with_defaults(), transport)
    }

    /// Creates a search over a custom registry.
    pub fn with_registry(registry: Registry, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
            timeout: None,
        }
    }

    /// Creates a search over the built-in engines with a default HTTP
    /// transport.
    pub fn http() -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new()?)))
    }

    /// Returns the engine registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the engine registry for registration.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Overrides every engine's own timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// Searches the named engines.
    pub async fn search<S: AsRef<str>>(&self, query: &SearchQuery, engines: &[S]) -> SearchResults {
        self.run(query, engines, None).await
    }

    /// Searches every enabled engine in the registry.
    pub async fn search_all(&self, query: &SearchQuery) -> SearchResults {
        let names: Vec<String> = self
            .registry
            .iter()
            .filter(|e| e.is_enabled())
            .map(|e| e.name().to_string())
            .collect();
        self.run(query, &names, None).await
    }

    /// Searches the named engines, giving up on the batch after `deadline`.
    ///
    /// Outcomes that completed in time are kept; engines still in flight
    /// are dropped and reported as [`FailureKind::Cancelled`].
    pub async fn search_within<S: AsRef<str>>(
        &self,
        query: &SearchQuery,
        engines: &[S],
        deadline: Duration,
    ) -> SearchResults {
        self.run(query, engines, Some(deadline)).await
    }

    async fn run<S: AsRef<str>>(
        &self,
        query: &SearchQuery,
        names: &[S],
        deadline: Option<Duration>,
    ) -> SearchResults {
        let start = Instant::now();
        let query = Arc::new(query.clone());

        let mut slots: Vec<Option<EngineOutcome>> = Vec::with_capacity(names.len());
        let mut pending = FuturesUnordered::new();

        for (index, name) in names.iter().enumerate() {
            let name: &str = name.as_ref();
            match self.registry.get(name) {
                Some(engine) => {
                    let limit = self
                        .timeout
                        .unwrap_or_else(|| Duration::from_secs(engine.config().timeout));
                    slots.push(None);
                    pending.push(dispatch(
                        index,
                        name.to_string(),
                        engine,
                        Arc::clone(&self.transport),
                        Arc::clone(&query),
                        limit,
                    ));
                }
                None => {
                    warn!("Engine {} is not registered", name);
                    slots.push(Some(EngineOutcome::failed(
                        name,
                        FailureKind::NotFound,
                        SearchError::UnknownEngine(name.to_string()).to_string(),
                    )));
                }
            }
        }

        debug!("Searching {} engines", pending.len());

        let collect = async {
            while let Some((index, outcome)) = pending.next().await {
                slots[index] = Some(outcome);
            }
        };
        match deadline {
            Some(limit) => {
                if timeout(limit, collect).await.is_err() {
                    warn!("Search deadline of {} ms passed", limit.as_millis());
                }
            }
            None => collect.await,
        }
        // Abandon whatever is still in flight.
        drop(pending);

        let outcomes = slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| {
                    let name: &str = name.as_ref();
                    EngineOutcome::failed(
                        name,
                        FailureKind::Cancelled,
                        "search deadline passed before the engine finished",
                    )
                })
            })
            .collect();

        let mut results = SearchResults::from_outcomes(outcomes);
        results.set_duration(start.elapsed().as_millis() as u64);
        results
    }
}

/// Runs one engine to an outcome, converting a panic into
/// [`FailureKind::Unexpected`].
async fn dispatch(
    index: usize,
    name: String,
    engine: Arc<dyn Engine>,
    transport: Arc<dyn Transport>,
    query: Arc<SearchQuery>,
    limit: Duration,
) -> (usize, EngineOutcome) {
    let start = Instant::now();
    let run = run_engine(&name, engine.as_ref(), transport.as_ref(), &query, limit);

    let outcome = match AssertUnwindSafe(run).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            warn!("Engine {} panicked: {}", name, reason);
            EngineOutcome::failed(name.as_str(), FailureKind::Unexpected, reason)
        }
    };
    (index, outcome.with_duration(start.elapsed().as_millis() as u64))
}

async fn run_engine(
    name: &str,
    engine: &dyn Engine,
    transport: &dyn Transport,
    query: &SearchQuery,
    limit: Duration,
) -> EngineOutcome {
    if query.page > 1 && !engine.config().paging {
        debug!("Engine {} does not page; skipping page {}", name, query.page);
        return EngineOutcome::succeeded(name, Vec::new());
    }

    for kind in query.options.set_kinds() {
        if !engine.honors(kind) {
            debug!("Engine {} ignores option {}", name, kind);
        }
    }

    let request = match engine.request(query) {
        Ok(request) => request,
        Err(e) => {
            warn!("Engine {} could not build request: {}", name, e);
            return EngineOutcome::failed(name, FailureKind::RequestBuild, e.to_string());
        }
    };

    let response = match timeout(limit, transport.execute(&request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!("Engine {} failed: {}", name, e);
            return EngineOutcome::failed(name, FailureKind::Transport, e.to_string());
        }
        Err(_) => {
            warn!("Engine {} timed out", name);
            return EngineOutcome::failed(
                name,
                FailureKind::Timeout,
                format!("{} after {} ms", SearchError::Timeout, limit.as_millis()),
            );
        }
    };

    if !engine.accepts_status(response.status) {
        warn!("Engine {} returned HTTP {}", name, response.status);
        return EngineOutcome::failed(
            name,
            FailureKind::Transport,
            SearchError::Status(response.status).to_string(),
        );
    }

    match engine.parse(&response.body, query) {
        Ok(results) => {
            debug!("Engine {} returned {} results", name, results.len());
            EngineOutcome::succeeded(name, results)
        }
        Err(e) => {
            warn!("Engine {} could not parse response: {}", name, e);
            EngineOutcome::failed(name, FailureKind::Parse, e.to_string())
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "engine panicked".to_string()
    }
}
