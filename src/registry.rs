//! Engine registry.

use std::sync::Arc;

use crate::engines::{ArXiv, Baidu, Bing, Ebay, GitHub, Quark, Wikipedia};
use crate::Engine;

/// Table of engines addressable by name or shortcut.
///
/// Lookups are case-insensitive. Registration order is preserved and is the
/// order [`Search::search_all`](crate::Search::search_all) dispatches in.
#[derive(Clone, Default)]
pub struct Registry {
    engines: Vec<Arc<dyn Engine>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in engine.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ArXiv::new());
        registry.register(Baidu::new());
        registry.register(Bing::new());
        registry.register(Ebay::new());
        registry.register(GitHub::new());
        registry.register(Quark::new());
        registry.register(Wikipedia::new());
        registry
    }

    /// Adds an engine, replacing any engine with the same name.
    pub fn register<E: Engine + 'static>(&mut self, engine: E) {
        self.register_arc(Arc::new(engine));
    }

    /// Adds a shared engine, replacing any engine with the same name.
    pub fn register_arc(&mut self, engine: Arc<dyn Engine>) {
        match self
            .engines
            .iter()
            .position(|e| e.name().eq_ignore_ascii_case(engine.name()))
        {
            Some(index) => self.engines[index] = engine,
            None => self.engines.push(engine),
        }
    }

    /// Looks up an engine by name or shortcut.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Engine>> {
        let name = name.trim();
        self.engines
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(name))
            .or_else(|| {
                self.engines
                    .iter()
                    .find(|e| e.shortcut().eq_ignore_ascii_case(name))
            })
            .cloned()
    }

    /// Returns the registered engine names.
    pub fn names(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Iterates over the registered engines.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Engine>> {
        self.engines.iter()
    }

    /// Returns the number of registered engines.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
