//! LangChain tools and retrievers as tools.

use super::McpAdapter;
use crate::utilities::config::AdapterSettings;

/// Entry points tried when no method is named explicitly.
pub const RUN_METHODS: [&str; 3] = ["run", "results", "load"];

/// Wraps a LangChain tool, passing every field by name.
///
/// The first of `run`, `results` and `load` the target has is called, unless
/// a method was named with [`LangchainAdapter::with_method`].
#[derive(Debug, Clone, Default)]
pub struct LangchainAdapter {
    method: Option<String>,
}

impl LangchainAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call this method instead of probing the defaults.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

impl McpAdapter for LangchainAdapter {
    fn settings(&self) -> AdapterSettings {
        let settings = AdapterSettings::new().with_methods(RUN_METHODS);
        match &self.method {
            Some(method) => settings.with_method(method.clone()),
            None => settings,
        }
    }
}
