//! mcp-agent agents as tools.
//!
//! These agents run inside an application that has to be initialized before
//! every call, and they are driven from a host that may cancel the call at
//! any time. The call therefore runs on its own task, which is aborted when
//! the caller goes away, and failures come back as an error payload instead
//! of an error.

use std::fmt;
use std::future::Future;

use super::bridge::{pre_hook, ArgStyle, FailurePolicy, Hooks, Isolation, PreHook};
use super::McpAdapter;
use crate::utilities::config::AdapterSettings;
use crate::utilities::errors::TargetError;

/// Wraps an LLM-attached agent through `generate_str(query)`.
#[derive(Clone, Default)]
pub struct McpAgentAdapter {
    initialize: Option<PreHook>,
}

impl fmt::Debug for McpAgentAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpAgentAdapter")
            .field("initialize", &self.initialize.is_some())
            .finish()
    }
}

impl McpAgentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `initialize` before each call, e.g. to start the agent's app.
    pub fn with_initializer<F, Fut>(mut self, initialize: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TargetError>> + Send + 'static,
    {
        self.initialize = Some(pre_hook(initialize));
        self
    }
}

impl McpAdapter for McpAgentAdapter {
    fn settings(&self) -> AdapterSettings {
        AdapterSettings::new()
            .with_methods(["generate_str"])
            .with_arg_style(ArgStyle::Field("query".into()))
            .with_failure_policy(FailurePolicy::Report)
            .with_isolation(Isolation::Spawned)
    }

    fn hooks(&self) -> Hooks {
        Hooks {
            pre: self.initialize.clone(),
            post: None,
        }
    }
}
