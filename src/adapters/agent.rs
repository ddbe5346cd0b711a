//! Agents from any framework, found through their usual entry points.

use super::bridge::{post_hook, ArgStyle, FailurePolicy, Hooks, Isolation};
use super::McpAdapter;
use crate::utilities::config::AdapterSettings;
use crate::utilities::normalize::RawValue;

/// Entry points probed in order.
pub const DEFAULT_AGENT_METHODS: [&str; 6] = ["run", "arun", "chat", "achat", "invoke", "ainvoke"];

/// Wraps any agent exposing one of [`DEFAULT_AGENT_METHODS`].
///
/// Everything else about the call can be changed.
#[derive(Debug, Clone)]
pub struct AgentAdapter {
    settings: AdapterSettings,
    shape_response: bool,
}

impl Default for AgentAdapter {
    fn default() -> Self {
        Self {
            settings: AdapterSettings::new().with_methods(DEFAULT_AGENT_METHODS),
            shape_response: false,
        }
    }
}

impl AgentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe these methods instead of the defaults.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings = self.settings.with_methods(methods);
        self
    }

    pub fn with_arg_style(mut self, arg_style: ArgStyle) -> Self {
        self.settings = self.settings.with_arg_style(arg_style);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.settings = self.settings.with_failure_policy(policy);
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.settings = self.settings.with_isolation(isolation);
        self
    }

    /// Return mapping results as they are and wrap anything else as
    /// `{"response": <string representation>}`.
    pub fn with_response_shaping(mut self) -> Self {
        self.shape_response = true;
        self
    }
}

fn shape_response(raw: RawValue) -> RawValue {
    match raw {
        RawValue::Mapping(_) => raw,
        other => RawValue::mapping([("response", RawValue::from(other.to_display_string()))]),
    }
}

impl McpAdapter for AgentAdapter {
    fn settings(&self) -> AdapterSettings {
        self.settings.clone()
    }

    fn hooks(&self) -> Hooks {
        if self.shape_response {
            Hooks::none().with_post(post_hook(|raw| Ok(shape_response(raw))))
        } else {
            Hooks::none()
        }
    }
}
