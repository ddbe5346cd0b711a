//! Pydantic AI agents as tools.

use super::bridge::{post_hook, ArgStyle, Hooks};
use super::McpAdapter;
use crate::utilities::config::AdapterSettings;

/// Wraps an agent whose `run` takes the `query` field. The result's `data`
/// is returned, else its `raw`, else the result itself.
#[derive(Debug, Clone, Default)]
pub struct PydanticAdapter;

impl PydanticAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl McpAdapter for PydanticAdapter {
    fn settings(&self) -> AdapterSettings {
        AdapterSettings::new()
            .with_methods(["run"])
            .with_arg_style(ArgStyle::Field("query".into()))
    }

    fn hooks(&self) -> Hooks {
        Hooks::none().with_post(post_hook(|raw| {
            Ok(raw
                .attribute("data")
                .or_else(|| raw.attribute("raw"))
                .unwrap_or(raw))
        }))
    }
}
