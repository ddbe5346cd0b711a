//! Tool hosts.
//!
//! A host is whatever serves tools to MCP clients. Adapters only need to hand
//! it finished tools; [`ToolRegistry`] is the in-process implementation used
//! for routing calls and listing what is available.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::adapters::target::InvocationTarget;
use crate::tools::input_schema::ToolArgs;
use crate::tools::projected_tool::ProjectedTool;
use crate::utilities::config::{ToolConfig, ToolsConfig};
use crate::utilities::errors::AdapterError;

/// What a host advertises for each tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<&ProjectedTool> for ToolInfo {
    fn from(tool: &ProjectedTool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.args_schema(),
        }
    }
}

/// A place tools are registered with and called through.
#[async_trait]
pub trait ToolHost: Send + Sync {
    /// Register a tool. Names are unique per host.
    async fn add_tool(&self, tool: ProjectedTool) -> Result<(), AdapterError>;

    /// Call a registered tool by name.
    async fn call_tool(&self, name: &str, args: ToolArgs) -> Result<Value, AdapterError>;

    /// Registered tools, in registration order.
    async fn list_tools(&self) -> Vec<ToolInfo>;
}

/// In-process [`ToolHost`].
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<RwLock<Vec<ProjectedTool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a tool by name.
    pub async fn get(&self, name: &str) -> Option<ProjectedTool> {
        self.tools.read().await.iter().find(|t| t.name() == name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.tools.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tools.read().await.is_empty()
    }

    /// Convert `target` as described by `config` and register it.
    ///
    /// The adapter's stock hooks are used; its settings are overridden by
    /// whatever the entry sets.
    pub async fn register(
        &self,
        config: &ToolConfig,
        target: InvocationTarget,
    ) -> Result<(), AdapterError> {
        let tool = ProjectedTool::project(
            config.name.as_str(),
            config.description.as_str(),
            config.input_schema.clone(),
            target,
            &config.settings(),
            config.adapter.hooks(),
        )?;
        self.add_tool(tool).await
    }

    /// Register one target per entry of `config`. `resolve` maps a tool name
    /// to its target; entries it has no target for are a configuration
    /// error.
    pub async fn register_all<F>(&self, config: &ToolsConfig, mut resolve: F) -> Result<(), AdapterError>
    where
        F: FnMut(&ToolConfig) -> Option<InvocationTarget> + Send,
    {
        for entry in &config.tools {
            let target = resolve(entry).ok_or_else(|| {
                AdapterError::configuration(format!("no target provided for tool '{}'", entry.name))
            })?;
            self.register(entry, target).await?;
        }
        log::info!(
            "registered {} tool(s) from '{}'",
            config.tools.len(),
            config.name
        );
        Ok(())
    }
}

#[async_trait]
impl ToolHost for ToolRegistry {
    async fn add_tool(&self, tool: ProjectedTool) -> Result<(), AdapterError> {
        let mut tools = self.tools.write().await;
        if tools.iter().any(|t| t.name() == tool.name()) {
            return Err(AdapterError::DuplicateTool(tool.name().to_string()));
        }
        log::info!("registered tool {}", tool.signature());
        tools.push(tool);
        Ok(())
    }

    async fn call_tool(&self, name: &str, args: ToolArgs) -> Result<Value, AdapterError> {
        // Clone out so the lock is not held across the call.
        let tool = self
            .get(name)
            .await
            .ok_or_else(|| AdapterError::UnknownTool(name.to_string()))?;
        tool.call(args).await
    }

    async fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools.read().await.iter().map(ToolInfo::from).collect()
    }
}
