//! Framework adapters.
//!
//! Every adapter is a preset over the same machinery: which methods to look
//! for, how to pass the input, what to do with the result and with failures.
//! The framework-specific part lives in the [`McpAdapter::settings`] and
//! [`McpAdapter::hooks`] of each adapter; conversion itself is shared.

pub mod agent;
pub mod bridge;
pub mod crewai;
pub mod crewai_tool;
pub mod function;
pub mod langchain;
pub mod langgraph;
pub mod llamaindex;
pub mod mcp_agent;
pub mod openai;
pub mod pydantic;
pub mod target;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use self::bridge::Hooks;
use self::target::InvocationTarget;
use crate::mcp::host::ToolHost;
use crate::tools::input_schema::InputSchema;
use crate::tools::projected_tool::ProjectedTool;
use crate::utilities::config::AdapterSettings;
use crate::utilities::errors::AdapterError;

pub use self::agent::AgentAdapter;
pub use self::crewai::{CrewAgentAdapter, CrewFactory, CrewaiAdapter};
pub use self::crewai_tool::CrewaiToolAdapter;
pub use self::function::FunctionAdapter;
pub use self::langchain::LangchainAdapter;
pub use self::langgraph::LanggraphAdapter;
pub use self::llamaindex::LlamaIndexAdapter;
pub use self::mcp_agent::McpAgentAdapter;
pub use self::openai::OpenAiAdapter;
pub use self::pydantic::PydanticAdapter;

/// Converts framework objects into projected tools.
#[async_trait]
pub trait McpAdapter: Send + Sync + fmt::Debug {
    /// Method lookup, argument passing, failure policy and isolation.
    fn settings(&self) -> AdapterSettings;

    /// Hooks around the call. None by default.
    fn hooks(&self) -> Hooks {
        Hooks::none()
    }

    /// Wrap `target` as a tool. The target is classified but not called.
    fn convert(
        &self,
        target: InvocationTarget,
        name: &str,
        description: &str,
        input_schema: InputSchema,
    ) -> Result<ProjectedTool, AdapterError> {
        ProjectedTool::project(
            name,
            description,
            input_schema,
            target,
            &self.settings(),
            self.hooks(),
        )
    }

    /// Convert `target` and register the result with `host`.
    async fn add_to(
        &self,
        host: &dyn ToolHost,
        target: InvocationTarget,
        name: &str,
        description: &str,
        input_schema: InputSchema,
    ) -> Result<(), AdapterError> {
        let tool = self.convert(target, name, description, input_schema)?;
        host.add_tool(tool).await
    }
}

/// Adapter names as they appear in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    Function,
    Crewai,
    CrewaiAgent,
    CrewaiTool,
    Langchain,
    Langgraph,
    Llamaindex,
    Openai,
    Pydantic,
    McpAgent,
    Agent,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 11] = [
        AdapterKind::Function,
        AdapterKind::Crewai,
        AdapterKind::CrewaiAgent,
        AdapterKind::CrewaiTool,
        AdapterKind::Langchain,
        AdapterKind::Langgraph,
        AdapterKind::Llamaindex,
        AdapterKind::Openai,
        AdapterKind::Pydantic,
        AdapterKind::McpAgent,
        AdapterKind::Agent,
    ];

    /// The adapter with its stock settings.
    pub fn adapter(self) -> Box<dyn McpAdapter> {
        match self {
            AdapterKind::Function => Box::new(FunctionAdapter::new()),
            AdapterKind::Crewai => Box::new(CrewaiAdapter::new()),
            AdapterKind::CrewaiAgent => Box::new(CrewAgentAdapter::new()),
            AdapterKind::CrewaiTool => Box::new(CrewaiToolAdapter::new()),
            AdapterKind::Langchain => Box::new(LangchainAdapter::new()),
            AdapterKind::Langgraph => Box::new(LanggraphAdapter::new()),
            AdapterKind::Llamaindex => Box::new(LlamaIndexAdapter::new()),
            AdapterKind::Openai => Box::new(OpenAiAdapter::new()),
            AdapterKind::Pydantic => Box::new(PydanticAdapter::new()),
            AdapterKind::McpAgent => Box::new(McpAgentAdapter::new()),
            AdapterKind::Agent => Box::new(AgentAdapter::new()),
        }
    }

    /// Stock settings for this adapter.
    pub fn default_settings(self) -> AdapterSettings {
        self.adapter().settings()
    }

    /// Stock hooks for this adapter.
    pub fn hooks(self) -> Hooks {
        self.adapter().hooks()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdapterKind::Function => "function",
            AdapterKind::Crewai => "crewai",
            AdapterKind::CrewaiAgent => "crewai_agent",
            AdapterKind::CrewaiTool => "crewai_tool",
            AdapterKind::Langchain => "langchain",
            AdapterKind::Langgraph => "langgraph",
            AdapterKind::Llamaindex => "llamaindex",
            AdapterKind::Openai => "openai",
            AdapterKind::Pydantic => "pydantic",
            AdapterKind::McpAgent => "mcp_agent",
            AdapterKind::Agent => "agent",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
