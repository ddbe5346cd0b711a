//! # automcp
//!
//! Turn agent-framework objects into MCP tools.
//!
//! A tool is declared by a name, a description and an [`InputSchema`]. An
//! adapter wraps a framework object (a class, an instance or a plain
//! function) into a [`ProjectedTool`] whose parameters mirror the schema.
//! Calling the tool validates the arguments, runs the object's entry point
//! whether it is sync or async, keeps whatever the object prints away from
//! the host's stdout, and returns a JSON-safe result.
//!
//! ```ignore
//! use automcp::{FunctionAdapter, InputSchema, FieldDescriptor, FieldType, McpAdapter, Method};
//!
//! let schema = InputSchema::new("Q", vec![FieldDescriptor::new("query", FieldType::String)])?;
//! let tool = FunctionAdapter::new().convert_fn(search, "search", "Search the web", schema)?;
//! let hits = tool.call_value(serde_json::json!({"query": "rust"})).await?;
//! ```

pub mod adapters;
pub mod mcp;
pub mod tools;
pub mod utilities;

pub use adapters::bridge::{ArgStyle, Bridge, FailurePolicy, Hooks, Isolation};
pub use adapters::target::{
    CallArgs, InvocationTarget, Method, MethodKind, TargetClass, TargetObject,
};
pub use adapters::{
    AdapterKind, AgentAdapter, CrewAgentAdapter, CrewFactory, CrewaiAdapter, CrewaiToolAdapter,
    FunctionAdapter, LangchainAdapter, LanggraphAdapter, LlamaIndexAdapter, McpAdapter,
    McpAgentAdapter, OpenAiAdapter, PydanticAdapter,
};
pub use mcp::{ToolHost, ToolInfo, ToolRegistry};
pub use tools::{FieldDescriptor, FieldType, InputSchema, ProjectedTool, ToolArgs};
pub use utilities::config::{AdapterSettings, ToolConfig, ToolsConfig};
pub use utilities::errors::{AdapterError, ConfigError, SchemaError, TargetError, ValidationError};
pub use utilities::normalize::{normalize, ObjectValue, RawValue};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
