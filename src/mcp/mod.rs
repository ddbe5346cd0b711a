//! MCP-facing side of the toolkit.
//!
//! Projected tools are handed to a [`ToolHost`]; [`ToolRegistry`] is the
//! in-process host used to route calls and list tool descriptors.

pub mod host;

pub use host::{ToolHost, ToolInfo, ToolRegistry};
