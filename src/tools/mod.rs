//! Tool projection.
//!
//! This module provides the input schema types a tool is declared with and
//! the projected tool every adapter produces.

pub mod input_schema;
pub mod projected_tool;

pub use input_schema::{
    FieldDescriptor, FieldType, InputSchema, Parameter, StructuredInput, ToolArgs, TypeAnnotation,
};
pub use projected_tool::ProjectedTool;
