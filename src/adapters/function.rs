//! Plain functions as tools.

use super::target::{InvocationTarget, Method};
use super::McpAdapter;
use crate::tools::input_schema::InputSchema;
use crate::tools::projected_tool::ProjectedTool;
use crate::utilities::config::AdapterSettings;
use crate::utilities::errors::AdapterError;

/// Wraps a sync or async function, passing every field by name.
#[derive(Debug, Clone, Default)]
pub struct FunctionAdapter;

impl FunctionAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Shorthand for converting a bare function.
    pub fn convert_fn(
        &self,
        function: Method,
        name: &str,
        description: &str,
        input_schema: InputSchema,
    ) -> Result<ProjectedTool, AdapterError> {
        self.convert(
            InvocationTarget::callable(function),
            name,
            description,
            input_schema,
        )
    }
}

impl McpAdapter for FunctionAdapter {
    fn settings(&self) -> AdapterSettings {
        AdapterSettings::new()
    }
}
