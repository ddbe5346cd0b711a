//! Projected tools.
//!
//! A `ProjectedTool` is the uniform wrapper every adapter produces: a name, a
//! doc string and a parameter list mirroring the input schema, plus the
//! frozen bridge that performs the actual call. It holds no state between
//! calls beyond what was captured when it was built.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::input_schema::{InputSchema, Parameter, StructuredInput, ToolArgs};
use crate::adapters::bridge::{Bridge, Hooks};
use crate::adapters::target::{classify, InvocationTarget};
use crate::utilities::config::AdapterSettings;
use crate::utilities::errors::AdapterError;

/// A schema-typed callable ready to be registered with a tool host.
#[derive(Clone)]
pub struct ProjectedTool {
    name: String,
    description: String,
    schema: Arc<InputSchema>,
    parameters: Vec<Parameter>,
    bridge: Arc<Bridge>,
}

impl fmt::Debug for ProjectedTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("bridge", &self.bridge)
            .finish()
    }
}

impl fmt::Display for ProjectedTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

impl ProjectedTool {
    /// Build a tool around `target`.
    ///
    /// Validates the schema and the settings and classifies the target once.
    /// The target is not called.
    pub fn project(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: InputSchema,
        target: InvocationTarget,
        settings: &AdapterSettings,
        hooks: Hooks,
    ) -> Result<Self, AdapterError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AdapterError::configuration("tool name must not be empty"));
        }
        schema.validate()?;
        settings.arg_style.check(&schema)?;

        let classified = classify(target, &settings.candidates())?;
        let bridge = Bridge::new(classified)
            .with_arg_style(settings.arg_style.clone())
            .with_policy(settings.failure_policy)
            .with_isolation(settings.isolation)
            .with_hooks(hooks);

        let tool = Self {
            parameters: schema.parameters(),
            name,
            description: description.into(),
            schema: Arc::new(schema),
            bridge: Arc::new(bridge),
        };
        log::debug!("projected tool {}", tool.signature());
        Ok(tool)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tool's doc string.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn schema(&self) -> &InputSchema {
        &self.schema
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Rendered call signature, e.g. `search(query: str, limit: int)`.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }

    /// JSON Schema for the tool's arguments.
    pub fn args_schema(&self) -> Value {
        self.schema.to_json_schema()
    }

    /// Validate `args` against the schema without calling anything.
    pub fn bind(&self, args: ToolArgs) -> Result<StructuredInput, AdapterError> {
        Ok(self.schema.bind(args)?)
    }

    /// Call the tool.
    ///
    /// Arguments are validated first; a validation failure never reaches the
    /// target.
    pub async fn call(&self, args: ToolArgs) -> Result<Value, AdapterError> {
        let input = self.bind(args)?;
        log::debug!("calling tool '{}'", self.name);
        self.bridge.invoke(&self.name, &input).await
    }

    /// Call with keyword arguments only.
    pub async fn call_kwargs(&self, kwargs: Map<String, Value>) -> Result<Value, AdapterError> {
        self.call(ToolArgs::keywords(kwargs)).await
    }

    /// Call with positional arguments only.
    pub async fn call_positional(&self, values: Vec<Value>) -> Result<Value, AdapterError> {
        self.call(ToolArgs::positional(values)).await
    }

    /// Call with a JSON value: an object binds by keyword, an array by
    /// position.
    pub async fn call_value(&self, args: Value) -> Result<Value, AdapterError> {
        let args = ToolArgs::from_value(args)?;
        self.call(args).await
    }
}
