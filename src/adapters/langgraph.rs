//! LangGraph graphs as tools.

use super::bridge::ArgStyle;
use super::McpAdapter;
use crate::utilities::config::AdapterSettings;

/// Wraps a compiled graph. The whole input is passed as the graph state
/// mapping to `ainvoke`; the final state is returned normalized.
#[derive(Debug, Clone, Default)]
pub struct LanggraphAdapter;

impl LanggraphAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl McpAdapter for LanggraphAdapter {
    fn settings(&self) -> AdapterSettings {
        AdapterSettings::new()
            .with_methods(["ainvoke"])
            .with_arg_style(ArgStyle::Mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::target::testing::StubObject;
    use crate::adapters::target::{InvocationTarget, Method};
    use crate::tools::input_schema::{FieldDescriptor, FieldType, InputSchema};
    use crate::utilities::errors::TargetError;
    use crate::utilities::normalize::RawValue;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_graph_receives_state_mapping() {
        let graph = StubObject::new("CompiledStateGraph").with_method(
            "ainvoke",
            Method::asynchronous(|args| async move {
                let mut state = args.into_positional()?;
                let mut state = match state.pop() {
                    Some(Value::Object(map)) => map,
                    _ => return Err(TargetError::new("graph state must be a mapping")),
                };
                let n = state.get("n").and_then(Value::as_i64).unwrap_or_default();
                state.insert("steps".into(), json!(["double"]));
                state.insert("n".into(), json!(n * 2));
                Ok::<_, TargetError>(RawValue::from(Value::Object(state)))
            }),
        );
        let schema = InputSchema::new(
            "State",
            vec![
                FieldDescriptor::new("label", FieldType::String),
                FieldDescriptor::new("n", FieldType::Int),
            ],
        )
        .unwrap();
        let tool = LanggraphAdapter::new()
            .convert(InvocationTarget::instance(graph), "double", "", schema)
            .unwrap();

        let result = tool.call_value(json!({"label": "x", "n": 21})).await.unwrap();
        assert_eq!(result, json!({"label": "x", "n": 42, "steps": ["double"]}));
    }
}
