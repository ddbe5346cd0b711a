//! LlamaIndex agents as tools.

use super::bridge::{post_hook, ArgStyle, Hooks};
use super::McpAdapter;
use crate::utilities::config::AdapterSettings;
use crate::utilities::normalize::RawValue;

/// Query engines are asked through this method when they have no `run`.
pub const AQUERY: &str = "aquery";

/// Wraps a LlamaIndex agent: field values go to `run` by position and the
/// response comes back as its string representation.
///
/// [`LlamaIndexAdapter::query_engine`] covers objects that only answer
/// queries: `run`, else `aquery`, called with the `query` field alone.
#[derive(Debug, Clone, Default)]
pub struct LlamaIndexAdapter {
    query_engine: bool,
}

impl LlamaIndexAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_engine() -> Self {
        Self { query_engine: true }
    }
}

impl McpAdapter for LlamaIndexAdapter {
    fn settings(&self) -> AdapterSettings {
        if self.query_engine {
            AdapterSettings::new()
                .with_methods(["run", AQUERY])
                .with_arg_style(ArgStyle::Field("query".into()))
        } else {
            AdapterSettings::new()
                .with_methods(["run"])
                .with_arg_style(ArgStyle::Positional)
        }
    }

    fn hooks(&self) -> Hooks {
        Hooks::none().with_post(post_hook(|raw| Ok(RawValue::from(raw.to_display_string()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::target::testing::{StubClass, StubObject};
    use crate::adapters::target::{InvocationTarget, Method};
    use crate::tools::input_schema::{FieldDescriptor, FieldType, InputSchema};
    use crate::utilities::errors::TargetError;
    use crate::utilities::normalize::ObjectValue;
    use serde_json::{json, Value};
    use std::fmt;

    #[derive(Debug)]
    struct AgentOutput {
        response: String,
    }

    impl fmt::Display for AgentOutput {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.response)
        }
    }

    impl ObjectValue for AgentOutput {
        fn type_name(&self) -> &str {
            "AgentOutput"
        }

        // Shadowed by the string projection.
        fn to_dict(&self) -> Option<Result<RawValue, TargetError>> {
            Some(Ok(RawValue::mapping([("response", RawValue::from(self.response.as_str()))])))
        }
    }

    #[tokio::test]
    async fn test_positional_values_and_string_result() {
        let agent = StubObject::new("FunctionAgent").with_method(
            "run",
            Method::asynchronous(|args| async move {
                let values = args.into_positional()?;
                let rendered: Vec<String> = values
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect();
                Ok::<_, TargetError>(RawValue::object(AgentOutput {
                    response: rendered.join(" x "),
                }))
            }),
        );
        let schema = InputSchema::new(
            "MulInput",
            vec![
                FieldDescriptor::new("label", FieldType::String),
                FieldDescriptor::new("times", FieldType::Int),
            ],
        )
        .unwrap();
        let tool = LlamaIndexAdapter::new()
            .convert(InvocationTarget::instance(agent), "mul", "", schema)
            .unwrap();

        let result = tool.call_value(json!({"times": 3, "label": "ab"})).await.unwrap();
        assert_eq!(result, Value::String("ab x 3".into()));
    }

    fn query_schema() -> InputSchema {
        InputSchema::new("QueryInput", vec![FieldDescriptor::new("query", FieldType::String)]).unwrap()
    }

    #[tokio::test]
    async fn test_query_engine_falls_back_to_aquery() {
        let engine = StubObject::new("RetrieverQueryEngine").with_method(
            AQUERY,
            Method::asynchronous(|args| async move {
                let query = args.into_positional()?;
                Ok::<_, TargetError>(RawValue::object(AgentOutput {
                    response: format!("answer to {}", query[0].as_str().unwrap_or_default()),
                }))
            }),
        );
        let tool = LlamaIndexAdapter::query_engine()
            .convert(InvocationTarget::instance(engine), "ask", "", query_schema())
            .unwrap();
        assert_eq!(tool.bridge().target().method_name.as_deref(), Some(AQUERY));
        assert_eq!(
            tool.call_value(json!({"query": "why"})).await.unwrap(),
            json!("answer to why")
        );
    }

    #[tokio::test]
    async fn test_query_engine_prefers_run_on_class() {
        let class = StubClass::new("Workflow")
            .with_method("run", Method::sync(|_| Ok(RawValue::from("from run"))))
            .with_method(AQUERY, Method::sync(|_| Ok(RawValue::from("from aquery"))));
        let tool = LlamaIndexAdapter::query_engine()
            .convert(InvocationTarget::class(class), "ask", "", query_schema())
            .unwrap();
        assert_eq!(
            tool.call_value(json!({"query": "q"})).await.unwrap(),
            json!("from run")
        );
    }

    #[test]
    fn test_agent_preset_does_not_accept_query_engines() {
        let engine = StubObject::new("QueryEngine")
            .with_method(AQUERY, Method::sync(|_| Ok(RawValue::Null)));
        assert!(LlamaIndexAdapter::new()
            .convert(InvocationTarget::instance(engine), "ask", "", query_schema())
            .is_err());
    }
}
