//! OpenAI Agents SDK agents as tools.

use super::bridge::{post_hook, ArgStyle, Hooks};
use super::McpAdapter;
use crate::utilities::config::AdapterSettings;
use crate::utilities::errors::TargetError;

/// Attribute holding the agent's answer on a run result.
pub const FINAL_OUTPUT: &str = "final_output";

/// Wraps an agent run: field values go to `run` by position and the run
/// result's `final_output` is returned.
#[derive(Debug, Clone, Default)]
pub struct OpenAiAdapter;

impl OpenAiAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl McpAdapter for OpenAiAdapter {
    fn settings(&self) -> AdapterSettings {
        AdapterSettings::new()
            .with_methods(["run"])
            .with_arg_style(ArgStyle::Positional)
    }

    fn hooks(&self) -> Hooks {
        Hooks::none().with_post(post_hook(|raw| {
            raw.attribute(FINAL_OUTPUT)
                .ok_or_else(|| TargetError::new(format!("run result has no '{}'", FINAL_OUTPUT)))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::target::testing::StubObject;
    use crate::adapters::target::{InvocationTarget, Method};
    use crate::tools::input_schema::{FieldDescriptor, FieldType, InputSchema};
    use crate::utilities::normalize::{ObjectValue, RawValue};
    use serde_json::json;
    use std::fmt;

    #[derive(Debug)]
    struct RunResult {
        final_output: String,
        turns: i64,
    }

    impl fmt::Display for RunResult {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "RunResult({} turns)", self.turns)
        }
    }

    impl ObjectValue for RunResult {
        fn type_name(&self) -> &str {
            "RunResult"
        }

        fn public_attributes(&self) -> Option<Vec<(String, RawValue)>> {
            Some(vec![
                ("final_output".into(), RawValue::from(self.final_output.as_str())),
                ("turns".into(), RawValue::from(self.turns)),
            ])
        }
    }

    fn schema() -> InputSchema {
        InputSchema::new("Q", vec![FieldDescriptor::new("question", FieldType::String)]).unwrap()
    }

    #[tokio::test]
    async fn test_final_output_is_returned() {
        let agent = StubObject::new("Agent").with_method(
            "run",
            Method::asynchronous(|args| async move {
                let question = args.first_or_named("question").unwrap_or_default();
                Ok(RawValue::object(RunResult {
                    final_output: format!("answer to {}", question.as_str().unwrap_or_default()),
                    turns: 2,
                }))
            }),
        );
        let tool = OpenAiAdapter::new()
            .convert(InvocationTarget::instance(agent), "ask", "", schema())
            .unwrap();
        let result = tool.call_value(json!({"question": "why"})).await.unwrap();
        assert_eq!(result, json!("answer to why"));
    }

    #[tokio::test]
    async fn test_missing_final_output_fails() {
        let agent = StubObject::new("Agent")
            .with_method("run", Method::sync(|_| Ok(RawValue::from("bare"))));
        let tool = OpenAiAdapter::new()
            .convert(InvocationTarget::instance(agent), "ask", "", schema())
            .unwrap();
        let err = tool.call_value(json!({"question": "why"})).await.unwrap_err();
        assert_eq!(err.to_string(), "run result has no 'final_output'");
    }
}
