//! Crew tools as tools.

use super::McpAdapter;
use crate::utilities::config::AdapterSettings;

/// The crew tool entry point.
pub const RUN: &str = "_run";

/// Wraps a crew tool class or instance through its `_run` method.
#[derive(Debug, Clone, Default)]
pub struct CrewaiToolAdapter;

impl CrewaiToolAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl McpAdapter for CrewaiToolAdapter {
    fn settings(&self) -> AdapterSettings {
        AdapterSettings::new().with_methods([RUN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::target::testing::{StubClass, StubObject};
    use crate::adapters::target::{InvocationTarget, Method};
    use crate::tools::input_schema::{FieldDescriptor, FieldType, InputSchema};
    use crate::utilities::errors::AdapterError;
    use crate::utilities::normalize::RawValue;
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;

    fn search_schema() -> InputSchema {
        InputSchema::new(
            "SearchInput",
            vec![FieldDescriptor::new("search_query", FieldType::String)],
        )
        .unwrap()
    }

    fn run_method() -> Method {
        Method::sync(|args| {
            let map = args.into_keyword()?;
            let query = map.get("search_query").and_then(Value::as_str).unwrap_or_default();
            Ok(RawValue::from(vec![format!("hit for {}", query)]))
        })
    }

    #[tokio::test]
    async fn test_tool_instance() {
        let object = StubObject::new("SerperDevTool").with_method(RUN, run_method());
        let tool = CrewaiToolAdapter::new()
            .convert(InvocationTarget::instance(object), "search", "Web search", search_schema())
            .unwrap();
        let result = tool.call_value(json!({"search_query": "crates"})).await.unwrap();
        assert_eq!(result, json!(["hit for crates"]));
    }

    #[tokio::test]
    async fn test_tool_class_instantiated_per_call() {
        let class = StubClass::new("SerperDevTool").with_method(RUN, run_method());
        let counter = class.counter();
        let tool = CrewaiToolAdapter::new()
            .convert(InvocationTarget::class(class), "search", "", search_schema())
            .unwrap();
        tool.call_value(json!({"search_query": "a"})).await.unwrap();
        tool.call_value(json!({"search_query": "b"})).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_public_run_is_not_enough() {
        let object = StubObject::new("Tool").with_method("run", run_method());
        let err = CrewaiToolAdapter::new()
            .convert(InvocationTarget::instance(object), "t", "", search_schema())
            .unwrap_err();
        assert!(matches!(err, AdapterError::Configuration(_)));
    }
}
