//! Crews as tools.
//!
//! Two shapes are supported. [`CrewaiAdapter`] wraps a crew class: a fresh
//! crew is built for every call and kicked off with the whole input under
//! `inputs`. [`CrewAgentAdapter`] wraps a one-agent, one-task crew that is
//! assembled from the input itself, see [`CrewFactory`].

use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::bridge::{post_hook, ArgStyle, Hooks};
use super::target::{CallArgs, InvocationTarget, Method, TargetObject};
use super::McpAdapter;
use crate::tools::input_schema::InputSchema;
use crate::tools::projected_tool::ProjectedTool;
use crate::utilities::config::AdapterSettings;
use crate::utilities::errors::{AdapterError, TargetError};
use crate::utilities::normalize::{normalize, RawValue};

/// Entry point every crew exposes.
pub const KICKOFF: &str = "kickoff";

/// Wraps a crew class. Returns the crew output serialized as a JSON string.
#[derive(Debug, Clone, Default)]
pub struct CrewaiAdapter;

impl CrewaiAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl McpAdapter for CrewaiAdapter {
    fn settings(&self) -> AdapterSettings {
        AdapterSettings::new()
            .with_methods([KICKOFF])
            .with_arg_style(ArgStyle::Nested("inputs".into()))
    }

    fn hooks(&self) -> Hooks {
        Hooks::none().with_post(post_hook(|raw| Ok(RawValue::from(normalize(&raw).to_string()))))
    }
}

/// Builds the crew for a single call.
///
/// Implementations create the agent and the task from `inputs` and put them
/// into a crew exposing [`KICKOFF`].
pub trait CrewFactory: Send + Sync {
    fn assemble(&self, inputs: &Map<String, Value>) -> Result<Arc<dyn TargetObject>, TargetError>;
}

impl<F> CrewFactory for F
where
    F: Fn(&Map<String, Value>) -> Result<Arc<dyn TargetObject>, TargetError> + Send + Sync,
{
    fn assemble(&self, inputs: &Map<String, Value>) -> Result<Arc<dyn TargetObject>, TargetError> {
        self(inputs)
    }
}

/// Target that assembles a crew from the call's keyword input and kicks it
/// off.
pub fn crew_target(factory: impl CrewFactory + 'static) -> InvocationTarget {
    let factory: Arc<dyn CrewFactory> = Arc::new(factory);
    InvocationTarget::callable(Method::asynchronous(move |args: CallArgs| {
        let factory = factory.clone();
        async move {
            let inputs = args.into_keyword()?;
            let crew = factory.assemble(&inputs)?;
            let kickoff = crew.method(KICKOFF).ok_or_else(|| {
                TargetError::new(format!("{} has no '{}' method", crew.type_name(), KICKOFF))
            })?;
            log::debug!("kicking off assembled {}", crew.type_name());
            let no_args = CallArgs::Keyword(Map::new());
            match kickoff {
                Method::Sync(f) => f(no_args),
                Method::Async(f) => f(no_args).await,
            }
        }
    }))
}

/// Wraps an agent and a task that are rebuilt from the input on every call.
/// Returns `{"result": ...}` serialized as a JSON string.
#[derive(Debug, Clone, Default)]
pub struct CrewAgentAdapter;

impl CrewAgentAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Convert a crew factory into a tool.
    pub fn convert_crew(
        &self,
        factory: impl CrewFactory + 'static,
        name: &str,
        description: &str,
        input_schema: InputSchema,
    ) -> Result<ProjectedTool, AdapterError> {
        self.convert(crew_target(factory), name, description, input_schema)
    }
}

impl McpAdapter for CrewAgentAdapter {
    // The factory target is a plain callable; `kickoff` is resolved on the
    // assembled crew at call time.
    fn settings(&self) -> AdapterSettings {
        AdapterSettings::new()
    }

    fn hooks(&self) -> Hooks {
        Hooks::none().with_post(post_hook(|raw| {
            Ok(RawValue::from(json!({ "result": normalize(&raw) }).to_string()))
        }))
    }
}
