//! The invocation bridge: one call to a classified target behind one async
//! interface.
//!
//! Synchronous methods run inline within the current poll; asynchronous ones
//! are awaited. Either way the call runs inside an output-capture scope, so
//! nothing the target prints reaches the host's stdout. What happens to a
//! failure is decided by the adapter's [`FailurePolicy`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;

use super::target::{CallArgs, ClassifiedTarget, Method, TargetShape};
use crate::tools::input_schema::{InputSchema, StructuredInput};
use crate::utilities::errors::{AdapterError, TargetError};
use crate::utilities::normalize::{normalize_owned, RawValue};
use crate::utilities::output;

/// Hook run before the target, inside the same capture scope.
pub type PreHook = Arc<dyn Fn() -> BoxFuture<'static, Result<(), TargetError>> + Send + Sync>;

/// Projection applied to the raw result before normalization.
pub type PostHook = Arc<dyn Fn(RawValue) -> Result<RawValue, TargetError> + Send + Sync>;

/// Build a [`PreHook`] from an async closure.
pub fn pre_hook<F, Fut>(f: F) -> PreHook
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TargetError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Build a [`PostHook`] from a closure.
pub fn post_hook<F>(f: F) -> PostHook
where
    F: Fn(RawValue) -> Result<RawValue, TargetError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Optional hooks an adapter attaches around the call.
#[derive(Clone, Default)]
pub struct Hooks {
    pub pre: Option<PreHook>,
    pub post: Option<PostHook>,
}

impl Hooks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_pre(mut self, hook: PreHook) -> Self {
        self.pre = Some(hook);
        self
    }

    pub fn with_post(mut self, hook: PostHook) -> Self {
        self.post = Some(hook);
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

/// How a structured input is passed to the target.
///
/// Serialized as `keyword`, `positional`, `mapping`, `field:<name>` or
/// `nested:<key>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArgStyle {
    /// Every field as a named argument.
    #[default]
    Keyword,
    /// Field values as positional arguments, in schema order.
    Positional,
    /// One positional argument holding the whole input as a mapping.
    Mapping,
    /// One positional argument: the value of the named field.
    Field(String),
    /// One named argument `key` holding the whole input as a mapping.
    Nested(String),
}

impl ArgStyle {
    /// Check the style against the schema it will be applied to.
    pub fn check(&self, schema: &InputSchema) -> Result<(), AdapterError> {
        match self {
            ArgStyle::Field(name) if schema.field(name).is_none() => {
                Err(AdapterError::configuration(format!(
                    "argument style needs field '{}' but schema '{}' has [{}]",
                    name,
                    schema.title,
                    schema.field_names().join(", ")
                )))
            }
            _ => Ok(()),
        }
    }

    /// Turn a structured input into call arguments.
    pub fn call_args(&self, input: &StructuredInput) -> Result<CallArgs, AdapterError> {
        let args = match self {
            ArgStyle::Keyword => CallArgs::Keyword(input.to_map()),
            ArgStyle::Positional => CallArgs::Positional(input.values()),
            ArgStyle::Mapping => CallArgs::Positional(vec![Value::Object(input.to_map())]),
            ArgStyle::Field(name) => {
                let value = input.get(name).cloned().ok_or_else(|| {
                    AdapterError::configuration(format!("input has no field '{}'", name))
                })?;
                CallArgs::Positional(vec![value])
            }
            ArgStyle::Nested(key) => {
                let mut map = Map::new();
                map.insert(key.clone(), Value::Object(input.to_map()));
                CallArgs::Keyword(map)
            }
        };
        Ok(args)
    }
}

impl fmt::Display for ArgStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgStyle::Keyword => f.write_str("keyword"),
            ArgStyle::Positional => f.write_str("positional"),
            ArgStyle::Mapping => f.write_str("mapping"),
            ArgStyle::Field(name) => write!(f, "field:{}", name),
            ArgStyle::Nested(key) => write!(f, "nested:{}", key),
        }
    }
}

impl TryFrom<String> for ArgStyle {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg.trim())),
            None => (s.trim(), None),
        };
        match (kind, arg) {
            ("keyword", None) => Ok(ArgStyle::Keyword),
            ("positional", None) => Ok(ArgStyle::Positional),
            ("mapping", None) => Ok(ArgStyle::Mapping),
            ("field", Some(name)) if !name.is_empty() => Ok(ArgStyle::Field(name.to_string())),
            ("nested", Some(key)) if !key.is_empty() => Ok(ArgStyle::Nested(key.to_string())),
            _ => Err(format!(
                "unknown argument style '{}' (expected keyword, positional, mapping, field:<name> or nested:<key>)",
                s
            )),
        }
    }
}

impl From<ArgStyle> for String {
    fn from(style: ArgStyle) -> Self {
        style.to_string()
    }
}

/// What a failed target call turns into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the target's error to the caller unchanged.
    #[default]
    Propagate,
    /// Return `{"status": "error", "message": ...}` instead of failing.
    Report,
}

impl FailurePolicy {
    fn handle(self, tool: &str, err: TargetError) -> Result<Value, AdapterError> {
        match self {
            FailurePolicy::Propagate => Err(AdapterError::Target(err)),
            FailurePolicy::Report => {
                log::warn!("tool '{}' failed, reporting: {}", tool, err);
                Ok(error_payload(&err))
            }
        }
    }
}

/// Structured error value returned under [`FailurePolicy::Report`].
pub fn error_payload(err: &TargetError) -> Value {
    json!({"status": "error", "message": err.to_string()})
}

/// Where the call runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    /// Awaited directly by the caller.
    #[default]
    Inline,
    /// Run on its own task, aborted if the caller goes away.
    Spawned,
}

/// A classified target plus everything needed to call it.
#[derive(Clone)]
pub struct Bridge {
    target: ClassifiedTarget,
    arg_style: ArgStyle,
    policy: FailurePolicy,
    isolation: Isolation,
    pre_hook: Option<PreHook>,
    post_hook: Option<PostHook>,
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("target", &self.target)
            .field("arg_style", &self.arg_style)
            .field("policy", &self.policy)
            .field("isolation", &self.isolation)
            .field("pre_hook", &self.pre_hook.is_some())
            .field("post_hook", &self.post_hook.is_some())
            .finish()
    }
}

impl Bridge {
    pub fn new(target: ClassifiedTarget) -> Self {
        Self {
            target,
            arg_style: ArgStyle::default(),
            policy: FailurePolicy::default(),
            isolation: Isolation::default(),
            pre_hook: None,
            post_hook: None,
        }
    }

    pub fn with_arg_style(mut self, arg_style: ArgStyle) -> Self {
        self.arg_style = arg_style;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_pre_hook(mut self, hook: Option<PreHook>) -> Self {
        self.pre_hook = hook;
        self
    }

    pub fn with_post_hook(mut self, hook: Option<PostHook>) -> Self {
        self.post_hook = hook;
        self
    }

    pub fn with_hooks(self, hooks: Hooks) -> Self {
        self.with_pre_hook(hooks.pre).with_post_hook(hooks.post)
    }

    pub fn target(&self) -> &ClassifiedTarget {
        &self.target
    }

    pub fn arg_style(&self) -> &ArgStyle {
        &self.arg_style
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Call the target once with `input` and return its normalized result.
    pub async fn invoke(&self, tool: &str, input: &StructuredInput) -> Result<Value, AdapterError> {
        let args = self.arg_style.call_args(input)?;
        let call = run(
            self.target.clone(),
            args,
            self.pre_hook.clone(),
            self.post_hook.clone(),
        );

        let outcome = match self.isolation {
            Isolation::Inline => output::suppress(call).await,
            Isolation::Spawned => run_spawned(output::suppress(call)).await,
        };

        match outcome {
            Ok(raw) => Ok(normalize_owned(raw)),
            Err(err) => self.policy.handle(tool, err),
        }
    }
}

async fn run(
    target: ClassifiedTarget,
    args: CallArgs,
    pre_hook: Option<PreHook>,
    post_hook: Option<PostHook>,
) -> Result<RawValue, TargetError> {
    if let Some(pre_hook) = pre_hook {
        pre_hook().await?;
    }

    let raw = match &target.shape {
        TargetShape::ClassMethod { class, method } => {
            let instance = class.instantiate()?;
            let resolved = instance.method(method).ok_or_else(|| {
                TargetError::new(format!(
                    "instance of {} has no method '{}'",
                    target.type_name, method
                ))
            })?;
            dispatch(target.is_async, &resolved, args).await?
        }
        TargetShape::InstanceMethod { method, .. } => {
            dispatch(target.is_async, method, args).await?
        }
        TargetShape::Callable(method) => dispatch(target.is_async, method, args).await?,
    };

    match post_hook {
        Some(post_hook) => post_hook(raw),
        None => Ok(raw),
    }
}

/// Call `method` the way classification decided.
async fn dispatch(is_async: bool, method: &Method, args: CallArgs) -> Result<RawValue, TargetError> {
    match (is_async, method) {
        (false, Method::Sync(f)) => f(args),
        (true, Method::Async(f)) => f(args).await,
        (expected_async, _) => Err(TargetError::new(format!(
            "method was classified as {} but resolved as {}",
            if expected_async { "async" } else { "sync" },
            if method.is_async() { "async" } else { "sync" },
        ))),
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn run_spawned<F>(call: F) -> Result<RawValue, TargetError>
where
    F: Future<Output = Result<RawValue, TargetError>> + Send + 'static,
{
    let mut guard = AbortOnDrop(tokio::spawn(call));
    match (&mut guard.0).await {
        Ok(outcome) => outcome,
        Err(join_err) if join_err.is_cancelled() => {
            Err(TargetError::new("target task was cancelled"))
        }
        Err(join_err) => Err(TargetError::new(format!("target task panicked: {}", join_err))),
    }
}
