//! Invocation targets and their one-time classification.
//!
//! A framework object reaches an adapter as an [`InvocationTarget`]: a class
//! that must be instantiated per call, an object that is already built, or a
//! bare callable. [`classify`] resolves which method to call and whether it
//! is asynchronous exactly once, when the tool is created; the resulting
//! [`ClassifiedTarget`] is carried by the tool and never re-probed.

use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};

use crate::utilities::errors::{AdapterError, TargetError};
use crate::utilities::normalize::RawValue;

/// Arguments handed to a target method.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    /// Named arguments.
    Keyword(Map<String, Value>),
    /// Positional arguments.
    Positional(Vec<Value>),
}

impl CallArgs {
    /// Named arguments, or an error when given positional ones.
    pub fn into_keyword(self) -> Result<Map<String, Value>, TargetError> {
        match self {
            CallArgs::Keyword(map) => Ok(map),
            CallArgs::Positional(_) => Err(TargetError::new(
                "expected keyword arguments, got positional arguments",
            )),
        }
    }

    /// Positional arguments, or an error when given keywords.
    pub fn into_positional(self) -> Result<Vec<Value>, TargetError> {
        match self {
            CallArgs::Positional(values) => Ok(values),
            CallArgs::Keyword(_) => Err(TargetError::new(
                "expected positional arguments, got keyword arguments",
            )),
        }
    }

    /// The single value a one-argument target reads: the first positional
    /// value, or the keyword called `name`. Positional calls ignore `name`.
    pub fn first_or_named(self, name: &str) -> Option<Value> {
        match self {
            CallArgs::Positional(values) => values.into_iter().next(),
            CallArgs::Keyword(mut map) => map.remove(name),
        }
    }
}

pub type SyncMethodFn = dyn Fn(CallArgs) -> Result<RawValue, TargetError> + Send + Sync;
pub type AsyncMethodFn =
    dyn Fn(CallArgs) -> BoxFuture<'static, Result<RawValue, TargetError>> + Send + Sync;

/// A callable entry point on a target. The variant is its async flag.
#[derive(Clone)]
pub enum Method {
    Sync(Arc<SyncMethodFn>),
    Async(Arc<AsyncMethodFn>),
}

impl Method {
    /// Wrap a synchronous function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(CallArgs) -> Result<RawValue, TargetError> + Send + Sync + 'static,
    {
        Method::Sync(Arc::new(f))
    }

    /// Wrap a function returning a future.
    pub fn asynchronous<F, Fut>(f: F) -> Self
    where
        F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<RawValue, TargetError>> + Send + 'static,
    {
        Method::Async(Arc::new(move |args| f(args).boxed()))
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            Method::Sync(_) => MethodKind::Sync,
            Method::Async(_) => MethodKind::Async,
        }
    }

    pub fn is_async(&self) -> bool {
        self.kind() == MethodKind::Async
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method::{:?}", self.kind())
    }
}

/// Whether a method must be awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Sync,
    Async,
}

/// An already constructed object exposing named methods.
pub trait TargetObject: Send + Sync {
    /// Type name used in diagnostics.
    fn type_name(&self) -> &str;

    /// Resolve a method by name.
    fn method(&self, name: &str) -> Option<Method>;
}

/// A class: something that is instantiated with no arguments before each
/// call.
pub trait TargetClass: Send + Sync {
    /// Type name used in diagnostics.
    fn type_name(&self) -> &str;

    /// Kind of the named method, without instantiating. `None` when the class
    /// has no such method.
    fn method_kind(&self, name: &str) -> Option<MethodKind>;

    /// Build a fresh instance.
    fn instantiate(&self) -> Result<Arc<dyn TargetObject>, TargetError>;
}

/// The wrapped object, before classification.
#[derive(Clone)]
pub enum InvocationTarget {
    Class(Arc<dyn TargetClass>),
    Instance(Arc<dyn TargetObject>),
    Callable(Method),
}

impl InvocationTarget {
    pub fn class(class: impl TargetClass + 'static) -> Self {
        InvocationTarget::Class(Arc::new(class))
    }

    pub fn instance(object: impl TargetObject + 'static) -> Self {
        InvocationTarget::Instance(Arc::new(object))
    }

    pub fn callable(method: Method) -> Self {
        InvocationTarget::Callable(method)
    }

    fn type_name(&self) -> &str {
        match self {
            InvocationTarget::Class(class) => class.type_name(),
            InvocationTarget::Instance(object) => object.type_name(),
            InvocationTarget::Callable(_) => "callable",
        }
    }
}

impl fmt::Debug for InvocationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationTarget::Class(class) => write!(f, "Class({})", class.type_name()),
            InvocationTarget::Instance(object) => write!(f, "Instance({})", object.type_name()),
            InvocationTarget::Callable(method) => write!(f, "Callable({:?})", method),
        }
    }
}

/// The shape a target was classified into.
#[derive(Clone)]
pub enum TargetShape {
    /// Instantiate per call, then call the named method.
    ClassMethod {
        class: Arc<dyn TargetClass>,
        method: String,
    },
    /// Call a method resolved once on an existing object.
    InstanceMethod {
        object: Arc<dyn TargetObject>,
        method: Method,
    },
    /// Call directly.
    Callable(Method),
}

/// Result of [`classify`], frozen into the tool.
#[derive(Clone)]
pub struct ClassifiedTarget {
    pub shape: TargetShape,
    /// Name of the selected method, `None` for bare callables.
    pub method_name: Option<String>,
    pub is_async: bool,
    pub type_name: String,
}

impl fmt::Debug for ClassifiedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self.shape {
            TargetShape::ClassMethod { .. } => "ClassMethod",
            TargetShape::InstanceMethod { .. } => "InstanceMethod",
            TargetShape::Callable(_) => "Callable",
        };
        f.debug_struct("ClassifiedTarget")
            .field("shape", &shape)
            .field("type_name", &self.type_name)
            .field("method_name", &self.method_name)
            .field("is_async", &self.is_async)
            .finish()
    }
}

/// Classify a target against an ordered list of candidate method names.
///
/// The first candidate the target exposes wins. Classes are not instantiated
/// here. Bare callables ignore the candidate list.
pub fn classify(
    target: InvocationTarget,
    candidates: &[String],
) -> Result<ClassifiedTarget, AdapterError> {
    let type_name = target.type_name().to_string();

    let classified = match target {
        InvocationTarget::Callable(method) => ClassifiedTarget {
            is_async: method.is_async(),
            shape: TargetShape::Callable(method),
            method_name: None,
            type_name,
        },
        InvocationTarget::Class(class) => {
            let (name, kind) = candidates
                .iter()
                .find_map(|name| class.method_kind(name).map(|kind| (name.clone(), kind)))
                .ok_or_else(|| missing_methods(&type_name, candidates))?;
            ClassifiedTarget {
                shape: TargetShape::ClassMethod {
                    class,
                    method: name.clone(),
                },
                method_name: Some(name),
                is_async: kind == MethodKind::Async,
                type_name,
            }
        }
        InvocationTarget::Instance(object) => {
            let (name, method) = candidates
                .iter()
                .find_map(|name| object.method(name).map(|method| (name.clone(), method)))
                .ok_or_else(|| missing_methods(&type_name, candidates))?;
            ClassifiedTarget {
                is_async: method.is_async(),
                shape: TargetShape::InstanceMethod { object, method },
                method_name: Some(name),
                type_name,
            }
        }
    };

    log::debug!(
        "classified {} (method: {:?}, async: {})",
        classified.type_name,
        classified.method_name,
        classified.is_async
    );
    Ok(classified)
}

fn missing_methods(type_name: &str, candidates: &[String]) -> AdapterError {
    AdapterError::configuration(format!(
        "{} has none of the expected methods: [{}]",
        type_name,
        candidates.join(", ")
    ))
}
