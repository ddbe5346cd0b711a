//! Error types shared by the schema projector, the invocation bridge and the
//! adapters.

use std::fmt;

use thiserror::Error;

/// Boxed error type carried by foreign targets.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while declaring an input schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    /// A field was declared with an empty name.
    #[error("schema '{schema}' declares a field with an empty name")]
    EmptyFieldName { schema: String },
}

/// Errors raised when call arguments do not fit the input schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A schema field received no value.
    #[error("missing required argument '{field}'")]
    Missing { field: String },

    /// A keyword that is not a schema field.
    #[error("unexpected keyword argument '{field}'")]
    Unexpected { field: String },

    /// A field was bound both positionally and by keyword.
    #[error("got multiple values for argument '{field}'")]
    Duplicate { field: String },

    /// More positional values than schema fields.
    #[error("takes {expected} positional arguments but {given} were given")]
    TooManyPositional { expected: usize, given: usize },

    /// A value does not conform to its declared type.
    #[error("argument '{field}' should be {expected}, got {found}")]
    Type {
        field: String,
        expected: String,
        found: String,
    },
}

/// Failure raised by a wrapped target.
///
/// `Display` is exactly the target's own message so a propagated failure
/// reads the same as it did inside the target.
#[derive(Debug)]
pub struct TargetError {
    source: BoxError,
}

impl TargetError {
    /// Create a target error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            source: message.into().into(),
        }
    }

    /// Wrap an arbitrary error raised by a target.
    pub fn from_error(err: impl Into<BoxError>) -> Self {
        Self { source: err.into() }
    }

    /// The message the target failed with.
    pub fn message(&self) -> String {
        self.source.to_string()
    }

    /// Borrow the underlying error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Take the underlying error back.
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl std::error::Error for TargetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}

impl From<BoxError> for TargetError {
    fn from(source: BoxError) -> Self {
        Self { source }
    }
}

impl From<&str> for TargetError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for TargetError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Errors loading adapter settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A setting is present but unusable.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Top-level error returned by projected tools and adapters.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The input schema is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The target or the adapter settings cannot produce a wrapper.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Call arguments do not fit the input schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The wrapped target failed.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Settings could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host already holds a tool with this name.
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    /// A host has no tool with this name.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
}

impl AdapterError {
    /// Shorthand for a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this failure came from the wrapped target.
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target(_))
    }
}
