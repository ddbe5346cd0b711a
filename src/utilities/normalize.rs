//! Coercion of target return values into JSON-safe shapes.
//!
//! Targets hand back a [`RawValue`]: plain JSON-like data, or an opaque
//! [`ObjectValue`] exposing whichever conversion capabilities it has.
//! [`normalize`] walks that tree and always produces a `serde_json::Value`,
//! falling back to the string representation when nothing else works.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Number, Value};

use super::errors::TargetError;

/// Limit on nested object conversions in [`normalize`]. An object reached
/// through this many conversions is rendered with its string representation.
/// Plain sequences and mappings do not count towards it.
pub const MAX_NORMALIZE_DEPTH: usize = 64;

/// A value returned by a wrapped target, before normalization.
#[derive(Clone)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<RawValue>),
    /// Key order is kept but carries no meaning.
    Mapping(Vec<(String, RawValue)>),
    Object(Arc<dyn ObjectValue>),
}

/// An opaque object returned by a target.
///
/// Every capability is optional. The normalizer tries them in order:
/// `to_dict`, `model_dump`, `public_attributes`, then the `results`
/// attribute. A capability that returns `Some(Err(_))` makes the normalizer
/// give up on the object and use its `Display` output.
pub trait ObjectValue: fmt::Display + fmt::Debug + Send + Sync {
    /// Name of the object's type, used in logs and diagnostics.
    fn type_name(&self) -> &str;

    /// Object-to-mapping conversion.
    fn to_dict(&self) -> Option<Result<RawValue, TargetError>> {
        None
    }

    /// Validated-model dump.
    fn model_dump(&self) -> Option<Result<RawValue, TargetError>> {
        None
    }

    /// The object's own attribute table. Names starting with an underscore
    /// are dropped by the normalizer.
    fn public_attributes(&self) -> Option<Vec<(String, RawValue)>> {
        None
    }

    /// Look up a single attribute by name.
    fn attribute(&self, name: &str) -> Option<RawValue> {
        self.public_attributes()?
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl RawValue {
    /// Wrap an object.
    pub fn object(obj: impl ObjectValue + 'static) -> Self {
        RawValue::Object(Arc::new(obj))
    }

    /// Build a mapping from `(key, value)` pairs.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        RawValue::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Whether the value is one of the scalar JSON shapes.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            RawValue::Null | RawValue::Bool(_) | RawValue::Number(_) | RawValue::String(_)
        )
    }

    /// Look up an attribute on an object, or a key on a mapping.
    pub fn attribute(&self, name: &str) -> Option<RawValue> {
        match self {
            RawValue::Object(obj) => obj.attribute(name),
            RawValue::Mapping(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    /// String representation. Scalars and containers render as JSON,
    /// objects through their `Display`.
    pub fn to_display_string(&self) -> String {
        match self {
            RawValue::String(s) => s.clone(),
            RawValue::Object(obj) => obj.to_string(),
            other => normalize(other).to_string(),
        }
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("Null"),
            RawValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            RawValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            RawValue::String(s) => f.debug_tuple("String").field(s).finish(),
            RawValue::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            RawValue::Mapping(entries) => f.debug_tuple("Mapping").field(entries).finish(),
            RawValue::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => RawValue::Number(n),
            Value::String(s) => RawValue::String(s),
            Value::Array(items) => RawValue::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                RawValue::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::String(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Number(n.into())
    }
}

impl From<u64> for RawValue {
    fn from(n: u64) -> Self {
        RawValue::Number(n.into())
    }
}

impl From<f64> for RawValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(RawValue::Null, RawValue::Number)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        RawValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

/// Convert a target's return value into a JSON-safe value.
///
/// Never fails: anything that cannot be converted structurally ends up as
/// its string representation.
pub fn normalize(value: &RawValue) -> Value {
    normalize_at(value, 0)
}

/// Normalize an owned value.
pub fn normalize_owned(value: RawValue) -> Value {
    normalize_at(&value, 0)
}

fn normalize_at(value: &RawValue, depth: usize) -> Value {
    match value {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::Number(n) => Value::Number(n.clone()),
        RawValue::String(s) => Value::String(s.clone()),
        RawValue::Sequence(items) => Value::Array(
            items
                .iter()
                .map(|item| normalize_at(item, depth))
                .collect(),
        ),
        RawValue::Mapping(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), normalize_at(item, depth)))
                .collect::<Map<String, Value>>(),
        ),
        RawValue::Object(obj) => normalize_object(obj.as_ref(), depth),
    }
}

fn normalize_object(obj: &dyn ObjectValue, depth: usize) -> Value {
    if depth >= MAX_NORMALIZE_DEPTH {
        log::warn!(
            "normalization depth limit ({}) reached at {}, using string representation",
            MAX_NORMALIZE_DEPTH,
            obj.type_name()
        );
        return Value::String(obj.to_string());
    }
    match extract(obj) {
        Some(Ok(extracted)) => normalize_at(&extracted, depth + 1),
        Some(Err(err)) => {
            log::debug!(
                "conversion of {} failed ({}), using string representation",
                obj.type_name(),
                err
            );
            Value::String(obj.to_string())
        }
        None => Value::String(obj.to_string()),
    }
}

/// Pick the first conversion capability the object offers.
fn extract(obj: &dyn ObjectValue) -> Option<Result<RawValue, TargetError>> {
    if let Some(converted) = obj.to_dict() {
        return Some(converted);
    }
    if let Some(dumped) = obj.model_dump() {
        return Some(dumped);
    }
    if let Some(attributes) = obj.public_attributes() {
        let public = attributes
            .into_iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .collect();
        return Some(Ok(RawValue::Mapping(public)));
    }
    // A sequence under `results` is recursed as a sequence, a scalar as is.
    obj.attribute("results").map(Ok)
}
