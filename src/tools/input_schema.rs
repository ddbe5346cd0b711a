//! Input schemas, projected parameter lists and argument binding.
//!
//! An [`InputSchema`] is an ordered list of typed fields. Its order is the
//! parameter order of every tool projected from it, and it is what validates
//! raw call arguments into a [`StructuredInput`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utilities::errors::{SchemaError, ValidationError};

/// Declared type of a schema field.
///
/// Serialized as a bare type name: `str`/`string`, `int`/`integer`,
/// `float`/`number`, `bool`/`boolean`, `any` (or empty) for unresolved, and
/// anything else as a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// Opaque type known only by name (`list`, `dict`, `Location`, ...).
    Named(String),
    /// A type without a usable name.
    Unresolved,
}

impl FieldType {
    /// The annotation a projected parameter carries for this type.
    pub fn annotation(&self) -> TypeAnnotation {
        match self {
            FieldType::String => TypeAnnotation::Concrete("str".to_string()),
            FieldType::Int => TypeAnnotation::Concrete("int".to_string()),
            FieldType::Float => TypeAnnotation::Concrete("float".to_string()),
            FieldType::Bool => TypeAnnotation::Concrete("bool".to_string()),
            FieldType::Named(name) if !name.trim().is_empty() => {
                TypeAnnotation::Concrete(name.clone())
            }
            FieldType::Named(_) | FieldType::Unresolved => TypeAnnotation::Any,
        }
    }

    /// JSON Schema `type` keyword, when one applies.
    fn json_type(&self) -> Option<&'static str> {
        match self {
            FieldType::String => Some("string"),
            FieldType::Int => Some("integer"),
            FieldType::Float => Some("number"),
            FieldType::Bool => Some("boolean"),
            FieldType::Named(name) => match name.as_str() {
                "list" | "tuple" | "List" => Some("array"),
                "dict" | "Dict" => Some("object"),
                _ => None,
            },
            FieldType::Unresolved => None,
        }
    }

    /// Whether `value` conforms to this type. No coercion is attempted.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Named(_) | FieldType::Unresolved => true,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.trim() {
            "str" | "string" => FieldType::String,
            "int" | "integer" => FieldType::Int,
            "float" | "number" => FieldType::Float,
            "bool" | "boolean" => FieldType::Bool,
            "" | "any" | "Any" => FieldType::Unresolved,
            other => FieldType::Named(other.to_string()),
        }
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        ty.annotation().to_string()
    }
}

/// Annotation shown on a projected parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAnnotation {
    Concrete(String),
    /// Open parameter; anything is accepted.
    Any,
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAnnotation::Concrete(name) => f.write_str(name),
            TypeAnnotation::Any => f.write_str("Any"),
        }
    }
}

/// One field of an input schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
        }
    }

    /// Builder method to attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A projected parameter: name plus annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub annotation: TypeAnnotation,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.annotation)
    }
}

/// Ordered field declaration used to validate input and project a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSchema {
    pub title: String,
    pub fields: Vec<FieldDescriptor>,
}

impl InputSchema {
    /// Create a schema, rejecting duplicate or empty field names.
    pub fn new(
        title: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let schema = Self {
            title: title.into(),
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Schema with no fields.
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Check the field-name invariants. Schemas built through serde skip
    /// [`InputSchema::new`], so projection calls this again.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    schema: self.title.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    schema: self.title.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Projected parameter list, one per field, in order.
    pub fn parameters(&self) -> Vec<Parameter> {
        self.fields
            .iter()
            .map(|f| Parameter {
                name: f.name.clone(),
                annotation: f.ty.annotation(),
            })
            .collect()
    }

    /// JSON Schema object describing the fields. Every field is required.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("title".to_string(), Value::String(title_case(&field.name)));
            if let Some(json_type) = field.ty.json_type() {
                prop.insert("type".to_string(), Value::String(json_type.to_string()));
            }
            if let Some(description) = &field.description {
                prop.insert(
                    "description".to_string(),
                    Value::String(description.clone()),
                );
            }
            properties.insert(field.name.clone(), Value::Object(prop));
        }

        let required = self
            .fields
            .iter()
            .map(|f| Value::String(f.name.clone()))
            .collect();

        let mut schema = Map::new();
        schema.insert("title".to_string(), Value::String(self.title.clone()));
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        Value::Object(schema)
    }

    /// Bind raw call arguments to the schema.
    ///
    /// Positional values fill fields in order, keywords bind by name. Every
    /// field must end up bound exactly once with a conforming value.
    pub fn bind(&self, args: ToolArgs) -> Result<StructuredInput, ValidationError> {
        let ToolArgs {
            positional,
            keyword,
        } = args;

        if positional.len() > self.fields.len() {
            return Err(ValidationError::TooManyPositional {
                expected: self.fields.len(),
                given: positional.len(),
            });
        }

        if let Some(unknown) = keyword.keys().find(|k| self.field(k).is_none()) {
            return Err(ValidationError::Unexpected {
                field: unknown.clone(),
            });
        }

        let mut keyword = keyword;
        let mut positional = positional.into_iter();
        let mut values = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let value = match positional.next() {
                Some(value) => {
                    if keyword.contains_key(&field.name) {
                        return Err(ValidationError::Duplicate {
                            field: field.name.clone(),
                        });
                    }
                    value
                }
                None => keyword
                    .remove(&field.name)
                    .ok_or_else(|| ValidationError::Missing {
                        field: field.name.clone(),
                    })?,
            };

            if !field.ty.accepts(&value) {
                return Err(ValidationError::Type {
                    field: field.name.clone(),
                    expected: field.ty.annotation().to_string(),
                    found: json_kind(&value).to_string(),
                });
            }
            values.push((field.name.clone(), value));
        }

        Ok(StructuredInput { values })
    }
}

/// Raw arguments supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    pub positional: Vec<Value>,
    pub keyword: Map<String, Value>,
}

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments given only by keyword.
    pub fn keywords(keyword: Map<String, Value>) -> Self {
        Self {
            positional: Vec::new(),
            keyword,
        }
    }

    /// Arguments given only by position.
    pub fn positional(values: Vec<Value>) -> Self {
        Self {
            positional: values,
            keyword: Map::new(),
        }
    }

    /// Builder method to append a positional value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Builder method to set a keyword value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Interpret a JSON value as arguments: an object binds by keyword, an
    /// array by position, `null` means no arguments.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self::keywords(map)),
            Value::Array(items) => Ok(Self::positional(items)),
            Value::Null => Ok(Self::new()),
            other => Err(ValidationError::Type {
                field: "arguments".to_string(),
                expected: "object or array".to_string(),
                found: json_kind(&other).to_string(),
            }),
        }
    }
}

/// A validated binding of every schema field, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredInput {
    values: Vec<(String, Value)>,
}

impl StructuredInput {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Values in schema order.
    pub fn values(&self) -> Vec<Value> {
        self.values.iter().map(|(_, v)| v.clone()).collect()
    }

    /// `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The input as a JSON object, keys in schema order.
    pub fn to_map(&self) -> Map<String, Value> {
        self.values.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ab_schema() -> InputSchema {
        InputSchema::new(
            "AbInput",
            vec![
                FieldDescriptor::new("a", FieldType::String),
                FieldDescriptor::new("b", FieldType::Int),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = InputSchema::new(
            "Dup",
            vec![
                FieldDescriptor::new("q", FieldType::String),
                FieldDescriptor::new("q", FieldType::Int),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                schema: "Dup".into(),
                field: "q".into()
            }
        );
    }

    #[test]
    fn test_parameters_follow_schema_order() {
        let params = ab_schema().parameters();
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(params[0].to_string(), "a: str");
        assert_eq!(params[1].to_string(), "b: int");
    }

    #[test]
    fn test_unresolved_type_projects_as_any() {
        let schema = InputSchema::new(
            "Loose",
            vec![
                FieldDescriptor::new("payload", FieldType::Unresolved),
                FieldDescriptor::new("blank", FieldType::Named(String::new())),
                FieldDescriptor::new("tags", FieldType::Named("list".into())),
            ],
        )
        .unwrap();
        let params = schema.parameters();
        assert_eq!(params[0].annotation, TypeAnnotation::Any);
        assert_eq!(params[1].annotation, TypeAnnotation::Any);
        assert_eq!(params[2].annotation, TypeAnnotation::Concrete("list".into()));

        let input = schema
            .bind(ToolArgs::new().arg(json!({"x": 1})).arg(3).arg(json!(["a"])))
            .unwrap();
        assert_eq!(input.get("payload"), Some(&json!({"x": 1})));
    }

    #[test]
    fn test_bind_keywords() {
        let input = ab_schema()
            .bind(ToolArgs::new().kwarg("b", 1).kwarg("a", "x"))
            .unwrap();
        assert_eq!(Value::Object(input.to_map()), json!({"a": "x", "b": 1}));
        let keys: Vec<_> = input.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_bind_mixed_positional_and_keyword() {
        let input = ab_schema()
            .bind(ToolArgs::new().arg("x").kwarg("b", 1))
            .unwrap();
        assert_eq!(input.values(), vec![json!("x"), json!(1)]);
    }

    #[test]
    fn test_bind_errors() {
        let schema = ab_schema();

        let err = schema.bind(ToolArgs::new().kwarg("a", "x")).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "b".into() });

        let err = schema
            .bind(ToolArgs::new().kwarg("a", "x").kwarg("b", 1).kwarg("c", 2))
            .unwrap_err();
        assert_eq!(err, ValidationError::Unexpected { field: "c".into() });

        let err = schema
            .bind(ToolArgs::new().arg("x").kwarg("a", "y").kwarg("b", 1))
            .unwrap_err();
        assert_eq!(err, ValidationError::Duplicate { field: "a".into() });

        let err = schema
            .bind(ToolArgs::new().arg("x").arg(1).arg(2))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManyPositional {
                expected: 2,
                given: 3
            }
        );
    }

    #[test]
    fn test_bind_rejects_non_conforming_values() {
        let schema = ab_schema();
        let err = schema
            .bind(ToolArgs::new().kwarg("a", "x").kwarg("b", "1"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Type { ref field, .. } if field == "b"));

        let err = schema
            .bind(ToolArgs::new().kwarg("a", "x").kwarg("b", 1.5))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Type { ref found, .. } if found == "float"));
    }

    #[test]
    fn test_float_field_accepts_integers() {
        let schema =
            InputSchema::new("F", vec![FieldDescriptor::new("t", FieldType::Float)]).unwrap();
        assert!(schema.bind(ToolArgs::new().arg(2)).is_ok());
        assert!(schema.bind(ToolArgs::new().arg(2.5)).is_ok());
        assert!(schema.bind(ToolArgs::new().arg(true)).is_err());
    }

    #[test]
    fn test_json_schema() {
        let schema = InputSchema::new(
            "SearchInput",
            vec![
                FieldDescriptor::new("search_query", FieldType::String)
                    .with_description("What to look for"),
                FieldDescriptor::new("limit", FieldType::Int),
                FieldDescriptor::new("extra", FieldType::Unresolved),
            ],
        )
        .unwrap();
        assert_eq!(
            schema.to_json_schema(),
            json!({
                "title": "SearchInput",
                "type": "object",
                "properties": {
                    "search_query": {"title": "Search Query", "type": "string", "description": "What to look for"},
                    "limit": {"title": "Limit", "type": "integer"},
                    "extra": {"title": "Extra"}
                },
                "required": ["search_query", "limit", "extra"]
            })
        );
    }

    #[test]
    fn test_args_from_value() {
        assert_eq!(
            ToolArgs::from_value(json!({"a": 1})).unwrap(),
            ToolArgs::new().kwarg("a", 1)
        );
        assert_eq!(
            ToolArgs::from_value(json!(["x"])).unwrap(),
            ToolArgs::new().arg("x")
        );
        assert!(ToolArgs::from_value(json!("bare")).is_err());
    }

    #[test]
    fn test_schema_from_yaml() {
        let yaml = r#"
title: WeatherInput
fields:
  - name: city
    type: string
  - name: days
    type: int
    description: Forecast length
  - name: units
    type: Units
  - name: extra
    type: any
"#;
        let schema: InputSchema = serde_yaml::from_str(yaml).unwrap();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.field_names(), vec!["city", "days", "units", "extra"]);
        assert_eq!(schema.fields[0].ty, FieldType::String);
        assert_eq!(schema.fields[2].ty, FieldType::Named("Units".into()));
        assert_eq!(schema.fields[3].ty, FieldType::Unresolved);
    }
}
