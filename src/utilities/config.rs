//! Adapter settings and tool definitions.
//!
//! Settings are plain serde data so a host can keep them in YAML next to the
//! rest of its configuration:
//!
//! ```yaml
//! name: research-server
//! tools:
//!   - name: researcher
//!     description: Research a topic
//!     adapter: crewai
//!     input_schema:
//!       title: ResearchInput
//!       fields:
//!         - name: topic
//!           type: str
//!   - name: search
//!     adapter: langchain
//!     method: results
//!     input_schema:
//!       title: SearchInput
//!       fields:
//!         - name: query
//!           type: str
//! ```
//!
//! Anything a tool entry leaves out falls back to its adapter's preset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adapters::bridge::{ArgStyle, FailurePolicy, Isolation};
use crate::adapters::AdapterKind;
use crate::tools::input_schema::InputSchema;
use crate::utilities::errors::ConfigError;

/// How an adapter finds and calls its target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterSettings {
    /// Candidate method names, tried in order.
    #[serde(default)]
    pub methods: Vec<String>,
    /// A single method name that replaces the candidate list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub arg_style: ArgStyle,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub isolation: Isolation,
}

impl AdapterSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the candidate method list.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to force a single method name.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_arg_style(mut self, arg_style: ArgStyle) -> Self {
        self.arg_style = arg_style;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    /// Method names to try, in order. An explicit `method` wins.
    pub fn candidates(&self) -> Vec<String> {
        match &self.method {
            Some(method) => vec![method.clone()],
            None => self.methods.clone(),
        }
    }
}

/// Per-tool overrides on top of an adapter preset. Unset fields keep the
/// preset's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_style: Option<ArgStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_policy: Option<FailurePolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolation: Option<Isolation>,
}

impl SettingsOverrides {
    /// Apply the overrides to `defaults`.
    pub fn apply(&self, defaults: AdapterSettings) -> AdapterSettings {
        AdapterSettings {
            methods: self.methods.clone().unwrap_or(defaults.methods),
            method: self.method.clone().or(defaults.method),
            arg_style: self.arg_style.clone().unwrap_or(defaults.arg_style),
            failure_policy: self.failure_policy.unwrap_or(defaults.failure_policy),
            isolation: self.isolation.unwrap_or(defaults.isolation),
        }
    }
}

/// Definition of a single tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub adapter: AdapterKind,
    pub input_schema: InputSchema,
    #[serde(flatten)]
    pub overrides: SettingsOverrides,
}

impl ToolConfig {
    /// The adapter preset with this tool's overrides applied.
    pub fn settings(&self) -> AdapterSettings {
        self.overrides.apply(self.adapter.default_settings())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("tool name must not be empty".into()));
        }
        self.input_schema
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("tool '{}': {}", self.name, e)))
    }
}

/// A set of tool definitions, as kept in a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tools: Vec<ToolConfig>,
}

impl ToolsConfig {
    /// Parse and validate from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ToolsConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("loading tool definitions from {}", path.display());
        Self::from_yaml(&content)
    }

    pub fn tool(&self, name: &str) -> Option<&ToolConfig> {
        self.tools.iter().find(|t| t.name == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for tool in &self.tools {
            tool.validate()?;
            if !seen.insert(tool.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "tool '{}' is defined more than once",
                    tool.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::input_schema::FieldType;
    use std::io::Write;

    const YAML: &str = r#"
name: research-server
tools:
  - name: researcher
    description: Research a topic
    adapter: crewai
    input_schema:
      title: ResearchInput
      fields:
        - name: topic
          type: str
  - name: search
    adapter: langchain
    method: results
    input_schema:
      title: SearchInput
      fields:
        - name: query
          type: str
        - name: limit
          type: int
  - name: helper
    adapter: mcp_agent
    failure_policy: propagate
    arg_style: "field:question"
    input_schema:
      title: HelperInput
      fields:
        - name: question
          type: str
"#;

    #[test]
    fn test_parse_tools_config() {
        let config = ToolsConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.name, "research-server");
        assert_eq!(config.tools.len(), 3);

        let researcher = config.tool("researcher").unwrap();
        assert_eq!(researcher.adapter, AdapterKind::Crewai);
        assert_eq!(researcher.settings(), AdapterKind::Crewai.default_settings());

        let search = config.tool("search").unwrap();
        assert_eq!(search.settings().candidates(), vec!["results".to_string()]);
        assert_eq!(search.input_schema.fields[1].ty, FieldType::Int);
    }

    #[test]
    fn test_overrides_keep_unset_preset_values() {
        let config = ToolsConfig::from_yaml(YAML).unwrap();
        let helper = config.tool("helper").unwrap().settings();
        let preset = AdapterKind::McpAgent.default_settings();
        assert_eq!(helper.failure_policy, FailurePolicy::Propagate);
        assert_eq!(helper.arg_style, ArgStyle::Field("question".into()));
        assert_eq!(helper.isolation, preset.isolation);
        assert_eq!(helper.methods, preset.methods);
    }

    #[test]
    fn test_duplicate_tool_names_rejected() {
        let yaml = r#"
tools:
  - name: twice
    adapter: function
    input_schema: { title: A, fields: [] }
  - name: twice
    adapter: function
    input_schema: { title: B, fields: [] }
"#;
        let err = ToolsConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("twice")));
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let yaml = r#"
tools:
  - name: broken
    adapter: function
    input_schema:
      title: Broken
      fields:
        - { name: q, type: str }
        - { name: q, type: int }
"#;
        assert!(matches!(
            ToolsConfig::from_yaml(yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_arg_style_is_yaml_error() {
        let yaml = r#"
tools:
  - name: t
    adapter: function
    arg_style: splat
    input_schema: { title: T, fields: [] }
"#;
        assert!(matches!(ToolsConfig::from_yaml(yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();
        let config = ToolsConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.tools.len(), 3);

        let missing = ToolsConfig::from_yaml_file("/definitely/not/here.yaml");
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_candidates_prefers_explicit_method() {
        let settings = AdapterSettings::new()
            .with_methods(["run", "arun"])
            .with_method("invoke");
        assert_eq!(settings.candidates(), vec!["invoke".to_string()]);
        assert_eq!(
            AdapterSettings::new().with_methods(["run", "arun"]).candidates(),
            vec!["run".to_string(), "arun".to_string()]
        );
    }
}
