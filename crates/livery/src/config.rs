//! Theme configuration.
//!
//! [`ThemeConfig`] holds the `theme` namespace of the host application's
//! configuration as a value tree. Defaults are applied first and anything the
//! host provides is deep-merged on top, so partial configuration files work:
//!
//! ```yaml
//! root: public/themes
//! theme: admin
//! fallback: default
//! info:
//!   format: yaml
//!   file: theme.yaml
//! ```
//!
//! # Recognized Keys
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `docroot` | `public` | Public document root of the application |
//! | `root` | `<docroot>/themes` | Directory holding theme bundles |
//! | `default` | `default` | Theme used by [`Theme::default_instance`](crate::Theme::default_instance) |
//! | `theme` | `""` | Configured active theme |
//! | `fallback` | `false` | Fallback theme name, or `false` to disable |
//! | `info.enabled` | `true` | Whether descriptor files are read |
//! | `info.file` | `theme.json` | Descriptor file name inside a bundle |
//! | `info.format` | `json` | Descriptor parser (`json`, `yaml`) |
//!
//! Unknown keys are kept and remain reachable through [`ThemeConfig::get`].

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::error::{Result, ThemeError};
use crate::value;

/// Default descriptor file name.
pub const DEFAULT_INFO_FILE: &str = "theme.json";

/// Default descriptor format identifier.
pub const DEFAULT_INFO_FORMAT: &str = "json";

/// Configuration for theme discovery and construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeConfig {
    values: Value,
}

fn defaults() -> Value {
    json!({
        "docroot": "public",
        "default": "default",
        "theme": "",
        "fallback": false,
        "info": {
            "enabled": true,
            "file": DEFAULT_INFO_FILE,
            "format": DEFAULT_INFO_FORMAT,
        },
    })
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeConfig {
    /// Creates a configuration holding only the defaults.
    pub fn new() -> Self {
        Self { values: defaults() }
    }

    /// Creates a configuration from a value tree merged over the defaults.
    ///
    /// Fails if `values` is neither an object nor null.
    pub fn from_value(values: Value) -> Result<Self> {
        match values {
            Value::Null => Ok(Self::new()),
            Value::Object(_) => Ok(Self::new().with_overrides(&values)),
            other => Err(ThemeError::Config(format!(
                "theme configuration must be a mapping, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Parses YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let values: Value =
            serde_yaml::from_str(yaml).map_err(|e| ThemeError::Config(e.to_string()))?;
        Self::from_value(values)
    }

    /// Parses JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let values: Value =
            serde_json::from_str(json).map_err(|e| ThemeError::Config(e.to_string()))?;
        Self::from_value(values)
    }

    /// Loads configuration from a file, choosing the parser by extension.
    ///
    /// `.yaml` and `.yml` files are parsed as YAML, `.json` as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ThemeError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(ThemeError::Config(format!(
                "unsupported configuration file {} (expected .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Returns a copy with `overrides` deep-merged on top.
    pub fn with_overrides(&self, overrides: &Value) -> Self {
        let mut values = self.values.clone();
        if !overrides.is_null() {
            value::merge(&mut values, overrides);
        }
        Self { values }
    }

    /// Returns a copy with a single dotted key set.
    pub fn set(&self, key: &str, new_value: impl Into<Value>) -> Self {
        let mut nested = new_value.into();
        for segment in key.rsplit('.') {
            let mut map = serde_json::Map::new();
            map.insert(segment.to_string(), nested);
            nested = Value::Object(map);
        }
        self.with_overrides(&nested)
    }

    /// Dotted-path lookup returning `default` when any segment is missing.
    pub fn get(&self, key: &str, default: Value) -> Value {
        value::get_or(&self.values, key, default)
    }

    /// Dotted-path lookup for string values.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        value::lookup(&self.values, key).and_then(Value::as_str)
    }

    /// The raw value tree.
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// The application's public document root.
    pub fn docroot(&self) -> PathBuf {
        PathBuf::from(self.get_str("docroot").unwrap_or("public"))
    }

    /// Directory holding theme bundles.
    pub fn root(&self) -> PathBuf {
        match self.get_str("root") {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => self.docroot().join("themes"),
        }
    }

    /// Theme name used when no name is given.
    pub fn default_theme(&self) -> &str {
        self.get_str("default").unwrap_or("default")
    }

    /// The configured active theme name (empty when unset).
    pub fn active_theme(&self) -> &str {
        self.get_str("theme").unwrap_or("")
    }

    /// The configured fallback theme name, if fallback is enabled.
    pub fn fallback_theme(&self) -> Option<&str> {
        self.get_str("fallback").filter(|name| !name.is_empty())
    }

    /// Whether descriptor files are read.
    pub fn info_enabled(&self) -> bool {
        value::lookup(&self.values, "info.enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Descriptor file name inside a bundle.
    pub fn info_file(&self) -> &str {
        self.get_str("info.file").unwrap_or(DEFAULT_INFO_FILE)
    }

    /// Descriptor format identifier.
    pub fn info_format(&self) -> &str {
        self.get_str("info.format").unwrap_or(DEFAULT_INFO_FORMAT)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
