//! Theme descriptor loading.
//!
//! A bundle may carry a descriptor file (default `theme.json`) declaring extra
//! assets and arbitrary theme data:
//!
//! ```json
//! {
//!   "title": "Admin",
//!   "assets": {
//!     "js": ["app.js", "vendor.js"],
//!     "css": ["admin.css"]
//!   }
//! }
//! ```
//!
//! The descriptor is optional. When descriptors are disabled in the
//! configuration, or the file is absent, the theme gets empty metadata and
//! every lookup returns its default.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ThemeConfig;
use crate::error::{Result, ThemeError};
use crate::value;

/// Structured-data parser used for descriptor files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Json,
    Yaml,
}

impl DescriptorFormat {
    /// Resolves a format identifier (`json`, `yaml`, `yml`), case-insensitively.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "json" => Some(DescriptorFormat::Json),
            "yaml" | "yml" => Some(DescriptorFormat::Yaml),
            _ => None,
        }
    }

    /// Parses raw descriptor content into a value tree.
    pub fn parse(&self, raw: &str) -> std::result::Result<Value, String> {
        match self {
            DescriptorFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
            DescriptorFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
        }
    }
}

/// Parsed descriptor values for one theme.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeMetadata {
    values: Value,
    source: Option<PathBuf>,
}

impl Default for ThemeMetadata {
    fn default() -> Self {
        Self::empty()
    }
}

impl ThemeMetadata {
    /// Metadata with no values.
    pub fn empty() -> Self {
        Self {
            values: value::empty(),
            source: None,
        }
    }

    /// Wraps an already parsed value tree.
    pub fn from_value(values: Value) -> Self {
        Self {
            values,
            source: None,
        }
    }

    /// Loads the descriptor of the theme at `theme_path`.
    ///
    /// # Errors
    ///
    /// A missing descriptor is not an error. [`ThemeError::Metadata`] is
    /// returned when the descriptor exists but cannot be read, the configured
    /// format is unknown, the content does not parse, or its top level is not
    /// a mapping.
    pub fn load(theme_path: &Path, config: &ThemeConfig) -> Result<Self> {
        if !config.info_enabled() {
            return Ok(Self::empty());
        }

        let path = theme_path.join(config.info_file());
        if !path.is_file() {
            tracing::trace!(path = %path.display(), "no theme descriptor");
            return Ok(Self::empty());
        }

        let metadata_error = |message: String| ThemeError::Metadata {
            path: path.clone(),
            message,
        };

        let format = DescriptorFormat::from_id(config.info_format()).ok_or_else(|| {
            metadata_error(format!("unknown descriptor format \"{}\"", config.info_format()))
        })?;
        let raw = std::fs::read_to_string(&path).map_err(|e| metadata_error(e.to_string()))?;

        let values = match format.parse(&raw).map_err(metadata_error)? {
            Value::Null => value::empty(),
            values @ Value::Object(_) => values,
            _ => return Err(metadata_error("descriptor must be a mapping".to_string())),
        };

        tracing::debug!(path = %path.display(), "loaded theme descriptor");
        Ok(Self {
            values,
            source: Some(path),
        })
    }

    /// Dotted-path lookup returning `default` when any segment is missing.
    pub fn get(&self, key: &str, default: Value) -> Value {
        value::get_or(&self.values, key, default)
    }

    /// Reads a list of strings; a single string is treated as a one-item list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        value::string_list(&self.values, key)
    }

    pub fn values(&self) -> &Value {
        &self.values
    }

    /// The descriptor file these values came from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.values.as_object().map_or(true, |map| map.is_empty())
    }
}
