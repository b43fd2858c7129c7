//! Discovery of installed theme bundles.
//!
//! A theme bundle is a directory under the configured root whose name contains
//! the [`BUNDLE_MARKER`] (`.theme`). [`ThemeRegistry::initialize`] scans the
//! root once and records every bundle it finds; afterwards the registry is
//! read-only and can be shared freely (wrap it in an `Arc` for threads).
//!
//! ```text
//! public/themes/
//! ├── admin.theme/
//! ├── default.theme/
//! └── notes.txt        (ignored)
//! ```
//!
//! Bundles are looked up either by directory name (`"admin.theme"`) or by bare
//! theme name (`"admin"`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::ThemeConfig;
use crate::error::{Result, ThemeError};
use crate::theme::Theme;

/// Substring identifying a theme bundle directory.
pub const BUNDLE_MARKER: &str = ".theme";

/// Returns the bundle directory name for a theme name.
///
/// Names that already carry the marker are returned unchanged.
///
/// ```rust
/// use livery::bundle_name;
///
/// assert_eq!(bundle_name("admin"), "admin.theme");
/// assert_eq!(bundle_name("admin.theme"), "admin.theme");
/// ```
pub fn bundle_name(name: &str) -> String {
    if name.contains(BUNDLE_MARKER) {
        name.to_string()
    } else {
        format!("{}{}", name, BUNDLE_MARKER)
    }
}

/// Upper-cases the first character of a bundle name.
pub fn display_name(dir_name: &str) -> String {
    let mut chars = dir_name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A discovered theme bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeBundle {
    dir_name: String,
    display_name: String,
}

impl ThemeBundle {
    fn new(dir_name: impl Into<String>) -> Self {
        let dir_name = dir_name.into();
        let display_name = display_name(&dir_name);
        Self {
            dir_name,
            display_name,
        }
    }

    /// Directory name, e.g. `admin.theme`.
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    /// Display name, e.g. `Admin.theme`.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Catalog of theme bundles found under the configured root.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    root: PathBuf,
    config: Arc<ThemeConfig>,
    themes: Vec<ThemeBundle>,
}

impl ThemeRegistry {
    /// Scans the configured root and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::RootNotFound`] if the root is not a directory, and
    /// [`ThemeError::Io`] if it cannot be listed.
    pub fn initialize(config: ThemeConfig) -> Result<Self> {
        let root = config.root();
        if !root.is_dir() {
            return Err(ThemeError::RootNotFound { path: root });
        }

        let themes = scan_bundles(&root)?;
        tracing::debug!(root = %root.display(), count = themes.len(), "theme registry initialized");

        Ok(Self {
            root,
            config: Arc::new(config),
            themes,
        })
    }

    /// Returns true if a bundle with this name (bare or suffixed) exists.
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Finds a bundle by bare or suffixed name.
    pub fn get(&self, name: &str) -> Option<&ThemeBundle> {
        let wanted = bundle_name(name);
        self.themes
            .iter()
            .find(|bundle| bundle.dir_name == name || bundle.dir_name == wanted)
    }

    /// Bundles in discovery order.
    pub fn themes(&self) -> impl Iterator<Item = &ThemeBundle> {
        self.themes.iter()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// The scanned bundles root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration the registry was initialized with.
    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    /// Builds a theme instance with the static configuration.
    pub fn instance(&self, name: &str) -> Result<Theme> {
        Theme::instance(self, name, &Value::Null)
    }

    /// Builds a theme instance with configuration overrides.
    pub fn instance_with(&self, name: &str, overrides: &Value) -> Result<Theme> {
        Theme::instance(self, name, overrides)
    }
}

fn scan_bundles(root: &Path) -> Result<Vec<ThemeBundle>> {
    let io_error = |source| ThemeError::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut themes = Vec::new();
    for entry in std::fs::read_dir(root).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            tracing::warn!(entry = ?file_name, "skipping non UTF-8 entry in theme root");
            continue;
        };
        if name.contains(BUNDLE_MARKER) {
            themes.push(ThemeBundle::new(name));
        }
    }
    Ok(themes)
}
