//! Views: named template files resolved under a search root.
//!
//! A [`View`] is built from a name, the data it will be rendered with, and the
//! directory to search. Construction fails with
//! [`ViewError::InvalidArgument`] when no matching file exists, which is the
//! signal [`Theme::view`](crate::Theme::view) uses to try the fallback theme.
//!
//! # Name Resolution
//!
//! Names are relative paths, with or without extension. An exact file match
//! wins; otherwise recognized extensions are tried in priority order:
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.jinja` |
//! | 2 | `.jinja2` |
//! | 3 | `.j2` |
//! | 4 | `.html` |
//! | 5 (lowest) | `.txt` |
//!
//! So `"header"` resolves to `layouts/header.jinja` before
//! `layouts/header.html`. Names that are absolute or walk out of the root
//! (`../secrets`) are rejected.
//!
//! # Rendering
//!
//! Views render through MiniJinja. `{% include %}` and `{% extends %}` resolve
//! against the view's search root:
//!
//! ```rust,ignore
//! let view = View::new("page", json!({ "title": "Home" }), "themes/site.theme/layouts")?;
//! let html = view.render()?;
//! ```

use std::path::{Component, Path, PathBuf};

use minijinja::Environment;
use serde::Serialize;
use serde_json::Value;

use crate::error::ViewError;

/// Recognized view file extensions in priority order.
pub const VIEW_EXTENSIONS: &[&str] = &[".jinja", ".jinja2", ".j2", ".html", ".txt"];

/// A resolved view file plus the data it renders with.
#[derive(Debug, Clone)]
pub struct View {
    name: String,
    root: PathBuf,
    path: PathBuf,
    source: String,
    data: Value,
}

impl View {
    /// Resolves `name` under `root` and reads the file.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidArgument`] when the name is not a safe relative
    /// path or no matching file exists; [`ViewError::Io`] when the file cannot
    /// be read.
    pub fn new(name: &str, data: Value, root: impl Into<PathBuf>) -> Result<Self, ViewError> {
        let root = root.into();
        let invalid = || ViewError::InvalidArgument {
            name: name.to_string(),
            root: root.clone(),
        };

        if !is_safe_name(name) {
            return Err(invalid());
        }

        let path = resolve_view_path(&root, name).ok_or_else(invalid)?;
        let source = std::fs::read_to_string(&path).map_err(|source| ViewError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            name: name.to_string(),
            root,
            path,
            source,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directory the view was resolved in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The resolved view file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Renders the view with its own data.
    pub fn render(&self) -> Result<String, ViewError> {
        self.render_with(&self.data)
    }

    /// Renders the view with other data.
    ///
    /// Cached templates are built without data, so this is how they get
    /// rendered per request.
    pub fn render_with<S: Serialize>(&self, data: &S) -> Result<String, ViewError> {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(&self.root));
        Ok(env.render_str(&self.source, minijinja::Value::from_serialize(data))?)
    }
}

/// Finds the file `name` refers to under `root`, if any.
pub fn resolve_view_path(root: &Path, name: &str) -> Option<PathBuf> {
    let exact = root.join(name);
    if exact.is_file() {
        return Some(exact);
    }

    VIEW_EXTENSIONS
        .iter()
        .map(|ext| root.join(format!("{}{}", name, ext)))
        .find(|candidate| candidate.is_file())
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
