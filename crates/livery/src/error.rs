//! Error types for theme resolution.
//!
//! [`ThemeError`] covers every failure the engine surfaces to callers. Each
//! not-found condition gets its own variant so callers can match on the kind
//! instead of parsing messages. [`ViewError`] is the narrower error returned
//! by [`View`](crate::View) construction and rendering.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building or rendering a [`View`](crate::View).
#[derive(Debug, Error)]
pub enum ViewError {
    /// The named view does not exist under the search root, or the name
    /// escapes it.
    #[error("view \"{name}\" is not a valid view under {}", .root.display())]
    InvalidArgument { name: String, root: PathBuf },

    /// The view file exists but could not be read.
    #[error("failed to read view {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template engine failure while rendering.
    #[error("render error: {0}")]
    Render(String),
}

impl ViewError {
    /// Returns true when the error means "no such view".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ViewError::InvalidArgument { .. })
    }
}

impl From<minijinja::Error> for ViewError {
    fn from(err: minijinja::Error) -> Self {
        ViewError::Render(err.to_string())
    }
}

/// Errors produced by the theme registry, metadata loader and theme instances.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The configured bundles root does not exist.
    #[error("root folder [{}] does not exist", .path.display())]
    RootNotFound { path: PathBuf },

    /// The requested theme is not in the registry.
    #[error("the requested theme [{name}] does not exist within {}", .root.display())]
    ThemeNotFound { name: String, root: PathBuf },

    /// Neither the theme nor its fallback contains the view.
    #[error("view [{name}] does not exist within the current theme or fallback theme")]
    ViewNotFound {
        name: String,
        searched: Vec<PathBuf>,
        #[source]
        source: Option<ViewError>,
    },

    /// The active theme does not contain the template.
    #[error("template [{name}] does not exist within the current theme")]
    TemplateNotFound {
        name: String,
        path: PathBuf,
        #[source]
        source: Option<ViewError>,
    },

    /// A descriptor file exists but could not be read or parsed.
    #[error("invalid theme descriptor {}: {message}", .path.display())]
    Metadata { path: PathBuf, message: String },

    /// The theme configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failure while scanning the bundles root.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for theme operations.
pub type Result<T> = std::result::Result<T, ThemeError>;
