//! # Livery - Theme Bundles for Template-Driven Applications
//!
//! `livery` turns a theme name into a ready-to-use [`Theme`]: a bundle
//! directory with layouts, templates, assets and an optional descriptor file,
//! backed by a fallback theme for layouts the active theme does not provide.
//!
//! ## Core Concepts
//!
//! - [`ThemeConfig`]: The `theme` configuration namespace (root, active and
//!   fallback names, descriptor settings)
//! - [`ThemeRegistry`]: Bundles discovered under the root, built once at startup
//! - [`Theme`]: A resolved bundle with assets, metadata and a fallback
//! - [`AssetCollection`]: Ordered, duplicate-free script or style references
//! - [`ThemeMetadata`]: Descriptor values with dotted-path lookups
//! - [`View`]: A resolved layout or template file, rendered with MiniJinja
//!
//! ## Bundle Layout
//!
//! ```text
//! public/themes/
//! ├── default.theme/
//! │   ├── layouts/header.jinja
//! │   ├── templates/template.jinja
//! │   ├── assets/
//! │   └── theme.json
//! └── admin.theme/
//!     ├── layouts/
//!     └── theme.json
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use livery::{ThemeConfig, ThemeRegistry};
//! use serde_json::json;
//!
//! let config = ThemeConfig::from_yaml(r#"
//! root: public/themes
//! theme: admin
//! fallback: default
//! "#).unwrap();
//!
//! let registry = ThemeRegistry::initialize(config).unwrap();
//! let admin = registry.instance("admin").unwrap();
//!
//! // Served from default.theme/layouts if admin.theme lacks it
//! let header = admin.view("header", json!({ "title": "Dashboard" })).unwrap();
//! println!("{}", header.render().unwrap());
//!
//! // Cached per name, never taken from the fallback
//! let page = admin.template("template").unwrap();
//! println!("{}", page.render_with(&json!({ "body": "..." })).unwrap());
//!
//! for url in admin.js().urls() {
//!     println!("<script src=\"{}\"></script>", url);
//! }
//! ```
//!
//! ## Errors
//!
//! Every failure is a [`ThemeError`] variant: a missing root at startup
//! ([`ThemeError::RootNotFound`]), an unknown theme
//! ([`ThemeError::ThemeNotFound`]), and missing views or templates
//! ([`ThemeError::ViewNotFound`], [`ThemeError::TemplateNotFound`]). A missing
//! descriptor file is not an error.

pub mod assets;
pub mod config;
mod error;
pub mod metadata;
pub mod registry;
pub mod theme;
pub mod value;
pub mod view;

pub use assets::AssetCollection;
pub use config::{ThemeConfig, DEFAULT_INFO_FILE, DEFAULT_INFO_FORMAT};
pub use error::{Result, ThemeError, ViewError};
pub use metadata::{DescriptorFormat, ThemeMetadata};
pub use registry::{bundle_name, display_name, ThemeBundle, ThemeRegistry, BUNDLE_MARKER};
pub use theme::{Theme, ASSETS_DIR, DEFAULT_TEMPLATE, LAYOUTS_DIR, TEMPLATES_DIR};
pub use view::{resolve_view_path, View, VIEW_EXTENSIONS};
