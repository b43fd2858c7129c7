//! Theme instances.
//!
//! A [`Theme`] is a resolved bundle: its filesystem path and public URI, its
//! script and style collections, its descriptor metadata, and at most one
//! fallback theme consulted when a layout view is missing.
//!
//! # Construction
//!
//! ```rust,ignore
//! let registry = ThemeRegistry::initialize(ThemeConfig::from_file("theme.yaml")?)?;
//! let theme = Theme::instance(&registry, "admin", &Value::Null)?;
//!
//! for url in theme.js().urls() {
//!     println!("<script src=\"{}\"></script>", url);
//! }
//! ```
//!
//! When the configuration names a fallback theme that differs from the
//! configured active theme, the fallback is built eagerly alongside the
//! requested theme. A fallback never gets a fallback of its own.
//!
//! # Views and Templates
//!
//! | Lookup | Directory | Fallback | Cached |
//! |--------|-----------|----------|--------|
//! | [`Theme::view`] | `layouts/` | yes | no |
//! | [`Theme::template`] | `templates/` | no | yes, by name |
//!
//! Templates are cached for the lifetime of the theme and never evicted.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::assets::AssetCollection;
use crate::config::ThemeConfig;
use crate::error::{Result, ThemeError};
use crate::metadata::ThemeMetadata;
use crate::registry::{bundle_name, ThemeRegistry};
use crate::value;
use crate::view::View;

/// Directory holding layout views inside a bundle.
pub const LAYOUTS_DIR: &str = "layouts";

/// Directory holding page templates inside a bundle.
pub const TEMPLATES_DIR: &str = "templates";

/// Directory holding public assets inside a bundle.
pub const ASSETS_DIR: &str = "assets";

/// Template name used by [`Theme::default_template`].
pub const DEFAULT_TEMPLATE: &str = "template";

/// A resolved theme bundle.
#[derive(Debug)]
pub struct Theme {
    name: String,
    bundle: String,
    path: PathBuf,
    uri: String,
    is_public: bool,
    is_fallback: bool,
    js: AssetCollection,
    css: AssetCollection,
    metadata: ThemeMetadata,
    settings: ThemeConfig,
    fallback: Option<Box<Theme>>,
    templates: Mutex<HashMap<String, Arc<View>>>,
}

impl Theme {
    /// Builds the named theme.
    ///
    /// `overrides` is deep-merged over the registry's configuration for this
    /// instance only; pass [`Value::Null`] for none. Overrides can change the
    /// active and fallback theme names, the docroot and descriptor settings,
    /// but not `root`: bundles always come from the directory the registry
    /// scanned, and `config("root")` reports that directory.
    ///
    /// # Errors
    ///
    /// [`ThemeError::Config`] if `overrides` sets a `root` different from the
    /// registry's.
    pub fn instance(registry: &ThemeRegistry, name: &str, overrides: &Value) -> Result<Self> {
        Self::construct(registry, name, overrides, false)
    }

    /// Builds the theme named by the `default` configuration key.
    pub fn default_instance(registry: &ThemeRegistry) -> Result<Self> {
        let name = registry.config().default_theme().to_string();
        Self::instance(registry, &name, &Value::Null)
    }

    /// Builds a theme, optionally as a fallback.
    ///
    /// Fallback themes (`is_fallback == true`) never construct a fallback of
    /// their own, which caps the chain at one level.
    ///
    /// # Errors
    ///
    /// [`ThemeError::ThemeNotFound`] if the registry does not know `name`,
    /// [`ThemeError::Config`] for a `root` override, or any error from
    /// building the fallback theme or loading the descriptor.
    pub fn construct(
        registry: &ThemeRegistry,
        name: &str,
        overrides: &Value,
        is_fallback: bool,
    ) -> Result<Self> {
        let bundle = registry
            .get(name)
            .ok_or_else(|| ThemeError::ThemeNotFound {
                name: name.to_string(),
                root: registry.root().to_path_buf(),
            })?
            .clone();

        let settings = registry.config().with_overrides(overrides);
        if value::lookup(overrides, "root").is_some() && settings.root() != registry.root() {
            return Err(ThemeError::Config(format!(
                "root cannot be overridden per instance (registry scanned {}, override asks for {})",
                registry.root().display(),
                settings.root().display()
            )));
        }
        // A docroot override must not move the derived root away from the scanned one
        let settings = settings.set("root", registry.root().to_string_lossy().into_owned());

        let fallback = if is_fallback {
            None
        } else {
            match settings.fallback_theme() {
                Some(fallback_name)
                    if bundle_name(fallback_name) != bundle_name(settings.active_theme()) =>
                {
                    tracing::debug!(theme = bundle.dir_name(), fallback = fallback_name, "building fallback theme");
                    Some(Box::new(Self::construct(
                        registry,
                        fallback_name,
                        &Value::Null,
                        true,
                    )?))
                }
                _ => None,
            }
        };

        let path = registry.root().join(bundle.dir_name());
        let (is_public, uri) = public_uri(&path, &settings.docroot());
        let assets_uri = if uri.is_empty() {
            ASSETS_DIR.to_string()
        } else {
            format!("{}/{}", uri, ASSETS_DIR)
        };

        let metadata = ThemeMetadata::load(&path, &settings)?;

        let mut js = AssetCollection::new(assets_uri.clone());
        let mut css = AssetCollection::new(assets_uri);
        js.add(metadata.string_list("assets.js"));
        css.add(metadata.string_list("assets.css"));

        tracing::debug!(
            theme = bundle.dir_name(),
            path = %path.display(),
            public = is_public,
            scripts = js.len(),
            styles = css.len(),
            "theme constructed"
        );

        Ok(Self {
            name: bundle.display_name().to_string(),
            bundle: bundle.dir_name().to_string(),
            path,
            uri,
            is_public,
            is_fallback,
            js,
            css,
            metadata,
            settings,
            fallback,
            templates: Mutex::new(HashMap::new()),
        })
    }

    /// Dotted-path configuration lookup (static configuration merged with
    /// this instance's overrides).
    pub fn config(&self, key: &str, default: Value) -> Value {
        self.settings.get(key, default)
    }

    /// Dotted-path descriptor lookup.
    pub fn info(&self, key: &str, default: Value) -> Value {
        self.metadata.get(key, default)
    }

    /// Builds a layout view, falling back to the fallback theme's layouts.
    ///
    /// # Errors
    ///
    /// [`ThemeError::ViewNotFound`] when neither theme has the view. A view
    /// that exists but cannot be read is reported the same way, with the
    /// underlying error as its source.
    pub fn view(&self, name: &str, data: Value) -> Result<View> {
        let primary = self.layouts_dir();
        let Some(fallback) = self.fallback.as_deref() else {
            return View::new(name, data, &primary)
                .map_err(|err| view_not_found(name, vec![primary.clone()], err));
        };

        match View::new(name, data.clone(), &primary) {
            Ok(view) => return Ok(view),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(view_not_found(name, vec![primary], err)),
        }

        let secondary = fallback.layouts_dir();
        match View::new(name, data, &secondary) {
            Ok(view) => {
                tracing::debug!(view = name, theme = %self.bundle, fallback = %fallback.bundle, "view served from fallback theme");
                Ok(view)
            }
            Err(err) => Err(view_not_found(name, vec![primary, secondary], err)),
        }
    }

    /// Returns the cached template view, building it on first use.
    ///
    /// Templates are looked up in this theme only; the fallback theme is
    /// never consulted. Repeated calls with the same name return the same
    /// `Arc`.
    ///
    /// # Errors
    ///
    /// [`ThemeError::TemplateNotFound`] when the template is missing or
    /// unreadable.
    pub fn template(&self, name: &str) -> Result<Arc<View>> {
        let mut cache = self
            .templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(view) = cache.get(name) {
            return Ok(Arc::clone(view));
        }

        let root = self.templates_dir();
        let view = View::new(name, value::empty(), &root).map_err(|err| {
            ThemeError::TemplateNotFound {
                name: name.to_string(),
                path: root.clone(),
                source: Some(err),
            }
        })?;

        let view = Arc::new(view);
        cache.insert(name.to_string(), Arc::clone(&view));
        Ok(view)
    }

    /// The cached `template` template.
    pub fn default_template(&self) -> Result<Arc<View>> {
        self.template(DEFAULT_TEMPLATE)
    }

    /// Returns true if a template with this name is cached.
    pub fn is_template_cached(&self, name: &str) -> bool {
        self.templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Number of cached templates.
    pub fn cached_templates(&self) -> usize {
        self.templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Display name, e.g. `Admin.theme`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bundle directory name, e.g. `admin.theme`.
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Public URI of the bundle relative to the document root.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// True if the bundle lives under the public document root.
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// True if this theme was built as another theme's fallback.
    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    pub fn js(&self) -> &AssetCollection {
        &self.js
    }

    pub fn css(&self) -> &AssetCollection {
        &self.css
    }

    pub fn metadata(&self) -> &ThemeMetadata {
        &self.metadata
    }

    pub fn fallback(&self) -> Option<&Theme> {
        self.fallback.as_deref()
    }

    /// `<path>/layouts`
    pub fn layouts_dir(&self) -> PathBuf {
        self.path.join(LAYOUTS_DIR)
    }

    /// `<path>/templates`
    pub fn templates_dir(&self) -> PathBuf {
        self.path.join(TEMPLATES_DIR)
    }
}

fn view_not_found(name: &str, searched: Vec<PathBuf>, source: crate::error::ViewError) -> ThemeError {
    ThemeError::ViewNotFound {
        name: name.to_string(),
        searched,
        source: Some(source),
    }
}

/// Works out whether `path` is under `docroot` and its public URI.
///
/// Both paths are canonicalized when they exist so symlinks and relative
/// forms compare equal; otherwise they are normalized lexically.
fn public_uri(path: &Path, docroot: &Path) -> (bool, String) {
    let (path_cmp, docroot_cmp) = match (path.canonicalize(), docroot.canonicalize()) {
        (Ok(path), Ok(docroot)) => (path, docroot),
        _ => (normalize(path), normalize(docroot)),
    };

    match path_cmp.strip_prefix(&docroot_cmp) {
        Ok(relative) => (true, join_uri(relative)),
        Err(_) => (false, join_uri(path)),
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn join_uri(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
