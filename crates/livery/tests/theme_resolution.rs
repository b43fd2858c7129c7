//! Integration tests for theme construction, fallback views and cached templates.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use livery::{Theme, ThemeConfig, ThemeError, ThemeRegistry, ViewError};
use serde_json::{json, Value};
use tempfile::TempDir;

// ============================================================================
// Test fixtures
// ============================================================================

/// A public document root with a `themes` directory of bundles.
struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("public/themes")).unwrap();
        Self { dir }
    }

    fn docroot(&self) -> PathBuf {
        self.dir.path().join("public")
    }

    fn root(&self) -> PathBuf {
        self.docroot().join("themes")
    }

    fn bundle(&self, name: &str) -> PathBuf {
        let path = self.root().join(format!("{}.theme", name));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    fn write(&self, bundle: &str, relative: &str, content: &str) {
        let path = self.bundle(bundle).join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn config(&self, extra: Value) -> ThemeConfig {
        let mut values = json!({
            "docroot": self.docroot().to_str().unwrap(),
            "root": self.root().to_str().unwrap(),
        });
        livery::value::merge(&mut values, &extra);
        ThemeConfig::from_value(values).unwrap()
    }

    fn registry(&self, extra: Value) -> ThemeRegistry {
        ThemeRegistry::initialize(self.config(extra)).unwrap()
    }
}

/// `default.theme` and `admin.theme`, admin active with default as fallback.
fn admin_with_default_fallback() -> (Site, ThemeRegistry) {
    let site = Site::new();
    site.write("default", "layouts/header.jinja", "default header: {{ title }}");
    site.write("default", "layouts/footer.jinja", "default footer");
    site.write("default", "templates/template.jinja", "default template");
    site.write("admin", "layouts/footer.jinja", "admin footer");
    site.write("admin", "templates/dashboard.jinja", "dashboard {{ user }}");

    let registry = site.registry(json!({ "theme": "admin", "fallback": "default" }));
    (site, registry)
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap()
}

// ============================================================================
// Registry membership
// ============================================================================

#[test]
fn unknown_theme_is_theme_not_found() {
    let (_site, registry) = admin_with_default_fallback();

    for name in ["missing", "missing.theme", "Admin", ""] {
        let err = registry.instance(name).unwrap_err();
        assert!(
            matches!(err, ThemeError::ThemeNotFound { .. }),
            "{:?} should not resolve",
            name
        );
    }
}

#[test]
fn known_themes_resolve() {
    let (_site, registry) = admin_with_default_fallback();

    for name in ["admin", "admin.theme", "default", "default.theme"] {
        assert!(registry.instance(name).is_ok(), "{:?} should resolve", name);
    }
}

#[test]
fn missing_root_fails_initialization() {
    let site = Site::new();
    let config = site.config(json!({ "root": site.dir.path().join("nope").to_str().unwrap() }));
    assert!(matches!(
        ThemeRegistry::initialize(config),
        Err(ThemeError::RootNotFound { .. })
    ));
}

// ============================================================================
// Instance properties
// ============================================================================

#[test]
fn instance_exposes_path_uri_and_names() {
    let (site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();

    assert_eq!(admin.name(), "Admin.theme");
    assert_eq!(admin.bundle(), "admin.theme");
    assert_eq!(admin.path(), site.root().join("admin.theme"));
    assert!(admin.is_public());
    assert_eq!(admin.uri(), "themes/admin.theme");
    assert_eq!(admin.js().base_uri(), "themes/admin.theme/assets");
    assert_eq!(admin.css().base_uri(), "themes/admin.theme/assets");
    assert!(!admin.is_fallback());
}

#[test]
fn theme_outside_docroot_is_not_public() {
    let site = Site::new();
    let private_root = site.dir.path().join("private");
    std::fs::create_dir_all(private_root.join("intranet.theme")).unwrap();

    let registry = site.registry(json!({ "root": private_root.to_str().unwrap() }));
    let theme = registry.instance("intranet").unwrap();

    assert!(!theme.is_public());
    assert!(!theme.uri().starts_with('/'));
    assert!(theme.uri().ends_with("private/intranet.theme"));
}

#[test]
fn default_instance_uses_configured_default() {
    let (_site, registry) = admin_with_default_fallback();
    let theme = Theme::default_instance(&registry).unwrap();
    assert_eq!(theme.bundle(), "default.theme");
}

// ============================================================================
// Fallback construction
// ============================================================================

#[test]
fn fallback_is_built_one_level_deep() {
    let (_site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();

    let fallback = admin.fallback().expect("admin should have a fallback");
    assert_eq!(fallback.bundle(), "default.theme");
    assert!(fallback.is_fallback());
    assert!(fallback.fallback().is_none());
}

#[test]
fn no_fallback_when_fallback_equals_active() {
    let site = Site::new();
    site.bundle("default");
    let registry = site.registry(json!({ "theme": "default", "fallback": "default" }));

    assert!(registry.instance("default").unwrap().fallback().is_none());
}

#[test]
fn no_fallback_when_disabled() {
    let site = Site::new();
    site.bundle("admin");
    site.bundle("default");
    let registry = site.registry(json!({ "theme": "admin", "fallback": false }));

    assert!(registry.instance("admin").unwrap().fallback().is_none());
}

#[test]
fn fallback_bundle_gets_its_own_fallback_when_requested_directly() {
    let (_site, registry) = admin_with_default_fallback();
    let default = registry.instance("default").unwrap();

    let fallback = default.fallback().expect("default should still get a fallback");
    assert_eq!(fallback.bundle(), "default.theme");
    assert!(fallback.is_fallback());
    assert!(fallback.fallback().is_none());
}

#[test]
fn missing_fallback_theme_propagates() {
    let site = Site::new();
    site.bundle("admin");
    let registry = site.registry(json!({ "theme": "admin", "fallback": "ghost" }));

    match registry.instance("admin") {
        Err(ThemeError::ThemeNotFound { name, .. }) => assert_eq!(name, "ghost"),
        other => panic!("expected ThemeNotFound for the fallback, got {:?}", other),
    }
}

#[test]
fn root_override_is_rejected() {
    let (site, registry) = admin_with_default_fallback();
    let elsewhere = site.docroot().join("other");

    match registry.instance_with("admin", &json!({ "root": elsewhere.to_str().unwrap() })) {
        Err(ThemeError::Config(message)) => assert!(message.contains("root")),
        other => panic!("expected Config error, got {:?}", other),
    }

    // Restating the scanned root is harmless
    let same = registry
        .instance_with("admin", &json!({ "root": site.root().to_str().unwrap() }))
        .unwrap();
    assert_eq!(same.path(), site.root().join("admin.theme"));
}

#[test]
fn docroot_override_keeps_scanned_root() {
    let site = Site::new();
    site.bundle("admin");
    let registry = ThemeRegistry::initialize(
        ThemeConfig::from_value(json!({ "docroot": site.docroot().to_str().unwrap() })).unwrap(),
    )
    .unwrap();

    let admin = registry
        .instance_with("admin", &json!({ "docroot": site.dir.path().to_str().unwrap() }))
        .unwrap();

    assert_eq!(admin.path(), site.root().join("admin.theme"));
    assert_eq!(
        admin.config("root", json!(null)),
        json!(site.root().to_str().unwrap())
    );
    assert_eq!(admin.uri(), "public/themes/admin.theme");
}

#[test]
fn overrides_apply_to_one_instance() {
    let (_site, registry) = admin_with_default_fallback();

    let plain = registry.instance("admin").unwrap();
    let overridden = registry
        .instance_with("admin", &json!({ "fallback": false, "custom": { "flag": true } }))
        .unwrap();

    assert!(plain.fallback().is_some());
    assert!(overridden.fallback().is_none());
    assert_eq!(overridden.config("custom.flag", json!(false)), json!(true));
    assert_eq!(plain.config("custom.flag", json!(false)), json!(false));
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn view_from_active_theme() {
    let (site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();

    let view = admin.view("footer", json!({})).unwrap();
    assert_eq!(view.root(), site.root().join("admin.theme/layouts"));
    assert_eq!(view.render().unwrap(), "admin footer");
}

#[test]
fn view_falls_back_to_parent_layouts() {
    let (site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();

    let view = admin.view("header", json!({ "title": "Hi" })).unwrap();
    assert_eq!(view.root(), site.root().join("default.theme/layouts"));
    assert_eq!(view.render().unwrap(), "default header: Hi");
}

#[test]
fn view_missing_everywhere() {
    let (site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();

    match admin.view("sidebar", json!({})) {
        Err(ThemeError::ViewNotFound { name, searched, .. }) => {
            assert_eq!(name, "sidebar");
            assert_eq!(
                searched,
                vec![
                    site.root().join("admin.theme/layouts"),
                    site.root().join("default.theme/layouts"),
                ]
            );
        }
        other => panic!("expected ViewNotFound, got {:?}", other),
    }
}

#[test]
fn view_missing_without_fallback() {
    let site = Site::new();
    site.bundle("solo");
    let registry = site.registry(json!({}));
    let solo = registry.instance("solo").unwrap();

    assert!(matches!(
        solo.view("header", json!({})),
        Err(ThemeError::ViewNotFound { .. })
    ));
}

#[test]
fn unreadable_view_is_not_served_from_fallback() {
    let (site, registry) = admin_with_default_fallback();
    // Present but not valid UTF-8, so reading it fails with something other than not-found
    std::fs::write(site.root().join("admin.theme/layouts/header.jinja"), [0xff, 0xfe, 0x00]).unwrap();
    let admin = registry.instance("admin").unwrap();

    match admin.view("header", json!({})) {
        Err(ThemeError::ViewNotFound {
            searched,
            source: Some(ViewError::Io { path, .. }),
            ..
        }) => {
            assert_eq!(searched, vec![site.root().join("admin.theme/layouts")]);
            assert_eq!(path, site.root().join("admin.theme/layouts/header.jinja"));
        }
        other => panic!("expected ViewNotFound caused by an I/O error, got {:?}", other),
    }
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn template_is_cached_by_name() {
    let (_site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();

    assert!(!admin.is_template_cached("dashboard"));
    let first = admin.template("dashboard").unwrap();
    let second = admin.template("dashboard").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(admin.is_template_cached("dashboard"));
    assert_eq!(admin.cached_templates(), 1);
    assert_eq!(first.render_with(&json!({ "user": "ana" })).unwrap(), "dashboard ana");
}

#[test]
fn cached_template_survives_file_removal() {
    let (site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();

    let first = admin.template("dashboard").unwrap();
    std::fs::remove_file(site.root().join("admin.theme/templates/dashboard.jinja")).unwrap();
    let second = admin.template("dashboard").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn template_does_not_consult_fallback() {
    let (_site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();

    match admin.default_template() {
        Err(ThemeError::TemplateNotFound { name, .. }) => assert_eq!(name, "template"),
        other => panic!("expected TemplateNotFound, got {:?}", other),
    }
    assert_eq!(admin.cached_templates(), 0);

    // The fallback theme itself does have it
    let fallback = admin.fallback().unwrap();
    assert!(fallback.default_template().is_ok());
}

#[test]
fn unreadable_template_reports_cause() {
    let (site, registry) = admin_with_default_fallback();
    std::fs::write(site.root().join("admin.theme/templates/broken.jinja"), [0xc3, 0x28]).unwrap();
    let admin = registry.instance("admin").unwrap();

    match admin.template("broken") {
        Err(ThemeError::TemplateNotFound {
            source: Some(ViewError::Io { .. }),
            path,
            ..
        }) => assert_eq!(path, site.root().join("admin.theme/templates")),
        other => panic!("expected TemplateNotFound caused by an I/O error, got {:?}", other),
    }
    assert!(!admin.is_template_cached("broken"));
}

#[test]
fn concurrent_template_lookups_share_one_view() {
    let (_site, registry) = admin_with_default_fallback();
    let admin = Arc::new(registry.instance("admin").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let admin = Arc::clone(&admin);
            std::thread::spawn(move || admin.template("dashboard").unwrap())
        })
        .collect();

    let views: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for view in &views[1..] {
        assert!(Arc::ptr_eq(&views[0], view));
    }
    assert_eq!(admin.cached_templates(), 1);
}

// ============================================================================
// Descriptor-driven assets
// ============================================================================

#[test]
fn descriptor_assets_fill_collections_in_order() {
    let (site, _) = admin_with_default_fallback();
    site.write(
        "admin",
        "theme.json",
        r#"{"assets":{"js":["app.js","vendor.js"]}}"#,
    );
    let registry = site.registry(json!({ "theme": "admin", "fallback": "default" }));
    let admin = registry.instance("admin").unwrap();

    assert_eq!(admin.js().items(), ["app.js", "vendor.js"]);
    assert!(admin.css().is_empty());
    assert_eq!(
        admin.js().urls(),
        vec![
            "themes/admin.theme/assets/app.js",
            "themes/admin.theme/assets/vendor.js",
        ]
    );
}

#[test]
fn descriptor_duplicates_are_dropped() {
    let site = Site::new();
    site.write(
        "site",
        "theme.json",
        r#"{"assets":{"css":["a.css","b.css","a.css"]}}"#,
    );
    let theme = site.registry(json!({})).instance("site").unwrap();
    assert_eq!(theme.css().items(), ["a.css", "b.css"]);
}

#[test]
fn info_lookups_never_fail() {
    let site = Site::new();
    site.write("site", "theme.json", r#"{"author":{"name":"Rae"}}"#);
    let theme = site.registry(json!({})).instance("site").unwrap();

    assert_eq!(theme.info("author.name", Value::Null), json!("Rae"));
    assert_eq!(theme.info("author.email", json!("none")), json!("none"));
    assert_eq!(theme.info("publisher.name", json!("none")), json!("none"));
    assert_eq!(theme.config("info.nope.deeper", json!(0)), json!(0));
}

#[test]
fn yaml_descriptor() {
    let site = Site::new();
    site.write("site", "theme.yaml", "assets:\n  js:\n    - app.js\n");
    let registry = site.registry(json!({ "info": { "file": "theme.yaml", "format": "yaml" } }));
    let theme = registry.instance("site").unwrap();
    assert_eq!(theme.js().items(), ["app.js"]);
}

#[test]
fn disabled_descriptor_leaves_collections_empty() {
    let site = Site::new();
    site.write("site", "theme.json", r#"{"assets":{"js":["app.js"]}}"#);
    let registry = site.registry(json!({ "info": { "enabled": false } }));
    let theme = registry.instance("site").unwrap();

    assert!(theme.js().is_empty());
    assert!(theme.metadata().is_empty());
}

#[test]
fn broken_descriptor_fails_construction() {
    let site = Site::new();
    site.write("site", "theme.json", "{ nope");
    let registry = site.registry(json!({}));
    assert!(matches!(
        registry.instance("site"),
        Err(ThemeError::Metadata { .. })
    ));
}

#[test]
fn relative_and_canonical_docroot_agree() {
    let (site, registry) = admin_with_default_fallback();
    let admin = registry.instance("admin").unwrap();
    assert_eq!(
        canonical(admin.path()),
        canonical(&site.root().join("admin.theme"))
    );
}
