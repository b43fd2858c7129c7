//! Ordered, duplicate-free asset reference lists.
//!
//! Each theme owns two [`AssetCollection`]s, one for scripts and one for
//! stylesheets. References keep the order in which they were first added and
//! repeated references are ignored, so merging the same descriptor twice is
//! harmless.
//!
//! ```rust
//! use livery::AssetCollection;
//!
//! let mut js = AssetCollection::new("themes/admin.theme/assets");
//! js.add(["app.js", "vendor.js", "app.js"]);
//! assert_eq!(js.items(), ["app.js", "vendor.js"]);
//! assert_eq!(js.urls()[0], "themes/admin.theme/assets/app.js");
//! ```

use serde::Serialize;

/// An ordered set of asset references sharing a base URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetCollection {
    base_uri: String,
    items: Vec<String>,
}

impl AssetCollection {
    /// Creates an empty collection rooted at `base_uri`.
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            items: Vec::new(),
        }
    }

    /// Appends each reference not already present.
    pub fn add<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            let item = item.into();
            if !self.contains(&item) {
                self.items.push(item);
            }
        }
    }

    /// Adds every reference from `other`. The base URI is left unchanged.
    pub fn merge(&mut self, other: &AssetCollection) {
        self.add(other.items.iter().cloned());
    }

    /// Returns true if the reference is already in the collection.
    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|existing| existing == item)
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Public links for every reference.
    ///
    /// Relative references are joined onto the base URI. References that are
    /// already absolute (a scheme, protocol-relative, or rooted path) are
    /// returned as-is.
    pub fn urls(&self) -> Vec<String> {
        self.items.iter().map(|item| self.url_for(item)).collect()
    }

    fn url_for(&self, item: &str) -> String {
        if is_absolute_reference(item) || self.base_uri.is_empty() {
            return item.to_string();
        }
        format!(
            "{}/{}",
            self.base_uri.trim_end_matches('/'),
            item.trim_start_matches("./")
        )
    }
}

impl<'a> IntoIterator for &'a AssetCollection {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn is_absolute_reference(item: &str) -> bool {
    item.starts_with('/') || item.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let assets = AssetCollection::new("x/assets");
        assert!(assets.is_empty());
        assert_eq!(assets.len(), 0);
        assert_eq!(assets.base_uri(), "x/assets");
    }

    #[test]
    fn test_add_preserves_first_seen_order() {
        let mut assets = AssetCollection::new("");
        assets.add(["b.css", "a.css"]);
        assets.add(["a.css", "c.css", "b.css"]);
        assert_eq!(assets.items(), ["b.css", "a.css", "c.css"]);
    }

    #[test]
    fn test_add_same_reference_twice() {
        let mut assets = AssetCollection::new("");
        assets.add(["app.js"]);
        assets.add(["app.js"]);
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn test_merge_keeps_base_uri() {
        let mut primary = AssetCollection::new("themes/admin.theme/assets");
        primary.add(["app.js"]);

        let mut other = AssetCollection::new("themes/default.theme/assets");
        other.add(["vendor.js", "app.js"]);

        primary.merge(&other);
        assert_eq!(primary.base_uri(), "themes/admin.theme/assets");
        assert_eq!(primary.items(), ["app.js", "vendor.js"]);
    }

    #[test]
    fn test_urls() {
        let mut assets = AssetCollection::new("themes/admin.theme/assets/");
        assets.add([
            "js/app.js",
            "./local.js",
            "https://cdn.example.com/lib.js",
            "//cdn.example.com/proto.js",
            "/static/root.js",
        ]);
        assert_eq!(
            assets.urls(),
            vec![
                "themes/admin.theme/assets/js/app.js",
                "themes/admin.theme/assets/local.js",
                "https://cdn.example.com/lib.js",
                "//cdn.example.com/proto.js",
                "/static/root.js",
            ]
        );
    }

    #[test]
    fn test_iterates_by_reference() {
        let mut assets = AssetCollection::new("");
        assets.add(["a", "b"]);
        let collected: Vec<&String> = (&assets).into_iter().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(assets.iter().count(), 2);
    }
}
