//! Dotted-path access into configuration and metadata trees.
//!
//! Both the theme configuration and theme descriptors are plain
//! [`serde_json::Value`] trees. Keys are addressed with dot notation:
//! `"info.file"` descends into the `info` mapping and reads `file`. Array
//! elements can be addressed by index (`"assets.js.0"`).
//!
//! Lookups never fail: a missing segment, or an attempt to descend into a
//! scalar, simply yields `None` (or the caller's default).

use serde_json::{Map, Value};

/// Looks up a dotted path in a value tree.
///
/// An empty key returns the tree itself.
///
/// # Example
///
/// ```rust
/// use livery::value::lookup;
/// use serde_json::json;
///
/// let tree = json!({ "info": { "file": "theme.json" } });
/// assert_eq!(lookup(&tree, "info.file"), Some(&json!("theme.json")));
/// assert_eq!(lookup(&tree, "info.missing"), None);
/// assert_eq!(lookup(&tree, "info.file.deeper"), None);
/// ```
pub fn lookup<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return Some(tree);
    }

    let mut current = tree;
    for segment in key.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Looks up a dotted path, returning a clone of the value or `default`.
pub fn get_or(tree: &Value, key: &str, default: Value) -> Value {
    lookup(tree, key).cloned().unwrap_or(default)
}

/// Deep-merges `overlay` into `base`.
///
/// Objects are merged key by key; on conflicts the overlay wins. A non-object
/// overlay replaces the base value outright.
pub fn merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Returns an empty object value.
pub fn empty() -> Value {
    Value::Object(Map::new())
}

/// Reads a sequence of strings at `key`, skipping non-string members.
pub(crate) fn string_list(tree: &Value, key: &str) -> Vec<String> {
    match lookup(tree, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}
