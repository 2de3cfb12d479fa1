//! Small helpers shared by converters and meta-schemas.

use serde_json::Value;

/// Escape a key for use as a JSON-Pointer segment (`~` → `~0`, `/` → `~1`).
pub fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Reverse of [`escape_pointer`].
pub fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Merge `overlay` into `base`.
///
/// Objects are merged key by key, recursively; any other overlay value
/// replaces the base value. A `null` in the overlay removes the key.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            for (key, value) in overlay {
                if value.is_null() {
                    merged.remove(key);
                    continue;
                }
                let next = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_merge() {
        let a = json!({"a": 1, "b": {"x": 10, "y": 20}, "c": 3});
        let b = json!({"b": {"x": 15, "z": 30}, "d": 4});
        assert_eq!(
            deep_merge(&a, &b),
            json!({"a": 1, "b": {"x": 15, "y": 20, "z": 30}, "c": 3, "d": 4})
        );
    }

    #[test]
    fn test_deep_merge_replaces_non_objects() {
        let a = json!({"enum": ["a"], "k": {"n": 1}});
        let b = json!({"enum": ["b", "c"], "k": 5});
        assert_eq!(deep_merge(&a, &b), json!({"enum": ["b", "c"], "k": 5}));
    }

    #[test]
    fn test_deep_merge_null_removes() {
        let a = json!({"scope": {"type": "string", "enum": ["#"]}});
        let b = json!({"scope": {"enum": null}});
        assert_eq!(deep_merge(&a, &b), json!({"scope": {"type": "string"}}));
    }

    #[test]
    fn test_pointer_escaping() {
        assert_eq!(escape_pointer("a/b~c"), "a~1b~0c");
        assert_eq!(unescape_pointer("a~1b~0c"), "a/b~c");
        assert_eq!(unescape_pointer(&escape_pointer("~1")), "~1");
    }
}
