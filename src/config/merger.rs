//! Deep merge and dotted-path helpers for configuration values.
//!
//! # Merge Rules
//!
//! - Objects are merged recursively
//! - Arrays are replaced entirely (not concatenated)
//! - Scalars in overlay replace scalars in base

use serde_json::{Map, Value};

/// Deep merge two JSON values; `overlay` wins at every conflicting leaf.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                let merged = match base_map.get(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                result.insert(key.clone(), merged);
            }

            Value::Object(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// Value at a dotted path such as `cms.schemaPath`.
pub fn get_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Set `new_value` at a dotted path, creating intermediate objects.
///
/// A non-object found on the way is replaced by an object.
pub fn set_path(target: &mut Value, path: &str, new_value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = target;

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };

        if segments.peek().is_none() {
            map.insert(segment.to_string(), new_value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_merge_recursively() {
        let base = json!({"cms": {"schemaPath": "./a", "out": "./dist"}});
        let overlay = json!({"cms": {"schemaPath": "./b"}});
        assert_eq!(
            deep_merge(&base, &overlay),
            json!({"cms": {"schemaPath": "./b", "out": "./dist"}})
        );
    }

    #[test]
    fn arrays_are_replaced() {
        let base = json!({"components": ["button", "teaser"]});
        let overlay = json!({"components": ["hero"]});
        assert_eq!(
            deep_merge(&base, &overlay),
            json!({"components": ["hero"]})
        );
    }

    #[test]
    fn scalar_overlay_replaces_object() {
        let base = json!({"a": {"b": 1}});
        let overlay = json!({"a": "flat"});
        assert_eq!(deep_merge(&base, &overlay), json!({"a": "flat"}));
    }

    #[test]
    fn keys_only_in_base_survive() {
        let base = json!({"x": 1});
        let overlay = json!({"y": 2});
        assert_eq!(deep_merge(&base, &overlay), json!({"x": 1, "y": 2}));
    }

    #[test]
    fn get_path_walks_objects() {
        let value = json!({"a": {"b": {"c": 3}}});
        assert_eq!(get_path(&value, "a.b.c"), Some(&json!(3)));
        assert_eq!(get_path(&value, "a.x"), None);
        assert_eq!(get_path(&value, "a.b.c.d"), None);
    }

    #[test]
    fn set_path_creates_nesting() {
        let mut value = json!({});
        set_path(&mut value, "a.b.c", json!("v"));
        assert_eq!(value, json!({"a": {"b": {"c": "v"}}}));
    }

    #[test]
    fn set_path_replaces_scalars_on_the_way() {
        let mut value = json!({"a": 1});
        set_path(&mut value, "a.b", json!(true));
        assert_eq!(value, json!({"a": {"b": true}}));
    }
}
