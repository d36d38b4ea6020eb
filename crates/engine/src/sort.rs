// Deterministic key ordering for diff-stable JSON output

use serde_json::{Map, Value};

/// Return a copy of `node` whose mapping keys are in ascending lexical order.
///
/// With `recursive`, every mapping at every depth is reordered (including
/// mappings nested inside sequences); otherwise only the top-level mapping.
/// Sequence element order is never touched.
pub fn sort_keys_recursive(node: &Value, recursive: bool) -> Value {
    match node {
        Value::Object(map) => Value::Object(sort_map(map, recursive)),
        Value::Array(items) if recursive => {
            Value::Array(items.iter().map(|v| sort_keys_recursive(v, true)).collect())
        }
        other => other.clone(),
    }
}

/// `sort_keys_recursive` for a bare mapping (e.g. a whole document).
pub fn sort_map(map: &Map<String, Value>, recursive: bool) -> Map<String, Value> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    entries
        .into_iter()
        .map(|(k, v)| {
            let v = if recursive { sort_keys_recursive(v, true) } else { v.clone() };
            (k.clone(), v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn keys(v: &Value) -> Vec<String> {
        v.as_object().unwrap().keys().cloned().collect()
    }

    /// Key order at every depth. `Value` equality ignores map order, so
    /// ordering assertions must compare this instead.
    fn key_paths(v: &Value, prefix: &str, out: &mut Vec<String>) {
        match v {
            Value::Object(map) => {
                for (k, child) in map {
                    let path = format!("{prefix}/{k}");
                    out.push(path.clone());
                    key_paths(child, &path, out);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    key_paths(child, &format!("{prefix}[{i}]"), out);
                }
            }
            _ => {}
        }
    }

    fn ordered(v: &Value) -> Vec<String> {
        let mut out = Vec::new();
        key_paths(v, "", &mut out);
        out
    }

    #[test]
    fn test_sorts_top_level() {
        let doc = json!({"tables": [], "constants": [], "formulas": []});
        let sorted = sort_keys_recursive(&doc, false);
        assert_eq!(keys(&sorted), vec!["constants", "formulas", "tables"]);
    }

    #[test]
    fn test_non_recursive_leaves_nested_order() {
        let doc = json!({"b": {"z": 1, "a": 2}, "a": 0});
        let sorted = sort_keys_recursive(&doc, false);
        assert_eq!(keys(&sorted), vec!["a", "b"]);
        assert_eq!(keys(&sorted["b"]), vec!["z", "a"]);
    }

    #[test]
    fn test_recursive_sorts_inside_sequences_but_keeps_element_order() {
        let doc = json!({
            "tables": [
                {"name": "Zeta", "table": [{"y": 1, "x": 2}]},
                {"name": "Alpha", "b": true, "a": false}
            ]
        });
        let sorted = sort_keys_recursive(&doc, true);
        let tables = sorted["tables"].as_array().unwrap();
        assert_eq!(tables[0]["name"], "Zeta");
        assert_eq!(tables[1]["name"], "Alpha");
        assert_eq!(keys(&tables[0]), vec!["name", "table"]);
        assert_eq!(keys(&tables[0]["table"][0]), vec!["x", "y"]);
        assert_eq!(keys(&tables[1]), vec!["a", "b", "name"]);
    }

    #[test]
    fn test_does_not_mutate_input() {
        let doc = json!({"b": 1, "a": 2});
        let _ = sort_keys_recursive(&doc, true);
        assert_eq!(keys(&doc), vec!["b", "a"]);
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(sort_keys_recursive(&json!(3), true), json!(3));
        assert_eq!(sort_keys_recursive(&json!([3, 1, 2]), true), json!([3, 1, 2]));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::vec(("[a-e]{1,3}", inner), 0..6)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn sort_is_idempotent(doc in arb_json(), recursive in any::<bool>()) {
            let once = sort_keys_recursive(&doc, recursive);
            let twice = sort_keys_recursive(&once, recursive);
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(ordered(&once), ordered(&twice));
        }

        #[test]
        fn sort_preserves_content(doc in arb_json(), recursive in any::<bool>()) {
            let sorted = sort_keys_recursive(&doc, recursive);
            // Map equality is order-insensitive: same content, only order may differ
            prop_assert_eq!(&sorted, &doc);
        }

        #[test]
        fn recursive_sort_orders_every_mapping(doc in arb_json()) {
            let sorted = sort_keys_recursive(&doc, true);
            let mut stack = vec![&sorted];
            while let Some(v) = stack.pop() {
                match v {
                    Value::Object(map) => {
                        let ks: Vec<&String> = map.keys().collect();
                        prop_assert!(ks.windows(2).all(|w| w[0] < w[1]));
                        stack.extend(map.values());
                    }
                    Value::Array(items) => stack.extend(items.iter()),
                    _ => {}
                }
            }
        }
    }
}
