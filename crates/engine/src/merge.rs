// Document merge primitives
//
// Both join points in the pipeline (fragment assembly, worksheet aggregation)
// use `shallow_merge`. `recursive_merge` is available to callers that want
// field-level combination but is not applied at either join point.

use serde_json::{Map, Value};

/// Copy every top-level key of `from` into `into`, replacing existing entries.
///
/// A replaced key keeps its original position; new keys are appended.
pub fn shallow_merge(into: &mut Map<String, Value>, from: Map<String, Value>) {
    for (key, value) in from {
        into.insert(key, value);
    }
}

/// Deep-merge two mappings without touching either input.
///
/// Keys present in both whose values are both mappings merge recursively;
/// in every other case `b`'s value wins.
pub fn recursive_merge(a: &Map<String, Value>, b: &Map<String, Value>) -> Map<String, Value> {
    let mut out = a.clone();
    for (key, b_value) in b {
        let merged = match (out.get(key), b_value) {
            (Some(Value::Object(a_map)), Value::Object(b_map)) => {
                Value::Object(recursive_merge(a_map, b_map))
            }
            _ => b_value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_shallow_merge_replaces_whole_value() {
        let mut a = obj(json!({"constants": [{"a": 1}], "tables": [{"name": "T"}]}));
        let b = obj(json!({"constants": [{"b": 2}]}));
        shallow_merge(&mut a, b);
        assert_eq!(a["constants"], json!([{"b": 2}]));
        assert_eq!(a["tables"], json!([{"name": "T"}]));
        let keys: Vec<&String> = a.keys().collect();
        assert_eq!(keys, vec!["constants", "tables"]);
    }

    #[test]
    fn test_shallow_merge_does_not_combine_nested_maps() {
        let mut a = obj(json!({"Office": {"name": "Office", "lpd": 1.0}}));
        shallow_merge(&mut a, obj(json!({"Office": {"name": "Office"}})));
        assert_eq!(a["Office"], json!({"name": "Office"}));
    }

    #[test]
    fn test_recursive_merge() {
        let a = obj(json!({"x": {"p": 1, "q": {"deep": true}}, "keep": 1}));
        let b = obj(json!({"x": {"q": {"other": false}, "r": 3}, "keep": [2]}));
        let merged = recursive_merge(&a, &b);
        assert_eq!(
            Value::Object(merged),
            json!({"x": {"p": 1, "q": {"deep": true, "other": false}, "r": 3}, "keep": [2]})
        );
        // Inputs untouched
        assert_eq!(a["x"]["q"], json!({"deep": true}));
        assert_eq!(b["keep"], json!([2]));
    }

    #[test]
    fn test_recursive_merge_mapping_replaced_by_scalar() {
        let a = obj(json!({"x": {"p": 1}}));
        let b = obj(json!({"x": 5}));
        assert_eq!(recursive_merge(&a, &b)["x"], json!(5));
        // ...and the reverse
        assert_eq!(recursive_merge(&b, &a)["x"], json!({"p": 1}));
    }
}
