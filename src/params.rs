//! Request parameter sets and the rules used to combine them.

use serde_json::Value;

/// A set of request parameters, keyed by name.
pub type Params = serde_json::Map<String, Value>;

/// Converts a JSON value into a parameter set, if it is an object.
pub fn to_params(value: Value) -> Option<Params> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Recursively merges `source` into `dest`, `source` winning on conflicts.
///
/// Nested objects present on both sides are merged key by key. Any other
/// value from `source` (scalars, arrays, `null`) replaces the one in `dest`.
pub fn deep_merge(dest: &mut Params, source: &Params) {
    for (key, value) in source {
        match (dest.get_mut(key), value) {
            (Some(Value::Object(dest_obj)), Value::Object(source_obj)) => {
                deep_merge(dest_obj, source_obj)
            }
            _ => {
                dest.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Copies the top-level entries of `source` into `dest`, replacing whole values.
pub fn shallow_merge(dest: &mut Params, source: &Params) {
    for (key, value) in source {
        dest.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        to_params(value).unwrap()
    }

    #[test]
    fn to_params_rejects_non_objects() {
        assert!(to_params(json!([1, 2])).is_none());
        assert!(to_params(json!("a")).is_none());
        assert_eq!(to_params(json!({})), Some(Params::new()));
    }

    #[test]
    fn deep_merge_last_wins() {
        let mut dest = params(json!({"a": 1, "b": 2}));
        deep_merge(&mut dest, &params(json!({"b": 3, "c": 4})));
        assert_eq!(Value::Object(dest), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn deep_merge_recurses_into_objects() {
        let mut dest = params(json!({"filter": {"name": "x", "page": 1}}));
        deep_merge(&mut dest, &params(json!({"filter": {"page": 2}})));
        assert_eq!(
            Value::Object(dest),
            json!({"filter": {"name": "x", "page": 2}})
        );
    }

    #[test]
    fn deep_merge_replaces_arrays_and_mismatched_shapes() {
        let mut dest = params(json!({"ids": [1, 2, 3], "sort": "asc", "f": {"a": 1}}));
        deep_merge(
            &mut dest,
            &params(json!({"ids": [9], "sort": {"by": "name"}, "f": null})),
        );
        assert_eq!(
            Value::Object(dest),
            json!({"ids": [9], "sort": {"by": "name"}, "f": null})
        );
    }

    #[test]
    fn deep_merge_copies_source_objects() {
        let source = params(json!({"nested": {"k": 1}}));
        let mut dest = Params::new();
        deep_merge(&mut dest, &source);
        deep_merge(&mut dest, &params(json!({"nested": {"j": 2}})));
        assert_eq!(source, params(json!({"nested": {"k": 1}})));
        assert_eq!(Value::Object(dest), json!({"nested": {"k": 1, "j": 2}}));
    }

    #[test]
    fn shallow_merge_replaces_nested_objects() {
        let mut dest = params(json!({"filter": {"name": "x", "page": 1}}));
        shallow_merge(&mut dest, &params(json!({"filter": {"page": 2}})));
        assert_eq!(Value::Object(dest), json!({"filter": {"page": 2}}));
    }

    #[test]
    fn cumulative_history_replays() {
        // initial, then (append <- call) twice
        let append = params(json!({"b": 2}));
        let mut last = Params::new();
        shallow_merge(&mut last, &params(json!({"a": 1})));
        for call in [json!({"a": 3}), json!({"c": 4})] {
            deep_merge(&mut last, &append);
            deep_merge(&mut last, &params(call));
        }
        assert_eq!(Value::Object(last), json!({"a": 3, "b": 2, "c": 4}));
    }
}
