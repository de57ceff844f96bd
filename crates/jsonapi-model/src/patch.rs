//! # Deep-Patch Reducer
//!
//! Computes the minimal substitution of a nested structure for a PATCH
//! body. The caller names only the leaf keys to change; the reducer finds
//! the nesting level whose key set covers the candidates and substitutes
//! there, leaving every sibling and ancestor untouched.

use crate::model::AttrMap;
use serde_json::Value;

/// Reduces `value` against the candidate attributes.
///
/// At each composite level: when every candidate key appears in the
/// object's key set, the object is replaced wholesale by the candidate
/// bag; otherwise each entry (and each array element) is reduced
/// recursively. Scalars are returned unchanged, and a candidate set that
/// matches nothing simply leaves the structure as it was; there is no
/// failure path.
pub fn transform_for_patch(value: &Value, attrs: &AttrMap) -> Value {
    let object = match value {
        Value::Object(object) => object,
        Value::Array(items) => {
            return Value::Array(
                items
                    .iter()
                    .map(|item| transform_for_patch(item, attrs))
                    .collect(),
            )
        }
        _ => return value.clone(),
    };

    if attrs.keys().all(|key| object.contains_key(key)) {
        return Value::Object(attrs.clone());
    }

    Value::Object(
        object
            .iter()
            .map(|(key, nested)| (key.clone(), transform_for_patch(nested, attrs)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidates(value: Value) -> AttrMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn replaces_the_level_whose_keys_cover_the_candidates() {
        let snapshot = json!({
            "data": {
                "id": "1",
                "attributes": {
                    "title": "The Tempest",
                    "pricing": {"amount": 10, "currency": "GBP"}
                }
            }
        });
        let attrs = candidates(json!({"amount": 12, "currency": "EUR"}));

        let reduced = transform_for_patch(&snapshot, &attrs);

        assert_eq!(
            reduced,
            json!({
                "data": {
                    "id": "1",
                    "attributes": {
                        "title": "The Tempest",
                        "pricing": {"amount": 12, "currency": "EUR"}
                    }
                }
            })
        );
    }

    #[test]
    fn substituted_values_come_from_the_candidates_not_the_snapshot() {
        let snapshot = json!({"outer": {"a": 1, "b": 2, "c": 3}});
        let attrs = candidates(json!({"a": 9, "b": 8, "c": 7}));

        let reduced = transform_for_patch(&snapshot, &attrs);
        assert_eq!(reduced, json!({"outer": {"a": 9, "b": 8, "c": 7}}));
    }

    #[test]
    fn partial_cover_replaces_only_the_named_keys_level() {
        // candidate keys are a strict subset of the attributes object, so
        // the cover check matches there and the whole object is replaced by
        // the candidate bag
        let snapshot = json!({"attributes": {"a": 1, "b": 2, "c": 3, "d": 4}});
        let attrs = candidates(json!({"b": 2, "d": 4}));

        let reduced = transform_for_patch(&snapshot, &attrs);
        assert_eq!(reduced, json!({"attributes": {"b": 2, "d": 4}}));
    }

    #[test]
    fn no_matching_level_is_a_structural_no_op() {
        let snapshot = json!({"a": {"b": {"c": 1}}, "d": 2});
        let attrs = candidates(json!({"zzz": true}));

        let reduced = transform_for_patch(&snapshot, &attrs);
        assert_eq!(reduced, snapshot);
    }

    #[test]
    fn scalar_root_is_returned_unchanged() {
        let attrs = candidates(json!({"a": 1}));
        assert_eq!(transform_for_patch(&json!(42), &attrs), json!(42));
        assert_eq!(transform_for_patch(&json!(null), &attrs), json!(null));
    }

    #[test]
    fn arrays_are_reduced_element_wise() {
        let snapshot = json!({"items": [{"a": 1, "b": 2}, {"x": 1}]});
        let attrs = candidates(json!({"a": 5, "b": 6}));

        let reduced = transform_for_patch(&snapshot, &attrs);
        assert_eq!(reduced, json!({"items": [{"a": 5, "b": 6}, {"x": 1}]}));
    }

    #[test]
    fn reduction_is_idempotent() {
        let snapshot = json!({
            "data": {"attributes": {"a": 1, "b": {"x": 2, "y": 3}}}
        });
        let attrs = candidates(json!({"x": 9, "y": 9}));

        let once = transform_for_patch(&snapshot, &attrs);
        let twice = transform_for_patch(&once, &attrs);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_candidates_match_the_first_composite() {
        let snapshot = json!({"a": 1});
        let attrs = AttrMap::new();
        assert_eq!(transform_for_patch(&snapshot, &attrs), json!({}));
    }
}
