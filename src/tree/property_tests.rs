//! Property-Based Tests for Tree Module
//!
//! Uses proptest to check clone isolation and merge semantics over
//! randomly generated trees.

use proptest::prelude::*;

use crate::tree::{deep_clone, deep_clone_map, deep_merge, Map, Value};

// == Strategies ==
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        "[a-z]{0,8}".prop_map(Value::String),
        prop::collection::vec("[a-z]{0,4}", 0..4).prop_map(Value::Strings),
        prop::collection::vec(any::<i64>(), 0..4).prop_map(Value::Ints),
        prop::collection::vec(-1.0e3f64..1.0e3, 0..4).prop_map(Value::Floats),
        prop::collection::vec(any::<bool>(), 0..4).prop_map(Value::Bools),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::hash_map("[a-e]", inner, 0..4).prop_map(Value::Map),
        ]
    })
}

fn map_strategy() -> impl Strategy<Value = Map> {
    prop::collection::hash_map("[a-e]", value_strategy(), 0..5)
}

/// Overwrites every leaf reachable through containers.
fn scribble(value: &mut Value) {
    match value {
        Value::Map(map) => {
            map.values_mut().for_each(scribble);
            map.insert("scribbled".to_string(), Value::Bool(true));
        }
        Value::List(items) => {
            items.iter_mut().for_each(scribble);
            items.push(Value::Null);
        }
        Value::Strings(items) => items.push("scribbled".to_string()),
        Value::Ints(items) => items.push(0),
        Value::Floats(items) => items.push(0.0),
        Value::Bools(items) => items.push(false),
        other => *other = Value::from("scribbled"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A clone equals its source.
    #[test]
    fn prop_clone_is_equal(value in value_strategy()) {
        prop_assert_eq!(deep_clone(&value), value);
    }

    // Mutating a clone never shows through the source, and vice versa.
    #[test]
    fn prop_clone_is_isolated(value in value_strategy()) {
        let snapshot = deep_clone(&value);

        let mut clone = deep_clone(&value);
        scribble(&mut clone);
        prop_assert_eq!(&value, &snapshot);

        let mut source = value;
        let clone = deep_clone(&source);
        scribble(&mut source);
        prop_assert_eq!(clone, snapshot);
    }

    // Merging with an absent side is a deep clone of the other side.
    #[test]
    fn prop_merge_identity(map in map_strategy()) {
        prop_assert_eq!(deep_merge(Some(&map), None), deep_clone_map(&map));
        prop_assert_eq!(deep_merge(None, Some(&map)), deep_clone_map(&map));
        prop_assert_eq!(deep_merge(Some(&map), Some(&Map::new())), map.clone());
        prop_assert_eq!(deep_merge(Some(&Map::new()), Some(&map)), map);
    }

    // The result holds exactly the union of keys, and overlay wins every
    // conflict that is not map-against-map.
    #[test]
    fn prop_merge_right_biased(base in map_strategy(), overlay in map_strategy()) {
        let result = deep_merge(Some(&base), Some(&overlay));

        for key in base.keys().chain(overlay.keys()) {
            prop_assert!(result.contains_key(key));
        }
        prop_assert!(result.keys().all(|k| base.contains_key(k) || overlay.contains_key(k)));

        for (key, merged) in &result {
            match (base.get(key), overlay.get(key)) {
                (Some(Value::Map(b)), Some(Value::Map(o))) => {
                    prop_assert_eq!(merged, &Value::Map(deep_merge(Some(b), Some(o))));
                }
                (_, Some(o)) => prop_assert_eq!(merged, o),
                (Some(b), None) => prop_assert_eq!(merged, b),
                (None, None) => prop_assert!(false, "unexpected key {}", key),
            }
        }
    }

    // Merging never modifies its inputs.
    #[test]
    fn prop_merge_does_not_mutate(base in map_strategy(), overlay in map_strategy()) {
        let base_before = deep_clone_map(&base);
        let overlay_before = deep_clone_map(&overlay);

        let mut result = deep_merge(Some(&base), Some(&overlay));
        result.values_mut().for_each(scribble);

        prop_assert_eq!(base, base_before);
        prop_assert_eq!(overlay, overlay_before);
    }

    // Merging a map with itself yields the same map.
    #[test]
    fn prop_merge_idempotent(map in map_strategy()) {
        prop_assert_eq!(deep_merge(Some(&map), Some(&map)), map);
    }
}
