//! Deep Merge Module
//!
//! Right-biased recursive merge of maps.

use crate::tree::{deep_clone, deep_clone_map, Map, Value};

// == Deep Merge ==
/// Merges `overlay` into `base` and returns a new map. Neither input is
/// modified.
///
/// - Both absent: empty map.
/// - One absent: deep clone of the other.
/// - Key in both, both values maps: merged recursively.
/// - Key in both otherwise (lists, scalars, type mismatches): the overlay
///   value replaces the base value. Lists are never concatenated or merged
///   element-wise.
/// - Key in one side only: cloned from that side.
///
/// ```
/// use render_cache::{deep_merge, Value};
/// use serde_json::json;
///
/// let base = Value::from(json!({"image": {"repository": "nginx", "tag": "1.25.0"}, "tags": ["dev", "test"]}));
/// let overlay = Value::from(json!({"image": {"tag": "1.26.0"}, "tags": ["prod"]}));
///
/// let merged = deep_merge(base.as_map(), overlay.as_map());
/// assert_eq!(
///     Value::Map(merged),
///     Value::from(json!({"image": {"repository": "nginx", "tag": "1.26.0"}, "tags": ["prod"]}))
/// );
/// ```
pub fn deep_merge(base: Option<&Map>, overlay: Option<&Map>) -> Map {
    let (base, overlay) = match (base, overlay) {
        (None, None) => return Map::new(),
        (Some(base), None) => return deep_clone_map(base),
        (None, Some(overlay)) => return deep_clone_map(overlay),
        (Some(base), Some(overlay)) => (base, overlay),
    };

    let mut result = Map::with_capacity(base.len() + overlay.len());

    for (key, base_value) in base {
        let merged = match (base_value, overlay.get(key)) {
            (Value::Map(base_map), Some(Value::Map(overlay_map))) => {
                Value::Map(deep_merge(Some(base_map), Some(overlay_map)))
            }
            (_, Some(overlay_value)) => deep_clone(overlay_value),
            (_, None) => deep_clone(base_value),
        };
        result.insert(key.clone(), merged);
    }

    for (key, overlay_value) in overlay {
        if !base.contains_key(key) {
            result.insert(key.clone(), deep_clone(overlay_value));
        }
    }

    result
}
