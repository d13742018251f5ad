//! Deep Clone Module
//!
//! Copies trees so that writes through the copy are never visible through
//! the source, and the other way around.
//!
//! Isolation stops at opaque values: `Value::Opaque` is returned by
//! identity and the elements of `Value::OpaqueList` are shared, so state
//! embedded there stays shared between source and clone. Callers that embed
//! mutable opaque state are responsible for isolating it.

use crate::tree::{Map, Value};

// == Deep Clone ==
/// Returns a deep copy of `value`.
///
/// - Maps and heterogeneous lists are rebuilt with every child cloned.
/// - Typed scalar sequences are copied as flat buffers.
/// - Opaque lists are copied one level; their elements are shared.
/// - Scalars and opaque values are returned as-is.
pub fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Map(map) => Value::Map(deep_clone_map(map)),
        Value::List(items) => Value::List(items.iter().map(deep_clone).collect()),
        Value::Strings(items) => Value::Strings(items.to_vec()),
        Value::Ints(items) => Value::Ints(items.to_vec()),
        Value::Floats(items) => Value::Floats(items.to_vec()),
        Value::Bools(items) => Value::Bools(items.to_vec()),
        Value::OpaqueList(items) => Value::OpaqueList(items.iter().cloned().collect()),
        Value::Opaque(opaque) => Value::Opaque(opaque.clone()),
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Int(i) => Value::Int(*i),
        Value::Float(f) => Value::Float(*f),
        Value::String(s) => Value::String(s.clone()),
    }
}

/// Returns a deep copy of `map`, cloning every value with `deep_clone`.
pub fn deep_clone_map(map: &Map) -> Map {
    let mut result = Map::with_capacity(map.len());
    for (key, value) in map {
        result.insert(key.clone(), deep_clone(value));
    }
    result
}
