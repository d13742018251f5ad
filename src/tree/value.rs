//! Tree Value Module
//!
//! JSON-like values as produced by decoding structured configuration.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};

use crate::error::Error;
use crate::tree::deep_clone;

/// A mapping from string keys to tree values. Enumeration order carries
/// no meaning.
pub type Map = HashMap<String, Value>;

// == Opaque Value ==
/// Shared handle to state the tree does not model.
///
/// Cloning an `OpaqueValue` shares the same underlying state. Embedding
/// interior-mutable state here opts out of clone isolation.
#[derive(Clone)]
pub struct OpaqueValue(Arc<dyn Any + Send + Sync>);

impl OpaqueValue {
    /// Wraps `value` in a new shared handle.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wraps existing shared state without copying it.
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }

    /// Returns the inner value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns true if both handles point at the same state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueValue({:p})", Arc::as_ptr(&self.0))
    }
}

// == Value ==
/// A JSON-like tree.
///
/// Sequences whose elements share one scalar kind have dedicated variants
/// so they can be copied as flat buffers.
#[derive(Debug, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// String-keyed mapping
    Map(Map),
    /// Heterogeneous sequence
    List(Vec<Value>),
    /// Sequence of strings
    Strings(Vec<String>),
    /// Sequence of integers
    Ints(Vec<i64>),
    /// Sequence of floats
    Floats(Vec<f64>),
    /// Sequence of booleans
    Bools(Vec<bool>),
    /// Unmodeled composite, shared by identity
    Opaque(OpaqueValue),
    /// Sequence of unmodeled composites
    OpaqueList(Vec<OpaqueValue>),
}

impl Value {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Strings(_) => "strings",
            Value::Ints(_) => "ints",
            Value::Floats(_) => "floats",
            Value::Bools(_) => "bools",
            Value::Opaque(_) => "opaque",
            Value::OpaqueList(_) => "opaque_list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Converts to `serde_json::Value`. Fails on opaque content and
    /// non-finite floats.
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        let mut path = String::from("$");
        to_json_at(self, &mut path)
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        deep_clone(self)
    }
}

// == Conversions ==
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::Strings(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::Strings(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::Ints(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::Floats(value)
    }
}

impl From<Vec<bool>> for Value {
    fn from(value: Vec<bool>) -> Self {
        Value::Bools(value)
    }
}

impl From<OpaqueValue> for Value {
    fn from(value: OpaqueValue) -> Self {
        Value::Opaque(value)
    }
}

impl From<serde_json::Value> for Value {
    /// Arrays whose elements are all strings, all integers, all
    /// non-integer numbers, or all booleans become typed sequences. Integers
    /// beyond `i64` are carried as floats.
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
            Json::Array(items) => from_json_array(items),
        }
    }
}

fn from_json_array(items: Vec<serde_json::Value>) -> Value {
    use serde_json::Value as Json;

    if items.is_empty() {
        return Value::List(Vec::new());
    }

    if items.iter().all(Json::is_string) {
        let strings = items
            .into_iter()
            .filter_map(|item| match item {
                Json::String(s) => Some(s),
                _ => None,
            })
            .collect();
        return Value::Strings(strings);
    }
    if items.iter().all(Json::is_i64) {
        return Value::Ints(items.iter().filter_map(Json::as_i64).collect());
    }
    if items.iter().all(Json::is_f64) {
        return Value::Floats(items.iter().filter_map(Json::as_f64).collect());
    }
    if items.iter().all(Json::is_boolean) {
        return Value::Bools(items.iter().filter_map(Json::as_bool).collect());
    }

    Value::List(items.into_iter().map(Value::from).collect())
}

impl TryFrom<&Value> for serde_json::Value {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.to_json()
    }
}

fn float_to_json(f: f64, path: &str) -> Result<serde_json::Value, Error> {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .ok_or_else(|| Error::NonFiniteFloat(path.to_string()))
}

fn to_json_at(value: &Value, path: &mut String) -> Result<serde_json::Value, Error> {
    use serde_json::Value as Json;

    let json = match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => float_to_json(*f, path)?,
        Value::String(s) => Json::String(s.clone()),
        Value::Map(map) => {
            let mut out = serde_json::Map::new();
            for (key, item) in map {
                let len = path.len();
                path.push('.');
                path.push_str(key);
                out.insert(key.clone(), to_json_at(item, path)?);
                path.truncate(len);
            }
            Json::Object(out)
        }
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{i}]"));
                out.push(to_json_at(item, path)?);
                path.truncate(len);
            }
            Json::Array(out)
        }
        Value::Strings(items) => Json::from(items.clone()),
        Value::Ints(items) => Json::from(items.clone()),
        Value::Floats(items) => Json::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, f)| float_to_json(*f, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Value::Bools(items) => Json::from(items.clone()),
        Value::Opaque(_) | Value::OpaqueList(_) => {
            return Err(Error::OpaqueValue(path.clone()));
        }
    };
    Ok(json)
}

// == Serde ==
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Map(map) => {
                // Sorted so serialized output is stable
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    out.serialize_entry(key, item)?;
                }
                out.end()
            }
            Value::List(items) => items.serialize(serializer),
            Value::Strings(items) => items.serialize(serializer),
            Value::Ints(items) => items.serialize(serializer),
            Value::Floats(items) => items.serialize(serializer),
            Value::Bools(items) => items.serialize(serializer),
            Value::Opaque(_) | Value::OpaqueList(_) => Err(S::Error::custom(
                "opaque values cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_typed_arrays() {
        let value = Value::from(json!({
            "tags": ["dev", "test"],
            "ports": [80, 443],
            "ratios": [0.5, 1.5],
            "flags": [true, false],
            "mixed": [1, "two", {"three": 3}],
            "numbers": [1, 2.5],
            "empty": []
        }));

        let map = value.as_map().unwrap();
        assert_eq!(map["tags"], Value::from(vec!["dev", "test"]));
        assert_eq!(map["ports"], Value::Ints(vec![80, 443]));
        assert_eq!(map["ratios"], Value::Floats(vec![0.5, 1.5]));
        assert_eq!(map["flags"], Value::Bools(vec![true, false]));
        assert_eq!(map["mixed"].kind(), "list");
        assert_eq!(map["numbers"].kind(), "list");
        assert_eq!(map["empty"], Value::List(Vec::new()));
    }

    #[test]
    fn test_to_json_round_trip() {
        let source = json!({
            "kind": "Deployment",
            "spec": {"replicas": 3, "ports": [80], "env": [{"name": "A"}]},
            "enabled": true,
            "nothing": null
        });

        let value = Value::from(source.clone());
        assert_eq!(value.to_json().unwrap(), source);
        assert_eq!(serde_json::Value::try_from(&value).unwrap(), source);
    }

    #[test]
    fn test_to_json_rejects_opaque() {
        let mut inner = Map::new();
        inner.insert("handle".to_string(), Value::Opaque(OpaqueValue::new(5u8)));
        let mut map = Map::new();
        map.insert("spec".to_string(), Value::Map(inner));

        let err = Value::Map(map).to_json().unwrap_err();
        assert!(matches!(err, Error::OpaqueValue(path) if path == "$.spec.handle"));
    }

    #[test]
    fn test_to_json_rejects_nan() {
        let value = Value::List(vec![Value::Int(1), Value::Float(f64::NAN)]);

        let err = value.to_json().unwrap_err();
        assert!(matches!(err, Error::NonFiniteFloat(path) if path == "$[1]"));
    }

    #[test]
    fn test_serialize_is_sorted() {
        let mut map = Map::new();
        map.insert("b".to_string(), Value::from(2));
        map.insert("a".to_string(), Value::from(1));

        let text = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(text, r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_deserialize() {
        let value: Value = serde_json::from_str(r#"{"names": ["a", "b"]}"#).unwrap();
        assert_eq!(value.as_map().unwrap()["names"], Value::from(vec!["a", "b"]));
    }

    #[test]
    fn test_opaque_equality_is_identity() {
        let a = OpaqueValue::new(1u32);
        let b = OpaqueValue::new(1u32);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.downcast_ref::<u32>(), Some(&1));
    }

    #[test]
    fn test_default_is_null() {
        assert_eq!(Value::default(), Value::Null);
        assert!(Value::default().is_null());
    }
}
