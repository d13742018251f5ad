//! Object Module
//!
//! A manifest-like object: a tree rooted at a map with well-known
//! `apiVersion`, `kind` and `metadata` fields.

use serde::{Deserialize, Serialize};

use crate::cache::DeepCopy;
use crate::tree::{deep_clone, deep_clone_map, Map, Value};

/// An object backed by a JSON-like map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object {
    map: Map,
}

impl Object {
    pub fn new(map: Map) -> Self {
        Self { map }
    }

    /// Builds an object from JSON. Returns None unless `json` is an object.
    pub fn from_json(json: serde_json::Value) -> Option<Self> {
        match Value::from(json) {
            Value::Map(map) => Some(Self::new(map)),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.map.get("kind").and_then(Value::as_str)
    }

    pub fn api_version(&self) -> Option<&str> {
        self.map.get("apiVersion").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.set_metadata_str("name", name.into());
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.set_metadata_str("namespace", namespace.into());
    }

    /// Looks up a nested field by path, e.g. `["spec", "replicas"]`.
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut current = &self.map;
        for segment in parents {
            current = current.get(*segment)?.as_map()?;
        }
        current.get(*last)
    }

    pub fn as_map(&self) -> &Map {
        &self.map
    }

    pub fn as_map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn into_map(self) -> Map {
        self.map
    }

    fn metadata_str(&self, field: &str) -> Option<&str> {
        self.field(&["metadata", field]).and_then(Value::as_str)
    }

    /// Sets `metadata.<field>`, replacing a non-map `metadata`.
    fn set_metadata_str(&mut self, field: &str, value: String) {
        let metadata = self
            .map
            .entry("metadata".to_string())
            .or_insert_with(|| Value::Map(Map::new()));
        if metadata.as_map().is_none() {
            *metadata = Value::Map(Map::new());
        }
        if let Some(metadata) = metadata.as_map_mut() {
            metadata.insert(field.to_string(), Value::String(value));
        }
    }
}

impl From<Map> for Object {
    fn from(map: Map) -> Self {
        Self::new(map)
    }
}

impl DeepCopy for Object {
    fn deep_copy(&self) -> Self {
        Self::new(deep_clone_map(&self.map))
    }
}

impl DeepCopy for Value {
    fn deep_copy(&self) -> Self {
        deep_clone(self)
    }
}
