//! Cache Key Module
//!
//! Maps arbitrary key values to the canonical strings used as storage keys.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::Result;

// == Key Normalizer ==
/// Turns a key into its storage string. Must be deterministic.
pub type KeyNormalizer = Arc<dyn Fn(&Key) -> String + Send + Sync>;

// == Key ==
/// A cache key before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Text, used verbatim
    Text(String),
    /// Raw bytes, text if valid UTF-8 and escaped otherwise
    Bytes(Vec<u8>),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    Uint(u64),
    /// Any other serializable value
    Structured(serde_json::Value),
}

impl Key {
    /// Builds a key from any serializable value.
    ///
    /// Values that serialize to a JSON string or integer collapse into the
    /// matching scalar variant, so `Key::structured(&"a")` equals `Key::from("a")`.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::from(serde_json::to_value(value)?))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::Text(value.clone())
    }
}

impl From<&[u8]> for Key {
    fn from(value: &[u8]) -> Self {
        Key::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(value: Vec<u8>) -> Self {
        Key::Bytes(value)
    }
}

impl From<serde_json::Value> for Key {
    /// JSON strings and integers collapse into `Text`, `Int` or `Uint`.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Key::Text(s),
            serde_json::Value::Number(ref n) if n.is_i64() => {
                Key::Int(n.as_i64().unwrap_or_default())
            }
            serde_json::Value::Number(ref n) if n.is_u64() => {
                Key::Uint(n.as_u64().unwrap_or_default())
            }
            other => Key::Structured(other),
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(value: $t) -> Self {
                Key::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(value: $t) -> Self {
                Key::Uint(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

// == Default Normalizer ==
/// Built-in key normalizer.
///
/// Text passes through and integers render as decimal. Bytes that are
/// valid UTF-8 pass through as text; see `bytes_to_string` for the rest.
/// Structured keys render as compact JSON with object keys sorted at every
/// level, so the same logical value always yields the same string.
pub fn default_normalizer(key: &Key) -> String {
    match key {
        Key::Text(s) => s.clone(),
        Key::Bytes(b) => bytes_to_string(b),
        Key::Int(i) => i.to_string(),
        Key::Uint(u) => u.to_string(),
        Key::Structured(value) => {
            serde_json::to_string(&SortedJson(value)).unwrap_or_else(|_| value.to_string())
        }
    }
}

/// Renders bytes without losing information.
///
/// Valid UTF-8 is returned verbatim. Otherwise every backslash is doubled
/// and every byte outside a valid UTF-8 run becomes `\xNN`, so two distinct
/// invalid sequences never render the same.
fn bytes_to_string(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut out = String::with_capacity(bytes.len() * 2);
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                push_escaped(&mut out, valid);
                break;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                push_escaped(&mut out, std::str::from_utf8(valid).unwrap_or_default());

                let invalid_len = err.error_len().unwrap_or(after.len());
                for byte in &after[..invalid_len] {
                    out.push_str(&format!("\\x{byte:02x}"));
                }
                rest = &after[invalid_len..];
            }
        }
    }
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '\\' {
            out.push_str("\\\\");
        } else {
            out.push(c);
        }
    }
}

/// Serializes JSON with object keys sorted, independent of how
/// `serde_json::Map` orders them.
struct SortedJson<'a>(&'a serde_json::Value);

impl Serialize for SortedJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            serde_json::Value::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    out.serialize_entry(key, &SortedJson(item))?;
                }
                out.end()
            }
            serde_json::Value::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(&SortedJson(item))?;
                }
                out.end()
            }
            other => other.serialize(serializer),
        }
    }
}
