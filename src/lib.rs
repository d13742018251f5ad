//! Render Cache - A time-bounded in-memory cache for rendered values
//!
//! Provides a concurrency-safe TTL cache, deep clone and deep merge over
//! JSON-like trees, and a render cache that isolates stored objects from
//! caller mutation.

pub mod cache;
pub mod config;
pub mod error;
pub mod tree;

pub use cache::{
    default_normalizer, Cache, Clock, DeepCopy, Key, KeyNormalizer, ManualClock, RenderCache,
    Rendered, SystemClock, TtlCache,
};
pub use config::CacheOptions;
pub use error::{Error, Result};
pub use tree::{deep_clone, deep_clone_map, deep_merge, Map, Object, OpaqueValue, Value};
