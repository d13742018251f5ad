//! Cache Module
//!
//! Provides a concurrent TTL cache with pluggable key normalization, and a
//! render cache that deep copies values at the get/set boundary.

mod clock;
mod entry;
mod key;
mod render;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::{default_normalizer, Key, KeyNormalizer};
pub use render::{DeepCopy, RenderCache, Rendered};
pub use store::{Cache, TtlCache};
