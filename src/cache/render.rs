//! Render Cache Module
//!
//! Wraps a `TtlCache` of object sequences and deep copies them on the way
//! in and on the way out, so neither the cache nor its callers can observe
//! each other's mutations.

use std::fmt;

use crate::cache::{Cache, Key, TtlCache};
use crate::config::CacheOptions;
use crate::tree::Object;

// == Deep Copy ==
/// A value that can produce an independent deep copy of itself.
pub trait DeepCopy {
    /// Returns a copy sharing no mutable state with `self`, up to the
    /// type's own isolation boundary.
    fn deep_copy(&self) -> Self;
}

/// Cached value: a rendered sequence, or an explicitly stored `None`.
pub type Rendered<O> = Option<Vec<O>>;

// == Render Cache ==
/// Cache for rendering results with automatic deep copying.
///
/// An uninitialized render cache (see `uninitialized`) is valid: `get`
/// always misses and `set`/`sync` do nothing.
pub struct RenderCache<O = Object> {
    inner: Option<TtlCache<Rendered<O>>>,
}

impl<O: DeepCopy> RenderCache<O> {
    // == Constructor ==
    /// Creates a render cache from options.
    pub fn new(options: CacheOptions) -> Self {
        Self {
            inner: Some(TtlCache::new(options)),
        }
    }

    /// Creates a render cache with no backing store.
    pub fn uninitialized() -> Self {
        Self { inner: None }
    }

    /// Returns true if the cache has a backing store.
    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    /// Returns the backing TTL cache, if any.
    pub fn inner(&self) -> Option<&TtlCache<Rendered<O>>> {
        self.inner.as_ref()
    }
}

fn copy_all<O: DeepCopy>(objects: &[O]) -> Vec<O> {
    objects.iter().map(DeepCopy::deep_copy).collect()
}

impl<O: DeepCopy> Cache<Rendered<O>> for RenderCache<O> {
    /// Returns a deep copy of the cached sequence.
    ///
    /// `Some(None)` means `None` was stored; `None` is a miss.
    fn get(&self, key: impl Into<Key>) -> Option<Rendered<O>> {
        let inner = self.inner.as_ref()?;

        // Copy under the read lock instead of cloning then copying again
        inner.get_with(key, |cached| cached.as_deref().map(copy_all))
    }

    /// Stores a deep copy of `value`. `None` is stored as `None`, not as
    /// an empty sequence.
    fn set(&self, key: impl Into<Key>, value: Rendered<O>) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };

        inner.insert(key, value.as_deref().map(copy_all));
    }

    fn sync(&self) {
        if let Some(inner) = self.inner.as_ref() {
            inner.remove_expired();
        }
    }
}

impl<O: DeepCopy> Default for RenderCache<O> {
    fn default() -> Self {
        Self::uninitialized()
    }
}

impl<O> fmt::Debug for RenderCache<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCache")
            .field("inner", &self.inner)
            .finish()
    }
}
