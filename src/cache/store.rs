//! Cache Store Module
//!
//! Generic TTL cache keyed by normalized strings, guarded by one
//! readers-writer lock per instance.
//!
//! Expiry is lazy on reads: `get` reports an expired entry as missing but
//! leaves it in place, so reads only ever take the shared lock. Expired
//! entries are physically dropped by `sync`, which the caller schedules.
//! Nothing runs in the background.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::{CacheEntry, Clock, Key, KeyNormalizer};
use crate::config::CacheOptions;

// == Cache Trait ==
/// A time-bounded key-value cache.
pub trait Cache<T> {
    /// Returns the value for `key` if present and not expired.
    fn get(&self, key: impl Into<Key>) -> Option<T>;

    /// Stores `value` under `key`, replacing any previous entry and
    /// restarting its TTL.
    fn set(&self, key: impl Into<Key>, value: T);

    /// Removes every expired entry.
    fn sync(&self);
}

// == TTL Cache ==
/// Concurrent cache with a fixed TTL for every entry.
pub struct TtlCache<T> {
    /// Normalized key to entry
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    /// Lifetime of every entry, always positive
    ttl: Duration,
    key_normalizer: KeyNormalizer,
    clock: Arc<dyn Clock>,
}

impl<T> TtlCache<T> {
    // == Constructor ==
    /// Creates a cache from options. Never fails: invalid options are
    /// replaced with defaults.
    pub fn new(options: CacheOptions) -> Self {
        let resolved = options.normalized();
        debug!(ttl_ms = resolved.ttl.as_millis() as u64, "TTL cache created");

        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: resolved.ttl,
            key_normalizer: resolved.key_normalizer,
            clock: resolved.clock,
        }
    }

    // == TTL ==
    /// Returns the effective TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Insert ==
    /// Stores `value` under `key` with a fresh expiry, replacing any
    /// previous entry for the same normalized key.
    pub fn insert(&self, key: impl Into<Key>, value: T) {
        let key = self.normalize(key);
        let mut entries = self.entries.write();
        let entry = CacheEntry::new(value, self.clock.now(), self.ttl);

        trace!(key = %key, "cache set");
        entries.insert(key, entry);
    }

    // == Remove Expired ==
    /// Physically removes every entry with `expires_at <= now`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let now = self.clock.now();
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired(now));

        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "TTL sync: removed expired entries");
        } else {
            trace!("TTL sync: no expired entries found");
        }
        removed
    }

    // == Get With ==
    /// Applies `f` to the live value for `key` while holding the read lock.
    ///
    /// Returns None on a miss or if the entry has expired. Expired entries
    /// are left in place for `sync` to remove.
    pub fn get_with<R>(&self, key: impl Into<Key>, f: impl FnOnce(&T) -> R) -> Option<R> {
        let key = self.normalize(key);
        let entries = self.entries.read();

        match entries.get(&key) {
            Some(entry) if !entry.is_expired(self.clock.now()) => {
                trace!(key = %key, "cache hit");
                Some(f(&entry.value))
            }
            Some(_) => {
                trace!(key = %key, "cache entry expired");
                None
            }
            None => {
                trace!(key = %key, "cache miss");
                None
            }
        }
    }

    // == Time To Live ==
    /// Returns how long the entry for `key` has left, or None if it is
    /// missing or already expired.
    pub fn ttl_remaining(&self, key: impl Into<Key>) -> Option<Duration> {
        let key = self.normalize(key);
        let entries = self.entries.read();
        let now = self.clock.now();

        entries
            .get(&key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now))
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not
    /// yet removed by `sync`.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn normalize(&self, key: impl Into<Key>) -> String {
        (self.key_normalizer)(&key.into())
    }
}

impl<T: Clone> Cache<T> for TtlCache<T> {
    fn get(&self, key: impl Into<Key>) -> Option<T> {
        self.get_with(key, T::clone)
    }

    fn set(&self, key: impl Into<Key>, value: T) {
        self.insert(key, value);
    }

    fn sync(&self) {
        self.remove_expired();
    }
}

impl<T> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<T> fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}
