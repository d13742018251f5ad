//! Configuration Module
//!
//! Handles cache construction options: defaults, builder-style overrides,
//! environment loading and post-validation clamping.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{default_normalizer, Clock, Key, KeyNormalizer, SystemClock};

// == Public Constants ==
/// TTL applied when none is configured or the configured one is zero
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Environment variable holding the TTL in seconds
pub const TTL_ENV_VAR: &str = "CACHE_TTL_SECS";

/// Cache construction options.
///
/// Invalid values are never rejected. `normalized` replaces them with
/// defaults before a cache is built.
#[derive(Clone)]
pub struct CacheOptions {
    /// Time-to-live for every entry
    pub ttl: Duration,
    /// Key normalizer, None = built-in normalizer
    pub key_normalizer: Option<KeyNormalizer>,
    /// Time source, None = system clock
    pub clock: Option<Arc<dyn Clock>>,
}

impl CacheOptions {
    // == Constructor ==
    /// Creates options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options by loading the TTL from the environment.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_SECS` - TTL in seconds (default: 300)
    pub fn from_env() -> Self {
        let ttl = env::var(TTL_ENV_VAR)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL);

        Self {
            ttl,
            ..Self::default()
        }
    }

    // == Builders ==
    /// Sets the entry time-to-live. A zero TTL falls back to the default.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the function used to turn keys into storage strings.
    pub fn with_key_normalizer<F>(mut self, normalizer: F) -> Self
    where
        F: Fn(&Key) -> String + Send + Sync + 'static,
    {
        let normalizer: KeyNormalizer = Arc::new(normalizer);
        self.key_normalizer = Some(normalizer);
        self
    }

    /// Sets the time source used for expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    // == Post-validation ==
    /// Clamps invalid values to defaults.
    pub(crate) fn normalized(self) -> ResolvedOptions {
        let ttl = if self.ttl.is_zero() {
            debug!(default_secs = DEFAULT_TTL.as_secs(), "Non-positive TTL, using default");
            DEFAULT_TTL
        } else {
            self.ttl
        };

        let key_normalizer = self.key_normalizer.unwrap_or_else(|| {
            debug!("No key normalizer configured, using default");
            let fallback: KeyNormalizer = Arc::new(default_normalizer);
            fallback
        });

        let clock = self.clock.unwrap_or_else(|| {
            let system: Arc<dyn Clock> = Arc::new(SystemClock);
            system
        });

        ResolvedOptions {
            ttl,
            key_normalizer,
            clock,
        }
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            key_normalizer: None,
            clock: None,
        }
    }
}

impl fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("ttl", &self.ttl)
            .field("key_normalizer", &self.key_normalizer.is_some())
            .field("clock", &self.clock.is_some())
            .finish()
    }
}

/// Options after clamping, with every field filled in.
pub(crate) struct ResolvedOptions {
    pub ttl: Duration,
    pub key_normalizer: KeyNormalizer,
    pub clock: Arc<dyn Clock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = CacheOptions::default();
        assert_eq!(options.ttl, DEFAULT_TTL);
        assert!(options.key_normalizer.is_none());
        assert!(options.clock.is_none());
    }

    #[test]
    fn test_zero_ttl_resets_to_default() {
        let resolved = CacheOptions::new().with_ttl(Duration::ZERO).normalized();
        assert_eq!(resolved.ttl, DEFAULT_TTL);
    }

    #[test]
    fn test_positive_ttl_kept() {
        let resolved = CacheOptions::new()
            .with_ttl(Duration::from_millis(250))
            .normalized();
        assert_eq!(resolved.ttl, Duration::from_millis(250));
    }

    #[test]
    fn test_missing_normalizer_uses_default() {
        let resolved = CacheOptions::new().normalized();
        assert_eq!((resolved.key_normalizer)(&Key::from(42)), "42");
    }

    #[test]
    fn test_custom_normalizer_kept() {
        let resolved = CacheOptions::new()
            .with_key_normalizer(|_| "fixed".to_string())
            .normalized();
        assert_eq!((resolved.key_normalizer)(&Key::from("anything")), "fixed");
    }

    #[test]
    fn test_options_from_env() {
        // Single test touches the variable to avoid races between tests
        env::remove_var(TTL_ENV_VAR);
        assert_eq!(CacheOptions::from_env().ttl, DEFAULT_TTL);

        env::set_var(TTL_ENV_VAR, "42");
        assert_eq!(CacheOptions::from_env().ttl, Duration::from_secs(42));

        env::set_var(TTL_ENV_VAR, "not-a-number");
        assert_eq!(CacheOptions::from_env().ttl, DEFAULT_TTL);

        env::set_var(TTL_ENV_VAR, "0");
        let resolved = CacheOptions::from_env().normalized();
        assert_eq!(resolved.ttl, DEFAULT_TTL);

        env::remove_var(TTL_ENV_VAR);
    }
}
