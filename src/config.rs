//! Prime Cache Configuration
//!
//! Configuration for [`PrimeCache`](crate::PrimeCache) and
//! [`ConcurrentPrimeCache`](crate::ConcurrentPrimeCache). Fields are public
//! for simple instantiation; the builder methods exist for call sites that
//! only want to override one value.
//!
//! # Sizing Guidelines
//!
//! Answering a query for bound `n` may allocate one byte per integer in the
//! sieved range (all of `[0, n]` on a rebuild, `(frontier, n]` on an
//! extension), and the cache itself holds roughly `n / ln n` primes of 8
//! bytes each:
//!
//! ```text
//! Peak Memory ≈ n bytes (markers) + 8 × n / ln(n) bytes (cached primes)
//! ```
//!
//! | `max_bound` | Marker bytes | Cached primes |
//! |-------------|--------------|---------------|
//! | 10⁶ | ~1 MB | 78,498 (~0.6 MB) |
//! | 10⁸ | ~100 MB | 5,761,455 (~46 MB) |
//! | 10⁹ | ~1 GB | 50,847,534 (~407 MB) |
//!
//! Set `max_bound` when bounds come from untrusted callers.
//!
//! # Examples
//!
//! ```
//! use prime_cache::config::PrimeCacheConfig;
//! use prime_cache::PrimeCache;
//!
//! let config = PrimeCacheConfig {
//!     max_bound: 1_000_000,
//!     initial_bound: Some(10_000),
//! };
//! let cache = PrimeCache::init(config).unwrap();
//! assert_eq!(cache.len(), 1229);
//! ```

use core::fmt;

/// Default upper limit on query bounds: 100 million.
pub const DEFAULT_MAX_BOUND: u64 = 100_000_000;

/// Configuration for a prime cache.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrimeCacheConfig {
    /// Largest bound a query may request. Larger bounds fail with
    /// [`PrimeCacheError::BoundTooLarge`](crate::PrimeCacheError::BoundTooLarge)
    /// before anything is allocated.
    pub max_bound: u64,
    /// Bound to sieve eagerly when the cache is created. `None` starts empty.
    pub initial_bound: Option<u64>,
}

impl PrimeCacheConfig {
    /// Creates a configuration with the given bound limit and no prefill.
    #[must_use]
    pub fn new(max_bound: u64) -> Self {
        Self {
            max_bound,
            initial_bound: None,
        }
    }

    /// Sets the bound the cache is warmed to at creation.
    #[must_use]
    pub fn with_initial_bound(mut self, initial_bound: u64) -> Self {
        self.initial_bound = Some(initial_bound);
        self
    }

    /// Sets the largest bound a query may request.
    #[must_use]
    pub fn with_max_bound(mut self, max_bound: u64) -> Self {
        self.max_bound = max_bound;
        self
    }

    /// Returns the largest bound a query may request.
    #[inline]
    pub fn max_bound(&self) -> u64 {
        self.max_bound
    }

    /// Returns the prefill bound, if any.
    #[inline]
    pub fn initial_bound(&self) -> Option<u64> {
        self.initial_bound
    }
}

impl Default for PrimeCacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BOUND)
    }
}

impl fmt::Debug for PrimeCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimeCacheConfig")
            .field("max_bound", &self.max_bound)
            .field("initial_bound", &self.initial_bound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PrimeCacheConfig::default();
        assert_eq!(config.max_bound(), DEFAULT_MAX_BOUND);
        assert_eq!(config.initial_bound(), None);
    }

    #[test]
    fn test_config_builder() {
        let config = PrimeCacheConfig::new(1_000)
            .with_initial_bound(100)
            .with_max_bound(10_000);
        assert_eq!(config.max_bound(), 10_000);
        assert_eq!(config.initial_bound(), Some(100));
    }
}
