//! Concurrent Prime Cache
//!
//! A thread-safe handle around [`PrimeCache`]. This is the multi-threaded
//! counterpart callers share between worker threads.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   ConcurrentPrimeCache                       │
//! │                                                              │
//! │   query(n) ──▶ ┌─────────┐    ┌──────────────────────────┐   │
//! │   query(m) ──▶ │  Mutex  │──▶ │ PrimeCache               │   │
//! │   query(k) ──▶ └─────────┘    │  floor search            │   │
//! │                               │  rebuild / extend / hit  │   │
//! │                               │  snapshot copy           │   │
//! │                               └──────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Lock, Not Segments
//!
//! Unlike a key-value cache, the prime cache has no independent keys to
//! shard: every query reads the same prefix, and an extension appends to
//! its end. The whole read-decide-mutate-copy sequence therefore runs under
//! a single `parking_lot::Mutex`:
//!
//! 1. No caller ever sees a half-extended cache.
//! 2. Two callers racing past the frontier cannot both append the same segment.
//! 3. Only one lock exists and it is never taken re-entrantly, so there is no
//!    lock ordering to get wrong.
//!
//! The cost is that a large sieve blocks every other query until it finishes.
//!
//! # Example
//!
//! ```rust
//! use prime_cache::ConcurrentPrimeCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ConcurrentPrimeCache::new());
//!
//! let handles: Vec<_> = [10, 100, 1_000, 50]
//!     .into_iter()
//!     .map(|n| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || cache.query(n).unwrap().len())
//!     })
//!     .collect();
//!
//! let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
//! assert_eq!(counts, vec![4, 25, 168, 15]);
//! ```

extern crate alloc;

use crate::cache::PrimeCache;
use crate::config::PrimeCacheConfig;
use crate::error::PrimeCacheResult;
use crate::metrics::{CacheMetrics, PrimeCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use parking_lot::Mutex;

/// A thread-safe incremental prime cache.
///
/// Every operation locks the whole cache; results are owned copies, so a
/// caller's result never changes after the call returns.
pub struct ConcurrentPrimeCache {
    inner: Mutex<PrimeCache>,
}

impl ConcurrentPrimeCache {
    /// Creates an empty cache with the default configuration.
    pub fn new() -> Self {
        Self::from_cache(PrimeCache::new())
    }

    /// Creates a cache from a configuration, prefilling it when
    /// `config.initial_bound` is set.
    ///
    /// # Errors
    ///
    /// Returns [`PrimeCacheError::BoundTooLarge`](crate::PrimeCacheError::BoundTooLarge)
    /// when the initial bound exceeds `config.max_bound`.
    pub fn init(config: PrimeCacheConfig) -> PrimeCacheResult<Self> {
        PrimeCache::init(config).map(Self::from_cache)
    }

    /// Wraps an existing single-threaded cache.
    pub fn from_cache(cache: PrimeCache) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Returns every prime `<= n`, ascending. See [`PrimeCache::query`].
    ///
    /// # Errors
    ///
    /// Same as [`PrimeCache::query`].
    pub fn query(&self, n: i64) -> PrimeCacheResult<Vec<u64>> {
        self.inner.lock().query(n)
    }

    /// Runs `f` over the primes `<= n` while holding the lock.
    ///
    /// More efficient than [`query`](Self::query) when the caller only reads
    /// the result. Every other query waits until `f` returns.
    ///
    /// # Errors
    ///
    /// Same as [`PrimeCache::query`].
    pub fn query_with<F, R>(&self, n: i64, f: F) -> PrimeCacheResult<R>
    where
        F: FnOnce(&[u64]) -> R,
    {
        self.inner.lock().query_with(n, f)
    }

    /// Returns the primes `p` with `lo <= p <= hi`. See
    /// [`PrimeCache::primes_between`].
    ///
    /// # Errors
    ///
    /// Same as [`PrimeCache::query`].
    pub fn primes_between(&self, lo: i64, hi: i64) -> PrimeCacheResult<Vec<u64>> {
        self.inner.lock().primes_between(lo, hi)
    }

    /// Makes sure every prime `<= bound` is cached.
    ///
    /// # Errors
    ///
    /// Same as [`PrimeCache::prefill`].
    pub fn prefill(&self, bound: u64) -> PrimeCacheResult<()> {
        self.inner.lock().prefill(bound)
    }

    /// Runs `f` over the whole cached sequence without copying it.
    pub fn with_snapshot<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[u64]) -> R,
    {
        self.inner.lock().with_snapshot(f)
    }

    /// Returns a copy of every cached prime.
    pub fn snapshot(&self) -> Vec<u64> {
        self.inner.lock().snapshot()
    }

    /// Verifies the cached sequence is strictly ascending.
    ///
    /// # Errors
    ///
    /// Same as [`PrimeCache::check_invariants`].
    pub fn check_invariants(&self) -> PrimeCacheResult<()> {
        self.inner.lock().check_invariants()
    }

    /// Returns the largest cached prime.
    pub fn frontier(&self) -> Option<u64> {
        self.inner.lock().frontier()
    }

    /// Returns the number of cached primes.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drops every cached prime.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Returns the configuration the cache was created with.
    pub fn config(&self) -> PrimeCacheConfig {
        *self.inner.lock().config()
    }

    /// Returns a copy of the raw metrics counters.
    pub fn prime_metrics(&self) -> PrimeCacheMetrics {
        self.inner.lock().prime_metrics().clone()
    }
}

impl Default for ConcurrentPrimeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheMetrics for ConcurrentPrimeCache {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentIncrementalSieve"
    }
}

impl core::fmt::Debug for ConcurrentPrimeCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentPrimeCache")
            .field("inner", &*self.inner.lock())
            .finish()
    }
}
