//! Incremental Prime Cache
//!
//! The controller that owns the cached prime sequence and decides, per query,
//! whether to answer from the cache, extend it, or rebuild it.
//!
//! # Algorithm
//!
//! The cache always holds a complete prefix of the primes: if its last
//! element is `V`, it holds every prime `<= V`. A query for bound `n` is
//! classified with [`floor_search`] against that prefix:
//!
//! ```text
//!                       cache: [ 2, 3, 5, 7, 11, 13 ]
//!                                ▲              ▲
//!                              first         frontier
//!
//!   n < 2                ─▶ empty result, cache untouched
//!   n < first (or empty) ─▶ rebuild:  cache = sieve(n)
//!   first <= n < 13      ─▶ hit:      copy of cache[..=floor(n)]
//!   n >= 13              ─▶ extend:   cache += extend(n, cache)
//! ```
//!
//! A hit costs a binary search and a copy. An extension only sieves the
//! segment `(frontier, n]`, using the cached primes to strike composites.
//!
//! # Performance Characteristics
//!
//! | Branch | Time | Extra Space |
//! |--------|------|-------------|
//! | Hit | O(log k + r) | O(r) |
//! | Extend | O((n − f) log log n + π(√n) + k) | O(n − f) |
//! | Rebuild | O(n log log n) | O(n) |
//!
//! where `k` is the cache length, `r` the result length and `f` the frontier.
//!
//! Every slice handed back to a caller is first checked to be strictly
//! ascending, at the same cost as copying it. A corrupted cache surfaces as
//! [`PrimeCacheError::NotAscending`] instead of a wrong prime list.
//!
//! # Thread Safety
//!
//! `PrimeCache` is not thread-safe: every query takes `&mut self`. Share one
//! cache between threads with [`ConcurrentPrimeCache`](crate::ConcurrentPrimeCache).

extern crate alloc;

use crate::config::PrimeCacheConfig;
use crate::error::{PrimeCacheError, PrimeCacheResult};
use crate::metrics::{CacheMetrics, PrimeCacheMetrics};
use crate::search::floor_search;
use crate::segment::extend;
use crate::sieve::sieve;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use tracing::{debug, error};

/// A cache of the primes up to the largest bound queried so far.
///
/// # Example
///
/// ```
/// use prime_cache::PrimeCache;
///
/// let mut cache = PrimeCache::new();
/// assert_eq!(cache.query(5).unwrap(), vec![2, 3, 5]);
///
/// // Extends the cache with the primes in (5, 30].
/// assert_eq!(cache.query(30).unwrap().len(), 10);
///
/// // Answered from the cache.
/// assert_eq!(cache.query(12).unwrap(), vec![2, 3, 5, 7, 11]);
/// ```
pub struct PrimeCache {
    config: PrimeCacheConfig,
    primes: Vec<u64>,
    metrics: PrimeCacheMetrics,
}

impl PrimeCache {
    /// Creates an empty cache with the default configuration.
    pub fn new() -> Self {
        Self {
            config: PrimeCacheConfig::default(),
            primes: Vec::new(),
            metrics: PrimeCacheMetrics::new(),
        }
    }

    /// Creates a cache from a configuration, sieving up to
    /// `config.initial_bound` when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`PrimeCacheError::BoundTooLarge`] when the initial bound
    /// exceeds `config.max_bound`.
    pub fn init(config: PrimeCacheConfig) -> PrimeCacheResult<Self> {
        let mut cache = Self {
            config,
            primes: Vec::new(),
            metrics: PrimeCacheMetrics::new(),
        };
        if let Some(bound) = config.initial_bound {
            cache.prefill(bound)?;
        }
        Ok(cache)
    }

    /// Makes sure every prime `<= bound` is cached.
    ///
    /// # Errors
    ///
    /// Returns [`PrimeCacheError::BoundTooLarge`] when `bound` exceeds the
    /// configured limit.
    pub fn prefill(&mut self, bound: u64) -> PrimeCacheResult<()> {
        let bound = i64::try_from(bound).unwrap_or(i64::MAX);
        self.query_with(bound, |_| ())
    }

    /// Returns every prime `<= n`, ascending.
    ///
    /// Bounds below 2 return an empty vector and leave the cache untouched.
    ///
    /// # Errors
    ///
    /// - [`PrimeCacheError::BoundTooLarge`] when `n` exceeds the configured limit.
    /// - [`PrimeCacheError::InvariantViolation`] when the cache is corrupted.
    pub fn query(&mut self, n: i64) -> PrimeCacheResult<Vec<u64>> {
        self.query_with(n, <[u64]>::to_vec)
    }

    /// Returns the primes `p` with `lo <= p <= hi`, ascending.
    ///
    /// The cache is brought up to `hi` exactly as [`query`](Self::query)
    /// would.
    ///
    /// # Errors
    ///
    /// Same as [`query`](Self::query).
    pub fn primes_between(&mut self, lo: i64, hi: i64) -> PrimeCacheResult<Vec<u64>> {
        if hi < lo {
            return Ok(Vec::new());
        }
        let lo = lo.max(0).unsigned_abs();
        self.query_with(hi, |primes| {
            let start = primes.partition_point(|&p| p < lo);
            primes[start..].to_vec()
        })
    }

    /// Answers a query by passing the primes `<= n` to `f`.
    ///
    /// Avoids the copy made by [`query`](Self::query) when the caller only
    /// needs to read the result.
    ///
    /// # Errors
    ///
    /// Same as [`query`](Self::query).
    pub fn query_with<F, R>(&mut self, n: i64, f: F) -> PrimeCacheResult<R>
    where
        F: FnOnce(&[u64]) -> R,
    {
        if n < 2 {
            debug!(n, "degenerate bound");
            self.metrics.record_degenerate();
            return Ok(f(&[]));
        }
        let bound = n.unsigned_abs();
        if bound > self.config.max_bound {
            debug!(bound, limit = self.config.max_bound, "bound rejected");
            self.metrics.record_rejected();
            return Err(PrimeCacheError::BoundTooLarge {
                requested: bound,
                limit: self.config.max_bound,
            });
        }

        let Some(index) = floor_search(bound, &self.primes) else {
            debug!(bound, cached = self.primes.len(), "rebuilding cache");
            self.primes = sieve(n);
            self.metrics.record_rebuild(self.primes.len());
            self.after_mutation();
            strictly_ascending(&self.primes)?;
            return Ok(f(&self.primes));
        };

        let last = self.primes.len() - 1;
        match classify(index, last)? {
            Ordering::Less => {
                let primes = &self.primes[..=index];
                strictly_ascending(primes)?;
                debug!(bound, index, "answered from cache");
                self.metrics.record_hit();
                Ok(f(primes))
            }
            _ => {
                // Extending a broken prefix would bury the damage under new primes.
                strictly_ascending(&self.primes)?;
                let discovered = extend(bound, &self.primes);
                debug!(
                    bound,
                    frontier = self.primes[last],
                    discovered = discovered.len(),
                    "extending cache"
                );
                self.metrics.record_extension(discovered.len());
                self.primes.extend_from_slice(&discovered);
                self.after_mutation();
                Ok(f(&self.primes))
            }
        }
    }

    /// Verifies that the cache is strictly ascending.
    ///
    /// # Errors
    ///
    /// Returns [`PrimeCacheError::NotAscending`] at the first out-of-order
    /// element.
    pub fn check_invariants(&self) -> PrimeCacheResult<()> {
        strictly_ascending(&self.primes)
    }

    /// Runs `f` over the whole cached sequence without copying it.
    pub fn with_snapshot<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[u64]) -> R,
    {
        f(&self.primes)
    }

    /// Returns a copy of every cached prime.
    pub fn snapshot(&self) -> Vec<u64> {
        self.primes.clone()
    }

    /// Returns the largest cached prime.
    #[inline]
    pub fn frontier(&self) -> Option<u64> {
        self.primes.last().copied()
    }

    /// Returns the number of cached primes.
    #[inline]
    pub fn len(&self) -> usize {
        self.primes.len()
    }

    /// Returns `true` if nothing has been cached yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// Drops every cached prime. Metrics counters are kept.
    pub fn clear(&mut self) {
        self.primes = Vec::new();
        self.after_mutation();
    }

    /// Returns the configuration this cache was created with.
    #[inline]
    pub fn config(&self) -> &PrimeCacheConfig {
        &self.config
    }

    /// Returns the raw metrics counters.
    #[inline]
    pub fn prime_metrics(&self) -> &PrimeCacheMetrics {
        &self.metrics
    }

    fn after_mutation(&mut self) {
        self.metrics
            .record_cache_state(self.primes.len(), self.frontier());
    }

    #[cfg(test)]
    pub(crate) fn corrupt_for_test(&mut self, primes: Vec<u64>) {
        self.primes = primes;
    }
}

/// Relates a floor-search index to the cache's last index.
///
/// `Less` is a hit and `Equal` an extension. An index past the end means
/// floor search or the cache is broken.
fn classify(index: usize, last: usize) -> PrimeCacheResult<Ordering> {
    match index.cmp(&last) {
        Ordering::Greater => {
            error!(index, last, "floor search ran past the cache");
            Err(PrimeCacheError::InvariantViolation { index, last })
        }
        ordering => Ok(ordering),
    }
}

/// Fails with [`PrimeCacheError::NotAscending`] at the first element that
/// does not exceed its predecessor.
fn strictly_ascending(primes: &[u64]) -> PrimeCacheResult<()> {
    match primes.windows(2).position(|pair| pair[0] >= pair[1]) {
        Some(at) => {
            let (previous, next) = (primes[at], primes[at + 1]);
            error!(index = at + 1, previous, next, "cache is not strictly ascending");
            Err(PrimeCacheError::NotAscending {
                index: at + 1,
                previous,
                next,
            })
        }
        None => Ok(()),
    }
}

impl Default for PrimeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheMetrics for PrimeCache {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "IncrementalSieve"
    }
}

impl core::fmt::Debug for PrimeCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrimeCache")
            .field("len", &self.primes.len())
            .field("frontier", &self.frontier())
            .field("max_bound", &self.config.max_bound)
            .finish()
    }
}
