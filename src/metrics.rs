//! Prime Cache Metrics
//!
//! Counters describing how queries were answered, reported through the
//! [`CacheMetrics`] trait as a `BTreeMap` so keys always come out in the
//! same order.
//!
//! Every non-degenerate query lands in exactly one of three buckets:
//!
//! | Counter | Meaning |
//! |---------|---------|
//! | `hits` | Answered by truncating the cache, no sieving |
//! | `extensions` | Frontier reached or passed, segment sieved and appended |
//! | `rebuilds` | Below the cached range (or empty cache), full sieve |

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Counters maintained by a prime cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrimeCacheMetrics {
    /// Total number of queries, including degenerate ones.
    pub requests: u64,

    /// Queries with a bound below 2, answered without touching the cache.
    pub degenerate: u64,

    /// Queries answered from the cache without sieving.
    pub hits: u64,

    /// Queries that sieved a segment above the frontier.
    pub extensions: u64,

    /// Queries that replaced the cache with a full sieve.
    pub rebuilds: u64,

    /// Queries rejected for exceeding the bound limit.
    pub rejected: u64,

    /// Primes appended by extensions or produced by rebuilds.
    pub primes_discovered: u64,

    /// Number of primes currently cached.
    pub cached_primes: u64,

    /// Largest cached prime, or 0 when the cache is empty.
    pub frontier: u64,
}

impl PrimeCacheMetrics {
    /// Creates zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_degenerate(&mut self) {
        self.requests += 1;
        self.degenerate += 1;
    }

    pub(crate) fn record_rejected(&mut self) {
        self.requests += 1;
        self.rejected += 1;
    }

    pub(crate) fn record_hit(&mut self) {
        self.requests += 1;
        self.hits += 1;
    }

    pub(crate) fn record_extension(&mut self, discovered: usize) {
        self.requests += 1;
        self.extensions += 1;
        self.primes_discovered += discovered as u64;
    }

    pub(crate) fn record_rebuild(&mut self, discovered: usize) {
        self.requests += 1;
        self.rebuilds += 1;
        self.primes_discovered += discovered as u64;
    }

    /// Records the cache's size and frontier after a mutation.
    pub(crate) fn record_cache_state(&mut self, cached_primes: usize, frontier: Option<u64>) {
        self.cached_primes = cached_primes as u64;
        self.frontier = frontier.unwrap_or(0);
    }

    /// Fraction of non-degenerate, accepted queries answered without sieving.
    ///
    /// # Returns
    /// A value between 0.0 and 1.0, or 0.0 if no such query has been made
    pub fn hit_rate(&self) -> f64 {
        let answered = self.hits + self.extensions + self.rebuilds;
        if answered > 0 {
            self.hits as f64 / answered as f64
        } else {
            0.0
        }
    }

    /// Converts the metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("degenerate".to_string(), self.degenerate as f64);
        metrics.insert("hits".to_string(), self.hits as f64);
        metrics.insert("extensions".to_string(), self.extensions as f64);
        metrics.insert("rebuilds".to_string(), self.rebuilds as f64);
        metrics.insert("rejected".to_string(), self.rejected as f64);
        metrics.insert("hit_rate".to_string(), self.hit_rate());

        metrics.insert(
            "primes_discovered".to_string(),
            self.primes_discovered as f64,
        );
        metrics.insert("cached_primes".to_string(), self.cached_primes as f64);
        metrics.insert("frontier".to_string(), self.frontier as f64);

        metrics
    }
}

/// Uniform metrics reporting for cache implementations.
///
/// Uses BTreeMap to ensure deterministic ordering of metrics, which keeps
/// logs and test assertions stable.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Name identifying the cache implementation.
    fn algorithm_name(&self) -> &'static str;
}

impl CacheMetrics for PrimeCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "IncrementalSieve"
    }
}
