//! Backends that answer `Sieve` requests.
//!
//! Both backends return exactly `sieve(hi)`; they differ only in cost.
//! [`IncrementalSource`] shares one [`ConcurrentPrimeCache`] across every
//! connection, so repeated and growing bounds are cheap. [`OneShotSource`]
//! keeps no state and sieves from scratch for each request.

use crate::config::{Backend, ServerConfig};
use crate::error::ServerResult;
use prime_cache::config::PrimeCacheConfig;
use prime_cache::sieve::sieve;
use prime_cache::{CacheMetrics, ConcurrentPrimeCache, PrimeCacheError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// A shared, thread-safe producer of prime lists.
pub trait PrimeSource: Send + Sync {
    /// All primes `p` with `2 <= p <= hi`, ascending. Empty for `hi < 2`.
    fn compute(&self, hi: i64) -> ServerResult<Vec<u64>>;

    /// Counters describing the work done so far.
    fn stats(&self) -> BTreeMap<String, f64>;

    /// Backend name reported in logs.
    fn name(&self) -> &'static str;
}

/// Answers through the shared incremental cache.
#[derive(Debug)]
pub struct IncrementalSource {
    cache: ConcurrentPrimeCache,
}

impl IncrementalSource {
    /// Serves requests from `cache`, which may already be warm.
    pub fn new(cache: ConcurrentPrimeCache) -> Self {
        Self { cache }
    }
}

impl PrimeSource for IncrementalSource {
    fn compute(&self, hi: i64) -> ServerResult<Vec<u64>> {
        Ok(self.cache.query(hi)?)
    }

    fn stats(&self) -> BTreeMap<String, f64> {
        self.cache.metrics()
    }

    fn name(&self) -> &'static str {
        Backend::Incremental.as_str()
    }
}

/// Runs a full sieve for every request.
#[derive(Debug)]
pub struct OneShotSource {
    max_bound: u64,
    requests: AtomicU64,
    rejected: AtomicU64,
}

impl OneShotSource {
    /// Rejects any request above `max_bound`.
    pub fn new(max_bound: u64) -> Self {
        Self {
            max_bound,
            requests: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }
}

impl PrimeSource for OneShotSource {
    fn compute(&self, hi: i64) -> ServerResult<Vec<u64>> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if hi > 0 && hi.unsigned_abs() > self.max_bound {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(PrimeCacheError::BoundTooLarge {
                requested: hi.unsigned_abs(),
                limit: self.max_bound,
            }
            .into());
        }
        Ok(sieve(hi))
    }

    fn stats(&self) -> BTreeMap<String, f64> {
        let mut stats = BTreeMap::new();
        stats.insert(
            "requests".to_string(),
            self.requests.load(Ordering::Relaxed) as f64,
        );
        stats.insert(
            "rejected".to_string(),
            self.rejected.load(Ordering::Relaxed) as f64,
        );
        stats
    }

    fn name(&self) -> &'static str {
        Backend::OneShot.as_str()
    }
}

/// Build the backend selected by `config`, prefilling the cache if asked.
pub fn build_source(config: &ServerConfig) -> ServerResult<Box<dyn PrimeSource>> {
    match config.backend {
        Backend::Incremental => {
            let mut cache_config = PrimeCacheConfig::new(config.max_bound);
            if let Some(prefill) = config.prefill {
                cache_config = cache_config.with_initial_bound(prefill);
            }
            let cache = ConcurrentPrimeCache::init(cache_config)?;
            if let Some(frontier) = cache.frontier() {
                info!("Prefilled {} primes up to {}", cache.len(), frontier);
            }
            Ok(Box::new(IncrementalSource::new(cache)))
        }
        Backend::OneShot => Ok(Box::new(OneShotSource::new(config.max_bound))),
    }
}
