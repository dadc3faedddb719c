#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## How a Query Is Answered
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          query(n) on the cache                              │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                                                                             │
//! │   n < 2 ? ──Yes──▶ []                                                       │
//! │     │                                                                       │
//! │    No                                                                       │
//! │     ▼                                                                       │
//! │   floor_search(n, cache)                                                    │
//! │     │                                                                       │
//! │     ├── None ───────────────▶ cache = sieve(n)           (rebuild)          │
//! │     ├── Some(i), i < last ──▶ cache[..=i]                (hit)              │
//! │     ├── Some(i), i == last ─▶ cache += extend(n, cache)  (extend)           │
//! │     └── anything else ──────▶ InvariantViolation                            │
//! │                                                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Item | Description |
//! |------|-------------|
//! | [`sieve::sieve`] | Full Sieve of Eratosthenes over `[0, n]` |
//! | [`sieve::is_prime`] | Trial-division primality check |
//! | [`search::floor_search`] | Index of the rightmost cached value `<= target` |
//! | [`segment::extend`] | Primes in `(frontier, n]` given a complete prefix |
//! | [`PrimeCache`] | Single-threaded incremental cache |
//! | [`ConcurrentPrimeCache`] | Thread-safe incremental cache (requires `concurrent`) |
//!
//! ## Code Examples
//!
//! ### One-shot sieve
//!
//! ```rust
//! use prime_cache::sieve::sieve;
//!
//! assert_eq!(sieve(20), vec![2, 3, 5, 7, 11, 13, 17, 19]);
//! ```
//!
//! ### Incremental cache
//!
//! ```rust
//! use prime_cache::config::PrimeCacheConfig;
//! use prime_cache::PrimeCache;
//!
//! let mut cache = PrimeCache::init(PrimeCacheConfig::new(1_000_000)).unwrap();
//! let small = cache.query(5).unwrap();       // sieves [0, 5]
//! let large = cache.query(121).unwrap();     // sieves only (5, 121]
//! assert_eq!(small, vec![2, 3, 5]);
//! assert_eq!(large.last(), Some(&113));
//! ```
//!
//! ## Concurrent Cache
//!
//! The `concurrent` feature (enabled by default) provides
//! [`ConcurrentPrimeCache`], which serializes every query behind one
//! `parking_lot::Mutex`:
//!
//! ```rust,ignore
//! use prime_cache::ConcurrentPrimeCache;
//! use std::sync::Arc;
//!
//! let cache = Arc::new(ConcurrentPrimeCache::new());
//! let cache_clone = Arc::clone(&cache);
//! std::thread::spawn(move || {
//!     cache_clone.query(10_000).unwrap();
//! });
//! ```
//!
//! ## Modules
//!
//! - [`sieve`]: Full sieve and primality helper
//! - [`search`]: Floor search over the ascending cache
//! - [`segment`]: Segmented extension above the cache frontier
//! - [`cache`]: The incremental cache controller
//! - [`config`]: Cache configuration
//! - [`metrics`]: Query metrics
//! - [`error`]: Error types
//! - [`concurrent`]: Thread-safe cache (requires `concurrent` feature)

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

/// Full Sieve of Eratosthenes and trial-division primality check.
pub mod sieve;

/// Floor search over an ascending sequence.
pub mod search;

/// Segmented sieve extension above a known prime frontier.
pub mod segment;

/// Error types.
pub mod error;

/// Cache configuration.
pub mod config;

/// Query metrics.
///
/// Counts how each query was answered and reports them through the
/// [`CacheMetrics`](metrics::CacheMetrics) trait.
pub mod metrics;

/// The incremental prime cache controller.
///
/// Owns the cached prime sequence and decides per query whether to answer
/// from it, extend it, or rebuild it.
pub mod cache;

/// Thread-safe prime cache.
///
/// Wraps [`PrimeCache`] in a single `parking_lot::Mutex` so the whole
/// query runs as one critical section.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use cache::PrimeCache;
pub use config::PrimeCacheConfig;
pub use error::{PrimeCacheError, PrimeCacheResult};
pub use metrics::{CacheMetrics, PrimeCacheMetrics};

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentPrimeCache;
