//! Error types for cache queries.
//!
//! Degenerate bounds (`n < 2`) are not errors: they produce an empty result.

use thiserror::Error;

/// Result type alias for prime cache operations.
pub type PrimeCacheResult<T> = Result<T, PrimeCacheError>;

/// Errors returned by [`PrimeCache`](crate::PrimeCache) and
/// [`ConcurrentPrimeCache`](crate::ConcurrentPrimeCache) queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimeCacheError {
    /// The requested bound exceeds the configured
    /// [`max_bound`](crate::config::PrimeCacheConfig::max_bound).
    #[error("bound {requested} exceeds the configured limit of {limit}")]
    BoundTooLarge {
        /// Bound passed by the caller.
        requested: u64,
        /// Configured limit.
        limit: u64,
    },

    /// Floor search returned an index past the end of the cache. The cache
    /// contents can no longer be trusted.
    #[error("cache invariant violated: floor search returned index {index} for a cache whose last index is {last}")]
    InvariantViolation {
        /// Index returned by floor search.
        index: usize,
        /// Last valid index of the cache.
        last: usize,
    },

    /// The cache is no longer strictly ascending.
    #[error("cache invariant violated: {previous} is followed by {next} at index {index}")]
    NotAscending {
        /// Index of the offending element.
        index: usize,
        /// Element before it.
        previous: u64,
        /// The offending element.
        next: u64,
    },
}

impl PrimeCacheError {
    /// Returns `true` for errors caused by corrupted cache state rather than
    /// by the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            PrimeCacheError::InvariantViolation { .. } | PrimeCacheError::NotAscending { .. }
        )
    }
}
