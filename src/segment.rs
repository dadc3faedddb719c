//! Segment extension: sieving the interval just above the cache frontier.
//!
//! Given a complete prefix of the primes ending at `last`, [`extend`] finds
//! exactly the primes in `(last, n]` without re-sieving anything below the
//! frontier.
//!
//! ```text
//!   previous = [2, 3, 5]          n = 29
//!
//!   segment:   6  7  8  9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29
//!   pass 1:    x     x  x  x     x     x  x  x     x     x  x  x     x  x  x  x  x
//!   pass 2:       7           11    13          17    19          23                29
//! ```
//!
//! Pass 1 strikes every value with a known prime factor. Pass 2 walks the
//! segment in increasing order; the first unmarked value is prime because
//! every smaller prime factor is either known or was discovered earlier in
//! the same pass, and each new prime strikes its own multiples from its
//! square onwards.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Returns the primes in `(last(previous), n]`, ascending.
///
/// `previous` must be a complete, ascending prefix of the primes. An empty
/// `previous` behaves as a frontier of `1`, making `extend(n, &[])` equal to
/// [`sieve(n)`](crate::sieve::sieve). Returns an empty vector when `n` does
/// not exceed the frontier.
///
/// # Example
///
/// ```
/// use prime_cache::segment::extend;
///
/// assert_eq!(extend(29, &[2, 3, 5]), vec![7, 11, 13, 17, 19, 23, 29]);
/// assert_eq!(extend(7, &[2, 3, 5]), vec![7]);
/// assert!(extend(6, &[2, 3, 5]).is_empty());
/// ```
pub fn extend(n: u64, previous: &[u64]) -> Vec<u64> {
    let frontier = previous.last().copied().unwrap_or(1);
    if n <= frontier {
        return Vec::new();
    }
    let base = frontier + 1;
    let Ok(width) = usize::try_from(n - frontier) else {
        return Vec::new();
    };
    let mut is_prime = vec![true; width];

    // Pass 1: strike everything divisible by a known prime. Known primes are
    // all below `base`, so the first multiple inside the segment is never the
    // prime itself. Once p² > n, any multiple of p in the segment also has a
    // smaller known factor.
    for &p in previous {
        if p > n / p {
            break;
        }
        let first = base.div_ceil(p) * p;
        if first > n {
            continue;
        }
        let Ok(start) = usize::try_from(first - base) else {
            continue;
        };
        let Ok(step) = usize::try_from(p) else {
            continue;
        };
        for offset in (start..width).step_by(step) {
            is_prime[offset] = false;
        }
    }

    // Pass 2: every survivor is new; strike its multiples from its square.
    let mut discovered = Vec::new();
    for offset in 0..width {
        if !is_prime[offset] {
            continue;
        }
        let p = base + offset as u64;
        discovered.push(p);

        let Some(square) = p.checked_mul(p) else {
            continue;
        };
        if square > n {
            continue;
        }
        let (Ok(start), Ok(step)) = (usize::try_from(square - base), usize::try_from(p)) else {
            continue;
        };
        for multiple in (start..width).step_by(step) {
            is_prime[multiple] = false;
        }
    }

    discovered
}
