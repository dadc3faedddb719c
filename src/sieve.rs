//! Full Sieve of Eratosthenes
//!
//! The from-scratch baseline: computes every prime in `[0, n]` with one
//! boolean marker per integer. [`PrimeCache`](crate::PrimeCache) uses it to
//! bootstrap an empty cache and to rebuild the cache when a query falls
//! below everything already known.
//!
//! ```text
//!   index:  0  1  2  3  4  5  6  7  8  9 10 11 12
//!   start:  .  .  P  P  P  P  P  P  P  P  P  P  P
//!   p = 2:              x     x     x     x     x     (from 2² = 4)
//!   p = 3:                          x                 (from 3² = 9)
//!   result:       2  3     5     7          11
//! ```
//!
//! # Performance Characteristics
//!
//! | Operation | Time | Space |
//! |-----------|------|-------|
//! | [`sieve`] | O(n log log n) | O(n) |
//! | [`is_prime`] | O(√n) | O(1) |

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Returns every prime in `[0, n]`, ascending.
///
/// Returns an empty vector for `n < 2`, including negative bounds.
///
/// Striking starts at `p²` for every surviving `p`: each smaller multiple of
/// `p` has a smaller prime factor and was struck already.
///
/// # Example
///
/// ```
/// use prime_cache::sieve::sieve;
///
/// assert_eq!(sieve(20), vec![2, 3, 5, 7, 11, 13, 17, 19]);
/// assert!(sieve(-1).is_empty());
/// ```
pub fn sieve(n: i64) -> Vec<u64> {
    if n < 2 {
        return Vec::new();
    }
    // n >= 2 here, so the conversion can only fail on targets whose
    // address space is smaller than the requested bound.
    let Ok(limit) = usize::try_from(n) else {
        return Vec::new();
    };
    let size = limit + 1;

    let mut is_prime = vec![true; size];
    is_prime[0] = false;
    is_prime[1] = false;

    let mut p = 2;
    while p <= limit / p {
        if is_prime[p] {
            for multiple in (p * p..size).step_by(p) {
                is_prime[multiple] = false;
            }
        }
        p += 1;
    }

    is_prime
        .iter()
        .enumerate()
        .filter_map(|(value, &prime)| prime.then_some(value as u64))
        .collect()
}

/// Trial-division primality check.
///
/// `n` is prime iff `n > 1` and no `d` in `[2, ⌊n/2⌋]` divides it. Divisors
/// above `⌊√n⌋` always pair with one below it, so the loop stops there.
///
/// # Example
///
/// ```
/// use prime_cache::sieve::is_prime;
///
/// assert!(is_prime(999_863));
/// assert!(!is_prime(25));
/// ```
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
