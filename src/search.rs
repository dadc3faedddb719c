//! Floor search over the ascending prime cache.
//!
//! The controller uses [`floor_search`] to classify a query bound against the
//! cached range:
//!
//! ```text
//!   cache:   [ 2, 3, 5, 7, 11, 13 ]
//!              0  1  2  3   4   5
//!
//!   target 1   -> None        (below the cached range)
//!   target 8   -> Some(3)     (inside: rightmost value <= 8 is 7)
//!   target 13  -> Some(5)     (exactly on the frontier)
//!   target 40  -> Some(5)     (beyond the frontier, still the last index)
//! ```
//!
//! Returning the last index for both "on" and "beyond" the frontier is the
//! contract the controller relies on: it compares the index with the last
//! index and extends the cache when they are equal.

/// Returns the index of the rightmost element of `cache` that is `<= target`.
///
/// Returns `None` when `cache` is empty or `target` is below its first
/// element. `cache` must be strictly ascending.
///
/// # Example
///
/// ```
/// use prime_cache::search::floor_search;
///
/// assert_eq!(floor_search(5, &[2, 5]), Some(1));
/// assert_eq!(floor_search(1, &[2, 3, 5]), None);
/// assert_eq!(floor_search(6, &[2, 3, 5]), Some(2));
/// ```
pub fn floor_search(target: u64, cache: &[u64]) -> Option<usize> {
    let (&first, &last) = (cache.first()?, cache.last()?);
    if target < first {
        return None;
    }
    let last_index = cache.len() - 1;
    if target >= last {
        return Some(last_index);
    }

    // Invariant: cache[lo] <= target < cache[hi].
    let mut lo = 0;
    let mut hi = last_index;
    while hi - lo > 1 {
        // Upper-biased midpoint: with two candidates left it probes `hi - 1`
        // rather than `lo`, so the interval always shrinks.
        let mid = lo + (hi - lo + 1) / 2;
        if cache[mid] <= target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cache() {
        assert_eq!(floor_search(0, &[]), None);
        assert_eq!(floor_search(100, &[]), None);
    }

    #[test]
    fn test_single_element() {
        assert_eq!(floor_search(1, &[2]), None);
        assert_eq!(floor_search(2, &[2]), Some(0));
        assert_eq!(floor_search(3, &[2]), Some(0));
    }

    #[test]
    fn test_known_cases() {
        assert_eq!(floor_search(5, &[2, 5]), Some(1));
        assert_eq!(floor_search(1, &[2, 3, 5]), None);
        assert_eq!(floor_search(2, &[2, 3, 5]), Some(0));
        assert_eq!(floor_search(4, &[2, 3, 5]), Some(1));
        assert_eq!(floor_search(4, &[2, 5]), Some(0));
        assert_eq!(floor_search(3, &[2, 3, 5]), Some(1));
        assert_eq!(floor_search(6, &[2, 3, 5]), Some(2));
        assert_eq!(floor_search(5, &[2, 3, 5, 7]), Some(2));
    }

    #[test]
    fn test_matches_partition_point() {
        let cache = [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];
        for target in 0..50 {
            let expected = cache.partition_point(|&p| p <= target).checked_sub(1);
            assert_eq!(floor_search(target, &cache), expected, "target {target}");
        }
    }
}
