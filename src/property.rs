//! Properties of a bucket of a continuously updated stream.
//!
//! Every predicate takes the counter slice of one bucket in one repetition:
//! `counters[0]` is the number of items routed to the bucket and
//! `counters[i]`, `i` in `[1, B]`, the number of those items with the `i`-th
//! hash bit set. Predicates are pure and never mutate the sketch.
//!
//! Counters accumulate raw insertions, not distinct items. Re-inserting an item
//! grows every counter it touches in lockstep with the bucket total, so a bucket
//! routed one distinct hash value any number of times stays a singleton.

/// Return whether no item was ever routed to the bucket.
#[inline]
pub fn empty(counters: &[u64]) -> bool {
    counters.first().map_or(true, |&total| total == 0)
}

/// Return whether the bucket is consistent with exactly one distinct hash value:
/// it is not empty and every per-bit counter is either zero or equal to the total.
pub fn singleton(counters: &[u64]) -> bool {
    match counters.split_first() {
        Some((&total, bits)) if total > 0 => bits.iter().all(|&c| c == 0 || c == total),
        _ => false,
    }
}

/// Return whether both buckets are singletons routed the same hash value.
pub fn identical_singleton(lhs: &[u64], rhs: &[u64]) -> bool {
    if lhs.len() != rhs.len() || !singleton(lhs) || !singleton(rhs) {
        return false;
    }
    lhs[1..]
        .iter()
        .zip(&rhs[1..])
        .all(|(&l, &r)| (l > 0) == (r > 0))
}

/// Return whether the union of both buckets holds at most one distinct hash value.
///
/// Holds vacuously when both buckets are empty.
pub fn singleton_union(lhs: &[u64], rhs: &[u64]) -> bool {
    match (empty(lhs), empty(rhs)) {
        (true, true) => true,
        (false, true) => singleton(lhs),
        (true, false) => singleton(rhs),
        (false, false) => identical_singleton(lhs, rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const EMPTY: [u64; 5] = [0, 0, 0, 0, 0];
    const ONE: [u64; 5] = [1, 1, 0, 0, 1];
    const ONE_TWICE: [u64; 5] = [2, 2, 0, 0, 2];
    const OTHER: [u64; 5] = [1, 0, 1, 0, 1];
    const MIXED: [u64; 5] = [2, 1, 1, 0, 2];

    #[test_case(&EMPTY => true)]
    #[test_case(&ONE => false)]
    #[test_case(&[] => true; "missing bucket")]
    fn test_empty(counters: &[u64]) -> bool {
        empty(counters)
    }

    #[test_case(&EMPTY => false; "empty bucket")]
    #[test_case(&ONE => true; "one item")]
    #[test_case(&ONE_TWICE => true; "one item inserted twice")]
    #[test_case(&MIXED => false; "two distinct items")]
    #[test_case(&[3, 0, 0, 0, 3] => true; "repeated item with single bit")]
    #[test_case(&[3, 1, 0, 0, 3] => false; "repeated item collides with another")]
    fn test_singleton(counters: &[u64]) -> bool {
        singleton(counters)
    }

    #[test_case(&ONE, &ONE => true; "same item")]
    #[test_case(&ONE, &ONE_TWICE => true; "same item different multiplicity")]
    #[test_case(&ONE, &OTHER => false; "different items")]
    #[test_case(&ONE, &EMPTY => false; "one side empty")]
    #[test_case(&MIXED, &MIXED => false; "not singleton")]
    fn test_identical_singleton(lhs: &[u64], rhs: &[u64]) -> bool {
        identical_singleton(lhs, rhs)
    }

    #[test_case(&EMPTY, &EMPTY => true; "both empty")]
    #[test_case(&ONE, &EMPTY => true; "lhs singleton rhs empty")]
    #[test_case(&EMPTY, &OTHER => true; "lhs empty rhs singleton")]
    #[test_case(&ONE, &ONE_TWICE => true; "identical singletons")]
    #[test_case(&ONE, &OTHER => false; "different singletons")]
    #[test_case(&MIXED, &EMPTY => false; "lhs crowded")]
    #[test_case(&EMPTY, &MIXED => false; "rhs crowded")]
    fn test_singleton_union(lhs: &[u64], rhs: &[u64]) -> bool {
        singleton_union(lhs, rhs)
    }

    #[test]
    fn test_predicates_do_not_depend_on_argument_order() {
        for lhs in [&EMPTY, &ONE, &ONE_TWICE, &OTHER, &MIXED] {
            for rhs in [&EMPTY, &ONE, &ONE_TWICE, &OTHER, &MIXED] {
                assert_eq!(singleton_union(lhs, rhs), singleton_union(rhs, lhs));
                assert_eq!(identical_singleton(lhs, rhs), identical_singleton(rhs, lhs));
            }
        }
    }
}
