//! Exact multiset tally used as an oracle when validating estimates.
//!
//! The tally stores every distinct item, so it costs memory linear in the
//! stream's cardinality and is only allocated when enabled at construction.

use std::collections::HashMap;
use std::hash::Hash;

/// Exact count of items and their multiplicities
#[derive(Debug, Clone)]
pub(crate) struct ExactTally<K> {
    total: u64,
    items: HashMap<K, u64>,
}

impl<K: Hash + Eq> ExactTally<K> {
    pub(crate) fn new() -> Self {
        Self {
            total: 0,
            items: HashMap::new(),
        }
    }

    /// Record one occurrence of `item`
    #[inline]
    pub(crate) fn insert(&mut self, item: K) {
        self.total += 1;
        *self.items.entry(item).or_insert(0) += 1;
    }

    /// Total number of recorded occurrences
    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct recorded items
    pub(crate) fn distinct(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn clear(&mut self) {
        self.total = 0;
        self.items.clear();
    }
}

impl<K: Hash + Eq + Clone> ExactTally<K> {
    /// Fold occurrences of `rhs` into `self`
    pub(crate) fn merge(&mut self, rhs: &ExactTally<K>) {
        self.total += rhs.total;
        for (item, count) in &rhs.items {
            *self.items.entry(item.clone()).or_insert(0) += count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally() {
        let mut tally = ExactTally::new();
        for item in ["a", "b", "a", "c"] {
            tally.insert(item.to_string());
        }
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.distinct(), 3);

        let mut other = ExactTally::new();
        other.insert("d".to_string());
        other.insert("a".to_string());
        tally.merge(&other);
        assert_eq!(tally.total(), 6);
        assert_eq!(tally.distinct(), 4);

        tally.clear();
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.distinct(), 0);
    }
}
