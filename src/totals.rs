//! ## Totals granularity
//! Keeps only the number of items ever routed to each bucket.
//!
//! Counter layout of one repetition:
//! - data[b]       - number of items routed to bucket `b`, for `b` in `[0, B)`

use std::mem::{size_of, size_of_val};

use crate::counters::BucketCounterTrait;

/// Bucket totals of one repetition
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TotalCounters {
    data: Vec<u64>,
}

impl TotalCounters {
    /// Creates zeroed totals for `width` buckets
    pub(crate) fn new(width: usize) -> Self {
        Self {
            data: vec![0; width],
        }
    }
}

impl BucketCounterTrait for TotalCounters {
    #[inline]
    fn record(&mut self, bucket: usize, _h: u64) {
        self.data[bucket] += 1;
    }

    #[inline]
    fn total(&self, bucket: usize) -> u64 {
        self.data[bucket]
    }

    #[inline]
    fn bucket(&self, _bucket: usize) -> Option<&[u64]> {
        None
    }

    fn reset(&mut self) {
        self.data.fill(0);
    }

    fn counters(&self) -> &[u64] {
        &self.data
    }

    fn counters_mut(&mut self) -> &mut [u64] {
        &mut self.data
    }

    fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(self.data.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_ignore_hash_bits() {
        let mut totals = TotalCounters::new(4);
        totals.record(1, 0b0010);
        totals.record(1, 0b1110);
        assert_eq!(totals.total(1), 2);
        assert_eq!(totals.bucket(1), None);
        assert_eq!(totals.counters(), &[0, 2, 0, 0]);
    }
}
