//! ## Per-bit granularity
//! Keeps, for each bucket, the number of items routed there and how many of
//! those items had each hash bit set. This is the substrate of singleton detection.
//!
//! Counter layout of one repetition (`B` buckets of `B + 1` counters):
//! - data[b * (B + 1)]         - number of items routed to bucket `b`
//! - data[b * (B + 1) + i]     - number of those items with hash bit `B - i` set, `i` in `[1, B]`
//!
//! Slot `1` thus tracks the most significant bit of the truncated hash and slot `B`
//! the least significant one.

use std::mem::{size_of, size_of_val};

use crate::counters::BucketCounterTrait;

/// Per-bit bucket counters of one repetition
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PerBitCounters {
    /// Bit-domain width `B`
    width: usize,
    /// Counters laid out as described above
    data: Vec<u64>,
}

impl PerBitCounters {
    /// Creates zeroed counters for `width` buckets
    pub(crate) fn new(width: usize) -> Self {
        Self {
            width,
            data: vec![0; (width + 1) * width],
        }
    }

    /// Offset of the first counter of `bucket`
    #[inline]
    fn offset(&self, bucket: usize) -> usize {
        bucket * (self.width + 1)
    }
}

impl BucketCounterTrait for PerBitCounters {
    #[inline]
    fn record(&mut self, bucket: usize, h: u64) {
        let width = self.width;
        let start = self.offset(bucket);
        let slice = &mut self.data[start..start + width + 1];
        slice[0] += 1;

        // walk the set bits only
        let mut bits = h;
        while bits != 0 {
            let bit = bits.trailing_zeros() as usize;
            slice[width - bit] += 1;
            bits &= bits - 1;
        }
    }

    #[inline]
    fn total(&self, bucket: usize) -> u64 {
        self.data[self.offset(bucket)]
    }

    #[inline]
    fn bucket(&self, bucket: usize) -> Option<&[u64]> {
        let start = self.offset(bucket);
        self.data.get(start..start + self.width + 1)
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
