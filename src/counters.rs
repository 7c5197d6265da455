use enum_dispatch::enum_dispatch;

use crate::error::SketchError;
use crate::per_bit::PerBitCounters;
use crate::totals::TotalCounters;

/// How much information a sketch keeps per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CounterGranularity {
    /// Bucket totals only: `B` counters per repetition.
    Totals,
    /// Bucket totals plus one counter per hash bit: `(B + 1) * B` counters per repetition.
    #[default]
    PerBit,
}

/// Bucket counters of one repetition, kept at one of the supported granularities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[enum_dispatch]
pub(crate) enum BucketCounters {
    Totals(TotalCounters),
    PerBit(PerBitCounters),
}

/// Operations every counter granularity must provide.
#[enum_dispatch(BucketCounters)]
pub(crate) trait BucketCounterTrait {
    /// Account one item whose truncated hash `h` was routed to `bucket`.
    fn record(&mut self, bucket: usize, h: u64);
    /// Number of items ever routed to `bucket`.
    fn total(&self, bucket: usize) -> u64;
    /// Counter slice of `bucket` (total at 0, per-bit counters at `1..=B`),
    /// available only when per-bit counters are kept.
    fn bucket(&self, bucket: usize) -> Option<&[u64]>;
    /// Reset every counter to zero.
    fn reset(&mut self);
    /// Raw counters.
    fn counters(&self) -> &[u64];
    /// Mutable raw counters.
    fn counters_mut(&mut self) -> &mut [u64];
    /// Return memory size of the counters
    fn size_of(&self) -> usize;
}

impl BucketCounters {
    /// Creates zeroed counters for a bit-domain of `width` buckets.
    pub(crate) fn new(granularity: CounterGranularity, width: usize) -> Self {
        match granularity {
            CounterGranularity::Totals => BucketCounters::Totals(TotalCounters::new(width)),
            CounterGranularity::PerBit => BucketCounters::PerBit(PerBitCounters::new(width)),
        }
    }

    /// Return granularity of the counters
    pub(crate) fn granularity(&self) -> CounterGranularity {
        match self {
            BucketCounters::Totals(_) => CounterGranularity::Totals,
            BucketCounters::PerBit(_) => CounterGranularity::PerBit,
        }
    }

    /// Return whether no item was ever routed to `bucket`.
    #[inline]
    pub(crate) fn is_empty(&self, bucket: usize) -> bool {
        self.total(bucket) == 0
    }

    /// Add `rhs` counters elementwise into `self`.
    pub(crate) fn merge(&mut self, rhs: &BucketCounters) -> Result<(), SketchError> {
        if self.granularity() != rhs.granularity() {
            return Err(SketchError::GranularityMismatch);
        }
        self.counters_mut()
            .iter_mut()
            .zip(rhs.counters())
            .for_each(|(lhs, rhs)| *lhs += *rhs);
        Ok(())
    }
}
