//! Two-level hash sketch (Ganguly et al.) for estimating the number of distinct
//! items of a stream and the union, intersection and difference of two streams.
//!
//! A sketch is defined by the following parameters:
//! - `bitsketchsize` (`B`): bit-domain width per repetition in [1..64] range.
//!   Each hash is truncated to its low `B` bits and routed to the bucket at the
//!   position of its least significant 1-bit.
//! - `sketchsets` (`R`): number of independent hash repetitions.
//! - `epsilon`: target relative error of the set-operation estimators.
//! - `beta`: safety margin used when selecting the decision bucket of the
//!   intersection and difference estimators.
//!
//! # Data-structure design
//!
//! ## First level: bit sketch
//! One `B`-bit vector per repetition records which bucket positions were ever
//! hit. Cardinality is estimated from it with the Flajolet-Martin formula
//! `PHI * 2^avg`, `avg` being the mean position of the lowest unset bit.
//!
//! ## Second level: bucket counters
//! Per repetition and bucket, the number of routed items and (with
//! [`CounterGranularity::PerBit`]) how many of them had each hash bit set.
//! Comparing the counters of two sketches tells whether a bucket holds a single
//! distinct hash value in one, both or none of the streams.
//!
//! ## Memory
//! Bit sketches take `R * 8` bytes. Per-bit counters take `R * (B + 1) * B * 8`
//! bytes and dominate: `B = 64, R = 256` needs about 8.5 MiB. Use
//! [`CounterGranularity::Totals`] (`R * B * 8` bytes) or a narrower `B` when
//! only cardinality and union estimates are needed.
//!
//! ## Concurrency
//! A sketch is not synchronized. Concurrent ingestion uses one sketch per
//! worker combined with [`TwoLevelSketch::merge`]: counters are purely
//! additive and bit sketches monotonic.

use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::mem::{size_of, size_of_val};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::Level;

use crate::config::SketchConfig;
use crate::counters::{BucketCounterTrait, BucketCounters, CounterGranularity};
use crate::error::SketchError;
use crate::hash::{least_sig_1bit, truncate, HashFamily, WyHashFamily};
use crate::logger::{sketch_log, LogFacade, SketchLogger};
use crate::tally::ExactTally;

/// Flajolet-Martin bias correction constant
pub const FLAJOLET_MARTIN_PHI: f64 = 1.2928;

/// Source of process-unique stream ids and instance tokens
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[inline]
fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Union estimate cached for one peer in one state
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct UnionCache {
    /// Instance token of the peer
    pub(crate) peer: u64,
    pub(crate) peer_generation: u64,
    pub(crate) estimate: f64,
}

/// Two-level hash sketch over items of type `T`, hashed with family `F`.
///
/// # Example
/// ```rust
/// use two_level_sketch::TwoLevelSketch;
///
/// let mut left = TwoLevelSketch::<u64>::new(32, 128, 0.2, 1.05, None).unwrap();
/// let mut right = TwoLevelSketch::<u64>::new(32, 128, 0.2, 1.05, None).unwrap();
/// for i in 0..1_000u64 {
///     left.add(&i);
///     right.add(&(i + 500));
/// }
///
/// assert!(left.cardinality() > 0.0);
/// let union = left.estimate_union(&right).unwrap();
/// assert!(union > 0.0);
/// let intersection = left.estimate_intersection(&right).unwrap();
/// assert!(intersection <= union);
/// ```
pub struct TwoLevelSketch<T, F = WyHashFamily>
where
    T: ?Sized + ToOwned,
    F: HashFamily,
{
    /// Stream id
    pub(crate) id: u64,
    /// Process-unique token of this instance, never shared with another sketch
    pub(crate) instance: u64,
    /// Bit-domain width `B`
    pub(crate) bitsketchsize: usize,
    /// Number of repetitions `R`
    pub(crate) sketchsets: usize,
    pub(crate) epsilon: f64,
    pub(crate) beta: f64,
    /// One `B`-bit vector per repetition
    pub(crate) bitsketchset: Vec<u64>,
    /// Bucket counters per repetition
    pub(crate) bitsketchsetcounter: Vec<BucketCounters>,
    /// Bumped on every mutation, lets peers validate their cached union estimates
    pub(crate) generation: u64,
    pub(crate) union_cache: Option<UnionCache>,
    /// Exact oracle, allocated only when enabled
    tally: Option<ExactTally<T::Owned>>,
    pub(crate) family: F,
    pub(crate) logger: Arc<dyn SketchLogger>,
}

impl<T> TwoLevelSketch<T, WyHashFamily>
where
    T: Hash + Eq + ?Sized + ToOwned,
    T::Owned: Hash + Eq,
{
    /// Creates new sketch hashing with the default `wyhash` family.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] when a parameter is out of range.
    pub fn new(
        bitsketchsize: usize,
        sketchsets: usize,
        epsilon: f64,
        beta: f64,
        id: Option<u64>,
    ) -> Result<Self, SketchError> {
        let config = SketchConfig {
            bitsketchsize,
            sketchsets,
            epsilon,
            beta,
            id,
            ..SketchConfig::default()
        };
        Self::with_config(config)
    }

    /// Creates new sketch from `config` hashing with the default `wyhash` family.
    pub fn with_config(config: SketchConfig) -> Result<Self, SketchError> {
        Self::with_config_and_family(config, WyHashFamily::default())
    }
}

impl<T, F> TwoLevelSketch<T, F>
where
    T: Hash + Eq + ?Sized + ToOwned,
    T::Owned: Hash + Eq,
    F: HashFamily,
{
    /// Creates new sketch from `config` hashing with `family`.
    pub fn with_config_and_family(config: SketchConfig, family: F) -> Result<Self, SketchError> {
        config.validate()?;

        let SketchConfig {
            bitsketchsize,
            sketchsets,
            granularity,
            ..
        } = config;

        let counters = BucketCounters::new(granularity, bitsketchsize);
        Ok(Self {
            id: config.id.unwrap_or_else(next_id),
            instance: next_id(),
            bitsketchsize,
            sketchsets,
            epsilon: config.epsilon,
            beta: config.beta,
            bitsketchset: vec![0; sketchsets],
            bitsketchsetcounter: vec![counters; sketchsets],
            generation: 0,
            union_cache: None,
            tally: config.exact_tally.then(ExactTally::new),
            family,
            logger: Arc::new(LogFacade::new(config.log_level)),
        })
    }

    /// Replace the logging collaborator
    pub fn with_logger(mut self, logger: Arc<dyn SketchLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Insert an item into every repetition of the sketch.
    ///
    /// A repetition whose hash falls outside the bit-domain (the truncated hash
    /// is zero) is logged and skipped; the other repetitions are still updated.
    pub fn add(&mut self, item: &T) {
        let width = self.bitsketchsize;
        for r in 0..self.sketchsets {
            let h = truncate(self.family.hash(item, r as u64), width);
            let pos = least_sig_1bit(h, width);
            if pos >= width {
                sketch_log!(
                    self.logger,
                    Level::Error,
                    "sketch {}: bucket {} out of range [0, {}) at repetition {} for hash {:#x}",
                    self.id,
                    pos,
                    width,
                    r,
                    h
                );
                continue;
            }
            self.bitsketchset[r] |= 1 << pos;
            self.bitsketchsetcounter[r].record(pos, h);
        }

        if let Some(tally) = self.tally.as_mut() {
            tally.insert(T::to_owned(item));
        }
        self.touch();
    }

    /// Reset the sketch to the state of a freshly constructed one
    pub fn clear(&mut self) {
        self.bitsketchset.fill(0);
        self.bitsketchsetcounter
            .iter_mut()
            .for_each(|counters| counters.reset());
        if let Some(tally) = self.tally.as_mut() {
            tally.clear();
        }
        self.touch();
    }

    /// Merge `rhs` into `self`: bit sketches are OR-ed and counters summed
    /// repetition by repetition.
    ///
    /// # Errors
    /// Fails without modifying `self` when the sketches differ in `bitsketchsize`,
    /// `sketchsets` or counter granularity.
    pub fn merge(&mut self, rhs: &Self) -> Result<(), SketchError>
    where
        T::Owned: Clone,
    {
        self.check_compatible(rhs)?;
        if self.granularity() != rhs.granularity() {
            return Err(SketchError::GranularityMismatch);
        }

        self.bitsketchset
            .iter_mut()
            .zip(&rhs.bitsketchset)
            .for_each(|(lhs, rhs)| *lhs |= *rhs);
        for (lhs, rhs) in self.bitsketchsetcounter.iter_mut().zip(&rhs.bitsketchsetcounter) {
            lhs.merge(rhs)?;
        }

        if self.tally.is_some() && rhs.tally.is_none() {
            sketch_log!(
                self.logger,
                Level::Warn,
                "sketch {}: dropping exact tally, merged sketch {} keeps none",
                self.id,
                rhs.id
            );
            self.tally = None;
        } else if let (Some(lhs), Some(rhs)) = (self.tally.as_mut(), rhs.tally.as_ref()) {
            lhs.merge(rhs);
        }
        self.touch();
        Ok(())
    }

    /// Return total number of inserted items, when the exact tally is enabled
    pub fn exact_total_items(&self) -> Option<u64> {
        self.tally.as_ref().map(ExactTally::total)
    }

    /// Return exact number of distinct inserted items, when the exact tally is enabled
    pub fn exact_distinct_items(&self) -> Option<usize> {
        self.tally.as_ref().map(ExactTally::distinct)
    }

    /// Relative error of the cardinality estimate against the exact tally:
    /// positive when the estimate exceeds the actual count.
    ///
    /// Returns `None` when the tally is disabled or holds no items.
    pub fn relative_error(&self) -> Option<f64> {
        let distinct = self.exact_distinct_items().filter(|&d| d > 0)? as f64;
        Some((self.cardinality() - distinct) / distinct)
    }
}

impl<T, F> TwoLevelSketch<T, F>
where
    T: ?Sized + ToOwned,
    F: HashFamily,
{
    /// Return Flajolet-Martin cardinality estimate
    pub fn cardinality(&self) -> f64 {
        let width = self.bitsketchsize;
        let total: usize = self
            .bitsketchset
            .iter()
            .map(|&bits| ((!bits).trailing_zeros() as usize).min(width))
            .sum();
        let avg = total as f64 / self.sketchsets as f64;
        FLAJOLET_MARTIN_PHI * avg.exp2()
    }

    /// Same as [`Self::cardinality`]
    #[inline]
    pub fn len(&self) -> f64 {
        self.cardinality()
    }

    /// Return whether no bucket was ever hit
    pub fn is_empty(&self) -> bool {
        self.bitsketchset.iter().all(|&bits| bits == 0)
    }

    /// Record a mutation
    #[inline]
    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.union_cache = None;
    }

    /// Fail fast unless both sketches share resolution and hash repetitions
    pub(crate) fn check_compatible(&self, other: &Self) -> Result<(), SketchError> {
        if self.bitsketchsize != other.bitsketchsize || self.sketchsets != other.sketchsets {
            return Err(SketchError::IncompatibleSketches {
                lhs_bits: self.bitsketchsize,
                lhs_sets: self.sketchsets,
                rhs_bits: other.bitsketchsize,
                rhs_sets: other.sketchsets,
            });
        }
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn bitsketchsize(&self) -> usize {
        self.bitsketchsize
    }

    pub fn sketchsets(&self) -> usize {
        self.sketchsets
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn granularity(&self) -> CounterGranularity {
        self.bitsketchsetcounter
            .first()
            .map_or_else(CounterGranularity::default, BucketCounters::granularity)
    }

    /// Return bit sketch of repetition `r`
    pub fn bitsketch(&self, r: usize) -> Option<u64> {
        self.bitsketchset.get(r).copied()
    }

    /// Return counter slice of `bucket` in repetition `r`, see [`crate::property`].
    pub fn bucket_counters(&self, r: usize, bucket: usize) -> Option<&[u64]> {
        self.bitsketchsetcounter
            .get(r)
            .and_then(|counters| counters.bucket(bucket))
    }

    /// Return the cached union estimate, if one was computed since the last mutation
    pub fn union_estimate(&self) -> Option<f64> {
        self.union_cache.map(|cache| cache.estimate)
    }

    /// Return memory size of the sketch, excluding the exact tally
    pub fn size_of(&self) -> usize {
        size_of::<Self>()
            + size_of_val(self.bitsketchset.as_slice())
            + self
                .bitsketchsetcounter
                .iter()
                .map(BucketCounterTrait::size_of)
                .sum::<usize>()
    }
}

impl<T, F> TwoLevelSketch<T, F>
where
    T: ?Sized + ToOwned,
    T::Owned: Clone,
    F: HashFamily + Clone,
{
    /// Adopt the parameters of `source` and deep-copy all its state.
    ///
    /// `self` keeps its id and logger; later mutations of either sketch do not
    /// affect the other.
    pub fn copy_from(&mut self, source: &Self) {
        self.bitsketchsize = source.bitsketchsize;
        self.sketchsets = source.sketchsets;
        self.epsilon = source.epsilon;
        self.beta = source.beta;
        self.instance = next_id();
        self.bitsketchset.clone_from(&source.bitsketchset);
        self.bitsketchsetcounter.clone_from(&source.bitsketchsetcounter);
        self.tally.clone_from(&source.tally);
        self.family = source.family.clone();
        self.touch();
    }
}

impl<T, F> Clone for TwoLevelSketch<T, F>
where
    T: ?Sized + ToOwned,
    T::Owned: Clone,
    F: HashFamily + Clone,
{
    /// Deep clone. The clone is a distinct stream and receives its own id.
    fn clone(&self) -> Self {
        Self {
            id: next_id(),
            instance: next_id(),
            bitsketchsize: self.bitsketchsize,
            sketchsets: self.sketchsets,
            epsilon: self.epsilon,
            beta: self.beta,
            bitsketchset: self.bitsketchset.clone(),
            bitsketchsetcounter: self.bitsketchsetcounter.clone(),
            generation: 0,
            union_cache: None,
            tally: self.tally.clone(),
            family: self.family.clone(),
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<T, F> Debug for TwoLevelSketch<T, F>
where
    T: ?Sized + ToOwned,
    F: HashFamily,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ granularity: {:?}, bitsketchsize: {}, sketchsets: {}, estimate: {:.2}, size: {} }}",
            self.granularity(),
            self.bitsketchsize,
            self.sketchsets,
            self.cardinality(),
            self.size_of()
        )
    }
}
