//! Union, intersection and difference estimators over two sketches built with
//! identical parameters.
//!
//! ## Union
//! Scans bucket indexes upwards and stops at the first index where at most
//! `(1 + epsilon) * R / 8` repetitions have a non-empty bucket in either sketch.
//! A bucket at index `i` receives an item with probability `2^-(i + 1)`, so the
//! occupied fraction `p` at the stopping index is inverted as
//! `log2(1 - p) / log2(1 - 2^-(i + 1))`.
//!
//! ## Intersection and difference
//! Both inspect one decision bucket per repetition, at index
//! `floor(log2(beta * union / (1 - epsilon)))`, where a bucket of the union
//! holds about one distinct item. Repetitions whose union bucket is empty, or
//! holds more than one distinct hash value, carry no information and are
//! skipped. Every other repetition scores 1 when its single item belongs to the
//! queried set, and the estimate is `union * scored / inspected`.

use std::hash::Hash;

use log::Level;

use crate::counters::{BucketCounterTrait, CounterGranularity};
use crate::error::SketchError;
use crate::hash::HashFamily;
use crate::logger::sketch_log;
use crate::property::{empty, singleton, singleton_union};
use crate::sketch::{TwoLevelSketch, UnionCache};

impl<T, F> TwoLevelSketch<T, F>
where
    T: Hash + Eq + ?Sized + ToOwned,
    T::Owned: Hash + Eq,
    F: HashFamily,
{
    /// Estimate `|A ∪ B|` and cache it on `self` for later intersection and
    /// difference estimates against the same, unchanged `other`.
    ///
    /// # Errors
    /// - [`SketchError::IncompatibleSketches`] when parameters differ.
    /// - [`SketchError::NoEstimate`] when every bucket index is occupied in all repetitions.
    pub fn estimate_union(&mut self, other: &Self) -> Result<f64, SketchError> {
        self.check_compatible(other)?;

        let sets = self.sketchsets as f64;
        let threshold = (1.0 + self.epsilon) * sets / 8.0;
        let mut index = 0;
        let mut count = 0;
        for idx in 0..self.bitsketchsize {
            index = idx;
            count = self
                .bitsketchsetcounter
                .iter()
                .zip(&other.bitsketchsetcounter)
                .filter(|(lhs, rhs)| !lhs.is_empty(idx) || !rhs.is_empty(idx))
                .count();
            if count as f64 <= threshold {
                break;
            }
        }

        let p = count as f64 / sets;
        let scale = (index as f64 + 1.0).exp2();
        let estimate = (1.0 - p).log2().abs() / (1.0 - 1.0 / scale).log2().abs();
        sketch_log!(
            self.logger,
            Level::Debug,
            "sketch {} union {}: stop index {}, {} of {} repetitions occupied, estimate {}",
            self.id,
            other.id,
            index,
            count,
            self.sketchsets,
            estimate
        );
        if !estimate.is_finite() {
            return Err(SketchError::NoEstimate);
        }

        self.union_cache = Some(UnionCache {
            peer: other.instance,
            peer_generation: other.generation,
            estimate,
        });
        Ok(estimate)
    }

    /// Estimate `|A ∩ B|`, reusing the cached union estimate against `other`
    /// or computing it first.
    ///
    /// # Errors
    /// - [`SketchError::IncompatibleSketches`] when parameters differ.
    /// - [`SketchError::UnsupportedGranularity`] unless both sketches keep per-bit counters.
    /// - [`SketchError::NoEstimate`] when no repetition could be scored.
    pub fn estimate_intersection(&mut self, other: &Self) -> Result<f64, SketchError> {
        self.check_singleton_support(other)?;
        let union_estimate = match self.cached_union(other) {
            Some(estimate) => estimate,
            None => self.estimate_union(other)?,
        };
        self.score_decision_buckets(other, union_estimate, "intersection", |lhs, rhs| {
            singleton(lhs) && singleton(rhs)
        })
    }

    /// Estimate `|A - B|` using `union_estimate` when supplied, else the cached
    /// union estimate against `other`, else a freshly computed one.
    ///
    /// # Errors
    /// - [`SketchError::InvalidParameter`] when the supplied union estimate is negative
    ///   or not finite.
    /// - [`SketchError::IncompatibleSketches`] when parameters differ.
    /// - [`SketchError::UnsupportedGranularity`] unless both sketches keep per-bit counters.
    /// - [`SketchError::NoEstimate`] when no repetition could be scored.
    pub fn estimate_set_diff(
        &mut self,
        other: &Self,
        union_estimate: Option<f64>,
    ) -> Result<f64, SketchError> {
        if union_estimate.is_some_and(|u| !u.is_finite() || u < 0.0) {
            return Err(SketchError::InvalidParameter(
                "union estimate must be a non-negative finite number",
            ));
        }
        self.check_singleton_support(other)?;
        let union_estimate = match union_estimate.or_else(|| self.cached_union(other)) {
            Some(estimate) => estimate,
            None => self.estimate_union(other)?,
        };
        self.score_decision_buckets(other, union_estimate, "difference", |lhs, rhs| {
            singleton(lhs) && empty(rhs)
        })
    }

    /// Return the cached union estimate if it was computed against `other` in its current state
    fn cached_union(&self, other: &Self) -> Option<f64> {
        self.union_cache
            .filter(|cache| {
                cache.peer == other.instance && cache.peer_generation == other.generation
            })
            .map(|cache| cache.estimate)
    }

    fn check_singleton_support(&self, other: &Self) -> Result<(), SketchError> {
        self.check_compatible(other)?;
        if self.granularity() != CounterGranularity::PerBit
            || other.granularity() != CounterGranularity::PerBit
        {
            return Err(SketchError::UnsupportedGranularity);
        }
        Ok(())
    }

    /// Bucket index at which a union bucket holds about one distinct item
    fn decision_index(&self, union_estimate: f64) -> usize {
        let resolution = (self.beta * union_estimate / (1.0 - self.epsilon))
            .log2()
            .floor();
        (resolution.max(0.0) as usize).min(self.bitsketchsize - 1)
    }

    /// Inspect the decision bucket of every repetition whose union holds a single
    /// distinct hash value and scale the fraction accepted by `score` to `union_estimate`.
    fn score_decision_buckets(
        &self,
        other: &Self,
        union_estimate: f64,
        operation: &str,
        score: impl Fn(&[u64], &[u64]) -> bool,
    ) -> Result<f64, SketchError> {
        let index = self.decision_index(union_estimate);
        let mut scored = 0usize;
        let mut inspected = 0usize;
        for (lhs, rhs) in self
            .bitsketchsetcounter
            .iter()
            .zip(&other.bitsketchsetcounter)
        {
            let (Some(lhs), Some(rhs)) = (lhs.bucket(index), rhs.bucket(index)) else {
                return Err(SketchError::UnsupportedGranularity);
            };
            if (empty(lhs) && empty(rhs)) || !singleton_union(lhs, rhs) {
                continue;
            }
            inspected += 1;
            if score(lhs, rhs) {
                scored += 1;
            }
        }

        sketch_log!(
            self.logger,
            Level::Debug,
            "sketch {} {} {}: decision index {}, {} of {} inspected repetitions scored",
            self.id,
            operation,
            other.id,
            index,
            scored,
            inspected
        );
        if inspected == 0 {
            return Err(SketchError::NoEstimate);
        }
        Ok(union_estimate * (scored as f64 / inspected as f64))
    }
}
