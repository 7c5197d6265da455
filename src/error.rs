use thiserror::Error;

/// Errors returned by sketch construction, set operations and merges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SketchError {
    /// Returned when a constructor receives an invalid argument.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// Returned when two sketches differ in resolution or number of repetitions.
    #[error("incompatible sketches: B {lhs_bits} vs {rhs_bits}, R {lhs_sets} vs {rhs_sets}")]
    IncompatibleSketches {
        lhs_bits: usize,
        lhs_sets: usize,
        rhs_bits: usize,
        rhs_sets: usize,
    },
    /// Returned when merging sketches that keep counters at different granularities.
    #[error("sketches keep bucket counters at different granularities")]
    GranularityMismatch,
    /// Returned when a singleton-based estimator runs on bucket totals only.
    #[error("operation requires per-bit bucket counters")]
    UnsupportedGranularity,
    /// No repetition carried enough information to produce an estimate.
    #[error("no estimate available")]
    NoEstimate,
}
