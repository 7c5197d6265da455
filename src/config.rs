use log::LevelFilter;

use crate::counters::CounterGranularity;
use crate::error::SketchError;

/// Default bit-domain width per repetition
pub const DEFAULT_BITSKETCHSIZE: usize = 64;
/// Default number of hash repetitions
pub const DEFAULT_SKETCHSETS: usize = 256;
/// Default target relative error
pub const DEFAULT_EPSILON: f64 = 0.20;
/// Default safety margin for decision-index selection
pub const DEFAULT_BETA: f64 = 1.05;

/// Construction parameters of a [`TwoLevelSketch`](crate::TwoLevelSketch).
///
/// # Example
/// ```rust
/// use two_level_sketch::{CounterGranularity, SketchConfig, TwoLevelSketch};
///
/// let config = SketchConfig::new()
///     .with_bitsketchsize(32)
///     .with_sketchsets(64)
///     .with_granularity(CounterGranularity::PerBit)
///     .with_exact_tally(true);
/// let mut sketch = TwoLevelSketch::<str>::with_config(config).unwrap();
/// sketch.add("hello");
/// assert_eq!(sketch.exact_distinct_items(), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SketchConfig {
    /// Bit-domain width `B` in `[1, 64]`
    pub bitsketchsize: usize,
    /// Number of hash repetitions `R`
    pub sketchsets: usize,
    /// Target relative error in `(0, 1)`
    pub epsilon: f64,
    /// Safety margin used when selecting the decision index, `> 0`
    pub beta: f64,
    /// Stream id; a process-unique id is allocated when absent
    pub id: Option<u64>,
    /// Bucket counter granularity
    pub granularity: CounterGranularity,
    /// Keep an exact tally of inserted items (linear memory, for validation only)
    pub exact_tally: bool,
    /// Maximum level of records emitted through the default logger
    pub log_level: LevelFilter,
}

impl SketchConfig {
    pub fn new() -> Self {
        Self {
            bitsketchsize: DEFAULT_BITSKETCHSIZE,
            sketchsets: DEFAULT_SKETCHSETS,
            epsilon: DEFAULT_EPSILON,
            beta: DEFAULT_BETA,
            id: None,
            granularity: CounterGranularity::default(),
            exact_tally: false,
            log_level: LevelFilter::Error,
        }
    }

    pub fn with_bitsketchsize(mut self, bitsketchsize: usize) -> Self {
        self.bitsketchsize = bitsketchsize;
        self
    }

    pub fn with_sketchsets(mut self, sketchsets: usize) -> Self {
        self.sketchsets = sketchsets;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_granularity(mut self, granularity: CounterGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_exact_tally(mut self, exact_tally: bool) -> Self {
        self.exact_tally = exact_tally;
        self
    }

    pub fn with_log_level(mut self, log_level: LevelFilter) -> Self {
        self.log_level = log_level;
        self
    }

    /// Check that every parameter is within its valid range.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] naming the first offending parameter.
    pub fn validate(&self) -> Result<(), SketchError> {
        if !(1..=64).contains(&self.bitsketchsize) {
            return Err(SketchError::InvalidParameter(
                "bitsketchsize must be in [1, 64]",
            ));
        }
        if self.sketchsets == 0 {
            return Err(SketchError::InvalidParameter(
                "sketchsets must be greater than zero",
            ));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(SketchError::InvalidParameter("epsilon must be in (0, 1)"));
        }
        if !(self.beta > 0.0 && self.beta.is_finite()) {
            return Err(SketchError::InvalidParameter(
                "beta must be a positive finite number",
            ));
        }
        Ok(())
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults_are_valid() {
        let config = SketchConfig::default();
        assert_eq!(config.bitsketchsize, 64);
        assert_eq!(config.sketchsets, 256);
        assert_eq!(config.granularity, CounterGranularity::PerBit);
        assert!(!config.exact_tally);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test_case(SketchConfig::new().with_bitsketchsize(0); "zero width")]
    #[test_case(SketchConfig::new().with_bitsketchsize(65); "too wide")]
    #[test_case(SketchConfig::new().with_sketchsets(0); "no repetitions")]
    #[test_case(SketchConfig::new().with_epsilon(0.0); "zero epsilon")]
    #[test_case(SketchConfig::new().with_epsilon(1.0); "epsilon of one")]
    #[test_case(SketchConfig::new().with_epsilon(f64::NAN); "nan epsilon")]
    #[test_case(SketchConfig::new().with_beta(0.0); "zero beta")]
    #[test_case(SketchConfig::new().with_beta(f64::INFINITY); "infinite beta")]
    fn test_invalid_config(config: SketchConfig) {
        assert!(matches!(
            config.validate(),
            Err(SketchError::InvalidParameter(_))
        ));
    }

    #[test_case(1)]
    #[test_case(8)]
    #[test_case(32)]
    #[test_case(64)]
    fn test_valid_widths(bitsketchsize: usize) {
        let config = SketchConfig::new().with_bitsketchsize(bitsketchsize);
        assert_eq!(config.validate(), Ok(()));
    }
}
