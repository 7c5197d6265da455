//! `two-level-sketch` estimates the number of distinct items of a data stream, and the size
//! of the union, intersection and difference of two streams, in sublinear memory.
//!
//! This library implements the two-level hash sketch of Ganguly, Garofalakis and Rastogi:
//! a Flajolet-Martin bit sketch for cardinality plus per-bucket counters that detect
//! buckets holding a single distinct item, which is what set operations are estimated from.
mod config;
mod counters;
mod error;
pub mod hash;
pub mod logger;
mod per_bit;
pub mod property;
mod set_ops;
pub mod sketch;
mod tally;
mod totals;

pub use config::SketchConfig;
pub use counters::CounterGranularity;
pub use error::SketchError;
pub use hash::{HashFamily, SeededHasherFamily, WyHashFamily};
pub use logger::{LogFacade, SketchLogger};
pub use sketch::{TwoLevelSketch, FLAJOLET_MARTIN_PHI};
