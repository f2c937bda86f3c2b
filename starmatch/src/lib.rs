//! Triangle based point pattern matching for star lists.
//!
//! Given two lists of points (typically stars detected in two images, or an
//! image and a catalogue), find the polynomial transform that maps the first
//! onto the second and the resulting one-to-one correspondence.
//!
//! ```ignore
//! use starmatch::{MatchConfig, register};
//!
//! let result = register(&reference, &target, &MatchConfig::default())?;
//! println!("{} ({} matched)", result.transform, result.lists.num_matched());
//! ```

pub mod math;
pub mod matching;
pub mod point;

#[cfg(test)]
pub mod testing;

pub use matching::{
    FitConfig, FitIteration, FitOutcome, ListMatch, MatchConfig, MatchError, MatchMethod,
    MatchResult, MatchSession, PairIndex, RotationConstraint, Transform, TransformOrder,
    apply_transform, find_transform, match_lists, recompute_transform, register, robust_fit,
};
pub use point::Point;
