//! Point list matching and transform fitting.
//!
//! Finds the polynomial transform that maps list A onto list B without any
//! prior correspondence, using only the geometry of the brightest points.
//!
//! # Pipeline
//!
//! 1. **Triangles** - all triangles among the `nbright` brightest points of
//!    each list, described by similarity invariant side ratios
//! 2. **Seeding** - either the quick matcher, which validates one triangle
//!    pair at a time, or voting over every similar triangle pair
//! 3. **Robust fit** - least squares with iterative sigma clipping
//! 4. **Refit** - every proximity match of the seed transform feeds a final
//!    fit, and the result is checked against the scale and rotation limits

pub mod config;
pub mod error;
pub mod fit;
pub mod list_match;
pub mod quick;
pub mod result;
pub mod session;
pub mod transform;
pub mod triangle;

#[cfg(test)]
mod tests;

use std::time::Instant;

pub use config::{FitConfig, MatchConfig, MatchMethod, RotationConstraint};
pub use error::MatchError;
pub use fit::{FitIteration, FitOutcome, robust_fit};
pub use list_match::{apply_transform, match_lists};
pub use result::{ListMatch, MatchResult, PairIndex};
pub use session::MatchSession;
pub use transform::{Transform, TransformOrder};

use crate::point::Point;

/// Find the transform mapping `a` onto `b`.
///
/// Fails with [`MatchError::InsufficientPoints`] when either list is smaller
/// than the order needs, [`MatchError::NoMatchFound`] when no consistent
/// correspondence exists, and [`MatchError::ConstraintViolation`] when the
/// best transform falls outside the configured scale or rotation.
///
/// Panics on an invalid `config`. Use [`MatchSession`] to match several
/// lists against the same reference.
pub fn find_transform(a: &[Point], b: &[Point], config: &MatchConfig) -> Result<Transform, MatchError> {
    MatchSession::new(a, config.clone())?.find_transform(b)
}

/// Find the transform mapping `a` onto `b` and partition both lists by it.
pub fn register(a: &[Point], b: &[Point], config: &MatchConfig) -> Result<MatchResult, MatchError> {
    let start = Instant::now();
    let result = MatchSession::new(a, config.clone())?.register(b)?;
    Ok(result.with_elapsed(start.elapsed().as_secs_f64() * 1000.0))
}

/// Fit a transform to lists that are already paired index by index.
///
/// Skips triangle matching entirely. `pairs_matched` is set to the number of
/// input pairs. Lists of different lengths cannot be paired and fail with
/// [`MatchError::InsufficientPoints`], counting the shorter list against the
/// longer one.
pub fn recompute_transform(
    a_matched: &[Point],
    b_matched: &[Point],
    order: TransformOrder,
    fit: &FitConfig,
) -> Result<Transform, MatchError> {
    if a_matched.len() != b_matched.len() {
        return Err(MatchError::InsufficientPoints {
            found: a_matched.len().min(b_matched.len()),
            required: a_matched.len().max(b_matched.len()),
        });
    }
    fit.validate();

    let pos_a: Vec<_> = a_matched.iter().map(|p| p.pos).collect();
    let pos_b: Vec<_> = b_matched.iter().map(|p| p.pos).collect();
    let pairs: Vec<PairIndex> = (0..a_matched.len()).map(|i| PairIndex::new(i, i)).collect();

    let outcome = robust_fit(order, &pos_a, &pos_b, &pairs, true, fit)?;
    let mut transform = outcome.transform;
    transform.pairs_matched = pairs.len();

    tracing::debug!(%transform, "recomputed transform");
    Ok(transform)
}
