//! Error type for matching and fitting.

use thiserror::Error;

use crate::math::SingularMatrix;

/// Recoverable failures of the matcher. A caller either gets a fully
/// validated transform or one of these, never a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// A list, or the set of surviving pairs, is smaller than needed: below
    /// the order minimum, or shorter than its partner list when pre-paired.
    #[error("insufficient points: found {found}, need {required}")]
    InsufficientPoints { found: usize, required: usize },

    /// The normal equations of a fit could not be solved.
    #[error("singular system while fitting transform")]
    SingularSystem,

    /// Every candidate was tried without reaching the acceptance threshold.
    #[error("no match found after {candidates_tried} candidate triangle pairs")]
    NoMatchFound { candidates_tried: usize },

    /// A transform was fitted but falls outside the requested scale or rotation.
    #[error("transform violates constraints: scale {scale:.4}, rotation {rotation_deg:.3}°")]
    ConstraintViolation { scale: f64, rotation_deg: f64 },
}

impl From<SingularMatrix> for MatchError {
    fn from(_: SingularMatrix) -> Self {
        MatchError::SingularSystem
    }
}
