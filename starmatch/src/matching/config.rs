//! Configuration types for matching and fitting.
//!
//! Plain structs with `Default` and a `validate()` that panics on values no
//! caller should ever pass. Data dependent failures are reported through
//! [`MatchError`](crate::MatchError) instead.

use std::time::Duration;

use common::FloatExt;
use serde::{Deserialize, Serialize};

use crate::matching::transform::TransformOrder;

// =============================================================================
// Constraints
// =============================================================================

/// Expected rotation from list A to list B, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationConstraint {
    pub angle_deg: f64,
    pub tolerance_deg: f64,
}

impl RotationConstraint {
    /// Whether `rotation_deg` lies within tolerance of the expected angle.
    ///
    /// Angles are circular, so 359° and -1° are the same rotation.
    pub fn accepts(&self, rotation_deg: f64) -> bool {
        (rotation_deg - self.angle_deg).wrap_degrees().abs() <= self.tolerance_deg
    }
}

// =============================================================================
// Robust fitter configuration
// =============================================================================

/// Configuration for the iterative sigma-clipping fitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// Maximum fit / clip rounds.
    pub max_iterations: usize,
    /// Stop as soon as the percentile squared residual is at or below this.
    pub halt_sigma: f64,
    /// Fraction of the sorted squared residuals that defines sigma.
    pub percentile: f64,
    /// Pairs with squared residual above `clip_factor * sigma` are clipped.
    pub clip_factor: f64,
    /// Residual distance above which a pair is dropped outright.
    pub max_residual: f64,
    /// Number of best seeds the first fit uses when not recalculating.
    /// `None` uses the order minimum.
    pub start_pairs: Option<usize>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            halt_sigma: 1e-10,
            percentile: 0.683,
            clip_factor: 3.0,
            max_residual: 10.0,
            start_pairs: None,
        }
    }
}

impl FitConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) {
        assert!(
            self.max_iterations > 0,
            "fit max_iterations must be positive, got {}",
            self.max_iterations
        );
        assert!(
            self.halt_sigma >= 0.0,
            "fit halt_sigma must be non-negative, got {}",
            self.halt_sigma
        );
        assert!(
            self.percentile > 0.0 && self.percentile <= 1.0,
            "fit percentile must be in (0, 1], got {}",
            self.percentile
        );
        assert!(
            self.clip_factor > 0.0,
            "fit clip_factor must be positive, got {}",
            self.clip_factor
        );
        assert!(
            self.max_residual > 0.0,
            "fit max_residual must be positive, got {}",
            self.max_residual
        );
    }

    /// Number of seeds the first fit of a non-recalculating run uses.
    pub fn start_pairs_for(&self, order: TransformOrder) -> usize {
        self.start_pairs
            .unwrap_or(order.min_pairs())
            .max(order.min_pairs())
    }
}

// =============================================================================
// Matching configuration
// =============================================================================

/// Strategy used to find seed correspondences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMethod {
    /// Triangle walk with per-candidate transform validation. Fast.
    Quick,
    /// Vote matrix over all similar triangle pairs. Slow but thorough.
    Voting,
    /// Quick matching, falling back to voting when it finds nothing.
    #[default]
    QuickThenVoting,
}

/// Configuration for [`find_transform`](crate::find_transform) and friends.
///
/// Defaults follow the classic triangle matcher: the 20 brightest points,
/// a triangle-space radius of 0.002 and a 5 unit match radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Polynomial order of the final transform.
    pub order: TransformOrder,
    pub method: MatchMethod,
    /// Number of brightest points per list used to build triangles.
    pub nbright: usize,
    /// Maximum triangle-space distance for two triangles to be similar.
    pub triangle_radius: f64,
    /// Maximum distance between a transformed A point and its B partner.
    pub match_radius: f64,
    /// Triangles with `b/a` above this are dropped. `None` keeps all.
    pub max_ba_ratio: Option<f64>,
    /// Vote cells below this count are not used as seeds.
    pub min_votes: u32,
    /// Per-ratio tolerance of the quick matcher (`ba`, `ca`, `cb`).
    pub quick_tolerance: f64,
    /// Allowed `(min, max)` scale from A to B.
    pub scale_range: Option<(f64, f64)>,
    /// Expected rotation from A to B.
    pub rotation: Option<RotationConstraint>,
    /// Fit rounds per quick-match candidate, counting the seed fit.
    pub max_iterations: usize,
    /// Quick-match acceptance threshold on the squared sigma.
    pub max_sigma: f64,
    /// Pairs a quick-match candidate needs to be accepted.
    /// Raised to the order minimum when smaller.
    pub min_pairs: usize,
    /// Upper bound on candidate triangle pairs the quick matcher evaluates.
    pub max_candidates: usize,
    /// Optional wall clock budget for the quick matcher.
    pub time_budget: Option<Duration>,
    /// Robust fitter parameters.
    pub fit: FitConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            order: TransformOrder::Linear,
            method: MatchMethod::default(),
            nbright: 20,
            triangle_radius: 0.002,
            match_radius: 5.0,
            max_ba_ratio: Some(0.9),
            min_votes: 2,
            quick_tolerance: 0.01,
            scale_range: None,
            rotation: None,
            max_iterations: 5,
            max_sigma: 1.0,
            min_pairs: 6,
            max_candidates: 50_000,
            time_budget: None,
            fit: FitConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) {
        assert!(
            self.nbright >= 3,
            "nbright must be >= 3 for triangle matching, got {}",
            self.nbright
        );
        assert!(
            self.triangle_radius > 0.0,
            "triangle_radius must be positive, got {}",
            self.triangle_radius
        );
        assert!(
            self.match_radius > 0.0,
            "match_radius must be positive, got {}",
            self.match_radius
        );
        assert!(
            self.quick_tolerance > 0.0,
            "quick_tolerance must be positive, got {}",
            self.quick_tolerance
        );
        if let Some(max_ba) = self.max_ba_ratio {
            assert!(
                max_ba > 0.0 && max_ba <= 1.0,
                "max_ba_ratio must be in (0, 1], got {}",
                max_ba
            );
        }
        if let Some((min_scale, max_scale)) = self.scale_range {
            assert!(
                min_scale > 0.0 && max_scale >= min_scale,
                "scale_range must have 0 < min <= max, got ({}, {})",
                min_scale,
                max_scale
            );
        }
        if let Some(rotation) = self.rotation {
            assert!(
                rotation.tolerance_deg >= 0.0,
                "rotation tolerance must be non-negative, got {}",
                rotation.tolerance_deg
            );
        }
        assert!(
            self.max_iterations > 0,
            "max_iterations must be positive, got {}",
            self.max_iterations
        );
        assert!(
            self.max_sigma > 0.0,
            "max_sigma must be positive, got {}",
            self.max_sigma
        );
        self.fit.validate();
    }

    /// Pairs a quick-match candidate needs, never below the order minimum.
    pub fn required_pairs(&self) -> usize {
        self.min_pairs.max(self.order.min_pairs())
    }

    /// Whether a scale ratio from A to B is allowed.
    pub fn accepts_scale(&self, scale: f64) -> bool {
        match self.scale_range {
            Some((min_scale, max_scale)) => scale >= min_scale && scale <= max_scale,
            None => true,
        }
    }

    /// Whether a rotation from A to B (degrees) is allowed.
    pub fn accepts_rotation(&self, rotation_deg: f64) -> bool {
        match self.rotation {
            Some(constraint) => constraint.accepts(rotation_deg),
            None => true,
        }
    }
}
