//! Quick matching: validate one triangle pair at a time.
//!
//! Triangles of A are visited by discriminant `D` descending, so large and
//! distinctive triangles come first. For each, the triangles of B whose `yt`
//! lies in a tolerance window are found by binary search, screened on their
//! side ratios and constraints, and every survivor seeds an iterative
//! fit / match / clip loop over the full point lists. The first candidate
//! whose fit has enough pairs with a small enough residual wins.
//!
//! The result depends on visitation order: this returns the first acceptable
//! transform, not the best one.


use std::time::Instant;

use glam::DVec2;

use crate::math::{mean_and_std_dev, percentile};
use crate::matching::config::MatchConfig;
use crate::matching::error::MatchError;
use crate::matching::fit::{fit_polynomial, residual_sq, with_statistics};
use crate::matching::list_match::{match_positions, sort_by_x};
use crate::matching::result::PairIndex;
use crate::matching::transform::{Transform, TransformOrder};
use crate::matching::triangle::{Triangle, TriangleSet, passes_constraints};

/// An accepted quick-match candidate.
#[derive(Debug, Clone)]
pub struct QuickMatch {
    /// Transform with `sigma` and `pairs_used` filled in.
    pub transform: Transform,
    /// Correspondences between the full lists the transform was fitted on.
    pub pairs: Vec<PairIndex>,
    /// Candidate triangle pairs evaluated, including the winner.
    pub candidates_tried: usize,
}

/// Positions of both full lists plus B sorted by x, shared by all candidates.
struct Frame<'a> {
    pos_a: &'a [DVec2],
    pos_b: &'a [DVec2],
    b_by_x: Vec<usize>,
}

fn ratios_close(tri_a: &Triangle, tri_b: &Triangle, tolerance: f64) -> bool {
    (tri_a.ba - tri_b.ba).abs() <= tolerance
        && (tri_a.ca - tri_b.ca).abs() <= tolerance
        && (tri_a.cb - tri_b.cb).abs() <= tolerance
}

fn transform_allowed(transform: &Transform, config: &MatchConfig) -> bool {
    transform.is_valid()
        && config.accepts_scale(transform.scale_factor())
        && config.accepts_rotation(transform.rotation_deg())
}

/// Search for a transform from `pos_a` to `pos_b` using the triangles of
/// both sets.
///
/// `set_a` and `set_b` must have been built from the lists behind `pos_a`
/// and `pos_b`. Fails with [`MatchError::NoMatchFound`] when every candidate
/// is rejected or the candidate / time budget runs out.
pub fn quick_match(
    set_a: &TriangleSet,
    set_b: &TriangleSet,
    pos_a: &[DVec2],
    pos_b: &[DVec2],
    config: &MatchConfig,
) -> Result<QuickMatch, MatchError> {
    let started = Instant::now();

    let tris_a = set_a.usable();
    let mut visit_a: Vec<usize> = (0..tris_a.len()).collect();
    visit_a.sort_by(|&i, &j| tris_a[j].d.total_cmp(&tris_a[i].d));

    let mut tris_b: Vec<Triangle> = set_b.usable().to_vec();
    tris_b.sort_by(|x, y| x.yt.total_cmp(&y.yt));

    let frame = Frame {
        pos_a,
        pos_b,
        b_by_x: sort_by_x(pos_b),
    };

    let tolerance = config.quick_tolerance;
    let mut candidates_tried = 0usize;

    for &ia in &visit_a {
        let tri_a = &tris_a[ia];
        let half_window = tolerance * tri_a.yt * tri_a.yt;
        let lo = tris_b.partition_point(|t| t.yt < tri_a.yt - half_window);
        let hi = tris_b.partition_point(|t| t.yt <= tri_a.yt + half_window);

        for tri_b in &tris_b[lo..hi] {
            candidates_tried += 1;
            if candidates_tried > config.max_candidates
                || config
                    .time_budget
                    .is_some_and(|budget| started.elapsed() > budget)
            {
                tracing::warn!(
                    candidates_tried,
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "quick match budget exhausted"
                );
                return Err(MatchError::NoMatchFound { candidates_tried });
            }

            if !ratios_close(tri_a, tri_b, tolerance) || !passes_constraints(tri_a, tri_b, config)
            {
                continue;
            }

            let seed: Vec<PairIndex> = tri_a
                .vertices()
                .into_iter()
                .zip(tri_b.vertices())
                .map(|(va, vb)| PairIndex::new(set_a.source_indices[va], set_b.source_indices[vb]))
                .collect();

            if let Some((transform, pairs)) = refine_candidate(seed, &frame, config) {
                tracing::debug!(
                    candidates_tried,
                    pairs = pairs.len(),
                    sigma = transform.sigma,
                    "quick match accepted candidate"
                );
                return Ok(QuickMatch {
                    transform,
                    pairs,
                    candidates_tried,
                });
            }
        }
    }

    tracing::debug!(candidates_tried, "quick match found no candidate");
    Err(MatchError::NoMatchFound { candidates_tried })
}

/// Grow a three pair seed into a validated transform, or reject it.
///
/// Each round fits the current pairs (linear until there are enough pairs
/// for the requested order), rejects the candidate if the fit breaks the
/// constraints, re-matches all of A against B, drops matches farther than
/// mean + 3σ of the match distances, and repeats with the survivors.
fn refine_candidate(
    seed: Vec<PairIndex>,
    frame: &Frame<'_>,
    config: &MatchConfig,
) -> Option<(Transform, Vec<PairIndex>)> {
    let required = config.required_pairs();
    let mut pairs = seed;

    for iteration in 0..config.max_iterations {
        let order = if pairs.len() >= config.order.min_pairs() {
            config.order
        } else {
            TransformOrder::Linear
        };

        let transform = fit_polynomial(order, frame.pos_a, frame.pos_b, &pairs).ok()?;
        if !transform_allowed(&transform, config) {
            return None;
        }

        let residuals: Vec<f64> = pairs
            .iter()
            .map(|&p| residual_sq(&transform, frame.pos_a, frame.pos_b, p))
            .collect();
        let sigma_sq = percentile(&residuals, config.fit.percentile)?;

        if pairs.len() >= required && sigma_sq <= config.max_sigma {
            let transform =
                with_statistics(transform, frame.pos_a, frame.pos_b, &pairs, sigma_sq);
            return Some((transform, pairs));
        }

        if iteration + 1 == config.max_iterations {
            break;
        }

        let projected: Vec<DVec2> = frame.pos_a.iter().map(|&p| transform.apply(p)).collect();
        let mut matches =
            match_positions(&projected, frame.pos_b, &frame.b_by_x, config.match_radius);

        let distances: Vec<f64> = matches.iter().map(|m| m.distance).collect();
        let (mean, std_dev) = mean_and_std_dev(&distances);
        let limit = mean + 3.0 * std_dev;
        matches.retain(|m| m.distance <= limit);

        let next: Vec<PairIndex> = matches.into_iter().map(|m| m.pair).collect();
        if next.len() < TransformOrder::Linear.min_pairs() || next == pairs {
            return None;
        }
        pairs = next;
    }

    None
}
