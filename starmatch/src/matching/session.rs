//! Reusable matching context for one reference list.

use std::time::Instant;

use glam::DVec2;
use rayon::prelude::*;

use crate::matching::config::{MatchConfig, MatchMethod};
use crate::matching::error::MatchError;
use crate::matching::fit::robust_fit;
use crate::matching::list_match::{ProximityMatch, match_positions, partition, sort_by_x};
use crate::matching::quick::quick_match;
use crate::matching::result::{MatchResult, PairIndex};
use crate::matching::transform::Transform;
use crate::matching::triangle::{TriangleSet, vote_for_correspondences};
use crate::point::Point;

/// Matches any number of target lists against one reference list.
///
/// The reference triangles are built once in [`new`](Self::new). The session
/// is immutable afterwards, so it can be shared across threads and every
/// target is matched independently.
#[derive(Debug, Clone)]
pub struct MatchSession {
    config: MatchConfig,
    reference: Vec<Point>,
    positions: Vec<DVec2>,
    triangles: TriangleSet,
}

fn check_count(found: usize, config: &MatchConfig) -> Result<(), MatchError> {
    let required = config.order.min_pairs().max(3);
    if found < required {
        return Err(MatchError::InsufficientPoints { found, required });
    }
    Ok(())
}

impl MatchSession {
    /// Build the reference triangles. Panics on an invalid `config`.
    pub fn new(reference: &[Point], config: MatchConfig) -> Result<Self, MatchError> {
        config.validate();
        check_count(reference.len(), &config)?;

        let triangles = TriangleSet::build(reference, config.nbright, config.max_ba_ratio);
        Ok(Self {
            reference: reference.to_vec(),
            positions: reference.iter().map(|p| p.pos).collect(),
            triangles,
            config,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn reference(&self) -> &[Point] {
        &self.reference
    }

    pub fn triangles(&self) -> &TriangleSet {
        &self.triangles
    }

    /// Transform mapping the reference list onto `target`.
    pub fn find_transform(&self, target: &[Point]) -> Result<Transform, MatchError> {
        self.solve(target).map(|(transform, _)| transform)
    }

    /// Find the transform and partition both lists by it.
    ///
    /// Points in the result keep their original coordinates.
    pub fn register(&self, target: &[Point]) -> Result<MatchResult, MatchError> {
        let start = Instant::now();
        let (transform, matches) = self.solve(target)?;
        let lists = partition(&self.reference, target, &matches);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            matched = lists.num_matched(),
            unmatched_reference = lists.unmatched_a.len(),
            unmatched_target = lists.unmatched_b.len(),
            elapsed_ms,
            "registered {transform}"
        );

        Ok(MatchResult::new(transform, lists).with_elapsed(elapsed_ms))
    }

    /// Register every target in parallel. Results are in input order.
    pub fn register_batch(&self, targets: &[Vec<Point>]) -> Vec<Result<MatchResult, MatchError>> {
        targets
            .par_iter()
            .map(|target| self.register(target))
            .collect()
    }

    fn solve(&self, target: &[Point]) -> Result<(Transform, Vec<ProximityMatch>), MatchError> {
        check_count(target.len(), &self.config)?;

        let pos_b: Vec<DVec2> = target.iter().map(|p| p.pos).collect();
        let set_b = TriangleSet::build(target, self.config.nbright, self.config.max_ba_ratio);

        let (seed, candidates_tried) = match self.config.method {
            MatchMethod::Quick => self.quick(&set_b, &pos_b)?,
            MatchMethod::Voting => self.voting(&set_b, &pos_b)?,
            MatchMethod::QuickThenVoting => match self.quick(&set_b, &pos_b) {
                Err(MatchError::NoMatchFound { candidates_tried }) => {
                    tracing::debug!(candidates_tried, "quick match failed, falling back to voting");
                    self.voting(&set_b, &pos_b)?
                }
                other => other?,
            },
        };

        self.refine(seed, &pos_b, candidates_tried)
    }

    fn quick(&self, set_b: &TriangleSet, pos_b: &[DVec2]) -> Result<(Transform, usize), MatchError> {
        let found = quick_match(&self.triangles, set_b, &self.positions, pos_b, &self.config)?;
        Ok((found.transform, found.candidates_tried))
    }

    fn voting(&self, set_b: &TriangleSet, pos_b: &[DVec2]) -> Result<(Transform, usize), MatchError> {
        let config = &self.config;
        let matrix = vote_for_correspondences(&self.triangles, set_b, config);
        let top = matrix.top_pairs(config.nbright, config.min_votes);
        let candidates_tried = top.len();

        let seeds: Vec<PairIndex> = top
            .iter()
            .map(|v| {
                PairIndex::new(
                    self.triangles.source_indices[v.pair.a],
                    set_b.source_indices[v.pair.b],
                )
            })
            .collect();
        tracing::debug!(seeds = seeds.len(), "voting produced seeds");

        let outcome = robust_fit(config.order, &self.positions, pos_b, &seeds, false, &config.fit)
            .map_err(|e| match e {
                MatchError::InsufficientPoints { .. } => MatchError::NoMatchFound { candidates_tried },
                other => other,
            })?;
        Ok((outcome.transform, candidates_tried))
    }

    /// Refit on every proximity match of `seed`, then validate the result.
    pub(super) fn refine(
        &self,
        seed: Transform,
        pos_b: &[DVec2],
        candidates_tried: usize,
    ) -> Result<(Transform, Vec<ProximityMatch>), MatchError> {
        let config = &self.config;
        let b_by_x = sort_by_x(pos_b);
        let project = |t: &Transform| -> Vec<DVec2> {
            self.positions.iter().map(|&p| t.apply(p)).collect()
        };

        let matches = match_positions(&project(&seed), pos_b, &b_by_x, config.match_radius);
        let mut transform = if matches.len() >= config.order.min_pairs() {
            let pairs: Vec<PairIndex> = matches.iter().map(|m| m.pair).collect();
            match robust_fit(config.order, &self.positions, pos_b, &pairs, true, &config.fit) {
                Ok(outcome) => outcome.transform,
                Err(error) => {
                    tracing::debug!(%error, "final refit failed, keeping seed transform");
                    seed
                }
            }
        } else {
            seed
        };

        if !transform.is_valid() {
            return Err(MatchError::SingularSystem);
        }

        let matches = match_positions(&project(&transform), pos_b, &b_by_x, config.match_radius);
        if matches.len() < config.required_pairs() {
            tracing::debug!(matched = matches.len(), "too few proximity matches");
            return Err(MatchError::NoMatchFound { candidates_tried });
        }
        transform.pairs_matched = matches.len();

        let scale = transform.scale_factor();
        let rotation_deg = transform.rotation_deg();
        if !config.accepts_scale(scale) || !config.accepts_rotation(rotation_deg) {
            tracing::warn!(scale, rotation_deg, "transform violates constraints");
            return Err(MatchError::ConstraintViolation {
                scale,
                rotation_deg,
            });
        }

        Ok((transform, matches))
    }
}
