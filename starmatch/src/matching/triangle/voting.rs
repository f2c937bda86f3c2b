use common::FloatExt;

use crate::matching::config::MatchConfig;
use crate::matching::result::PairIndex;

use super::generator::TriangleSet;
use super::geometry::Triangle;

/// A candidate correspondence and the number of triangles that nominated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotedPair {
    pub pair: PairIndex,
    pub votes: u32,
}

/// Dense `n_a x n_b` vote counts between bright points of two lists.
///
/// Indices are ranks in the respective [`TriangleSet`]s.
#[derive(Debug, Clone)]
pub struct VoteMatrix {
    votes: Vec<u32>,
    n_a: usize,
    n_b: usize,
}

impl VoteMatrix {
    pub fn new(n_a: usize, n_b: usize) -> Self {
        Self {
            votes: vec![0; n_a * n_b],
            n_a,
            n_b,
        }
    }

    #[inline]
    pub fn increment(&mut self, a: usize, b: usize) {
        let idx = a * self.n_b + b;
        self.votes[idx] = self.votes[idx].saturating_add(1);
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> u32 {
        self.votes[a * self.n_b + b]
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.n_a, self.n_b)
    }

    /// The `k` cells with the most votes, best first.
    ///
    /// Cells are scanned row by row and insertion-sorted; a cell only
    /// displaces another with strictly fewer votes, so ties keep scan order.
    /// Cells with fewer than `min_votes` are never returned, which may leave
    /// fewer than `k` pairs.
    pub fn top_pairs(&self, k: usize, min_votes: u32) -> Vec<VotedPair> {
        let mut top: Vec<VotedPair> = Vec::with_capacity(k + 1);
        if k == 0 {
            return top;
        }

        for a in 0..self.n_a {
            for b in 0..self.n_b {
                let votes = self.get(a, b);
                if votes == 0 || votes < min_votes {
                    continue;
                }
                if top.len() == k && top[k - 1].votes >= votes {
                    continue;
                }
                let pos = top.partition_point(|p| p.votes >= votes);
                top.insert(
                    pos,
                    VotedPair {
                        pair: PairIndex::new(a, b),
                        votes,
                    },
                );
                top.truncate(k);
            }
        }

        top
    }
}

/// Whether two shape-matched triangles also satisfy the scale and rotation
/// constraints of `config`.
pub(crate) fn passes_constraints(tri_a: &Triangle, tri_b: &Triangle, config: &MatchConfig) -> bool {
    if config.scale_range.is_some() {
        if tri_a.a <= 0.0 {
            return false;
        }
        if !config.accepts_scale(tri_b.a / tri_a.a) {
            return false;
        }
    }
    if config.rotation.is_some() {
        let rotation = (tri_b.orientation_deg - tri_a.orientation_deg).wrap_degrees();
        if !config.accepts_rotation(rotation) {
            return false;
        }
    }
    true
}

/// Vote for point correspondences between two triangle sets.
///
/// For every usable triangle of `set_b`, binary search the `ba`-sorted
/// triangles of `set_a` for those within `triangle_radius` in `ba`, then keep
/// the ones whose `(ba, ca)` distance is within the radius and which pass the
/// optional constraints. Each accepted pair votes for its three labelled
/// vertex correspondences.
pub fn vote_for_correspondences(
    set_a: &TriangleSet,
    set_b: &TriangleSet,
    config: &MatchConfig,
) -> VoteMatrix {
    let mut matrix = VoteMatrix::new(set_a.num_points(), set_b.num_points());
    let tris_a = set_a.usable();
    let radius = config.triangle_radius;
    let mut accepted = 0usize;

    for tri_b in set_b.usable() {
        let lo = tris_a.partition_point(|t| t.ba < tri_b.ba - radius);
        let hi = tris_a.partition_point(|t| t.ba <= tri_b.ba + radius);

        for tri_a in &tris_a[lo..hi] {
            if tri_a.shape_distance(tri_b) > radius {
                continue;
            }
            if !passes_constraints(tri_a, tri_b, config) {
                continue;
            }

            accepted += 1;
            for (va, vb) in tri_a.vertices().into_iter().zip(tri_b.vertices()) {
                matrix.increment(va, vb);
            }
        }
    }

    tracing::debug!(
        triangles_a = tris_a.len(),
        triangles_b = set_b.usable().len(),
        accepted,
        "voted for correspondences"
    );

    matrix
}
