//! Correspondence and result types.

use serde::{Deserialize, Serialize};

use crate::matching::transform::Transform;
use crate::point::Point;

/// A correspondence between index `a` of list A and index `b` of list B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairIndex {
    pub a: usize,
    pub b: usize,
}

impl PairIndex {
    #[inline]
    pub const fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }
}

/// The four partitions produced by proximity matching.
///
/// `matched_a[i]` and `matched_b[i]` are partners. Every input point lands in
/// exactly one of the four lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListMatch {
    pub matched_a: Vec<Point>,
    pub matched_b: Vec<Point>,
    pub unmatched_a: Vec<Point>,
    pub unmatched_b: Vec<Point>,
}

impl ListMatch {
    pub fn num_matched(&self) -> usize {
        self.matched_a.len()
    }
}

/// Outcome of [`register`](crate::register): the transform plus the final
/// partition of both lists in their original coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub transform: Transform,
    pub lists: ListMatch,
    /// Processing time in milliseconds.
    pub elapsed_ms: f64,
}

impl MatchResult {
    pub fn new(transform: Transform, lists: ListMatch) -> Self {
        Self {
            transform,
            lists,
            elapsed_ms: 0.0,
        }
    }

    /// Set the elapsed time.
    pub fn with_elapsed(mut self, ms: f64) -> Self {
        self.elapsed_ms = ms;
        self
    }

    /// Fraction of list A that found a partner.
    pub fn match_fraction(&self) -> f64 {
        let total = self.lists.matched_a.len() + self.lists.unmatched_a.len();
        if total == 0 {
            0.0
        } else {
            self.lists.matched_a.len() as f64 / total as f64
        }
    }
}
