//! Triangle matching for point pattern recognition.
//!
//! Triangles are built from every combination of three bright points and
//! characterized by their side ratios `b/a` and `c/a`, which are invariant to
//! translation, rotation, and scale.
//!
//! # Algorithm Overview
//!
//! 1. Sort each list by magnitude and keep the brightest `nbright` points
//! 2. Form all `C(nbright, 3)` triangles, label sides `a >= b >= c`
//! 3. Sort by `b/a` and prune near-isoceles triangles
//! 4. For each triangle of B, binary search A for similar shapes
//! 5. Vote for the labelled vertex correspondences
//! 6. Extract the highest voted point pairs

mod generator;
mod geometry;
#[cfg(test)]
mod tests;
mod voting;

pub use generator::{TriangleSet, triangle_count};
pub use geometry::Triangle;
pub use voting::{VoteMatrix, VotedPair, vote_for_correspondences};

pub(crate) use voting::passes_constraints;
