use common::FloatExt;
use glam::DVec2;

use super::*;
use crate::matching::config::{MatchConfig, RotationConstraint};
use crate::matching::result::PairIndex;
use crate::matching::transform::Transform;
use crate::point::Point;
use crate::testing::{random_field, transform_points};

fn triangle_of(positions: [DVec2; 3]) -> Triangle {
    Triangle::new([0, 1, 2], positions, |i, j| {
        (positions[i] - positions[j]).length()
    })
}

// ============================================================================
// Triangle geometry
// ============================================================================

#[test]
fn test_right_triangle_labels() {
    let t = triangle_of([
        DVec2::new(0.0, 0.0),
        DVec2::new(3.0, 0.0),
        DVec2::new(0.0, 4.0),
    ]);

    assert!((t.a - 5.0).abs() < 1e-12);
    assert!((t.b - 4.0).abs() < 1e-12);
    assert!((t.c - 3.0).abs() < 1e-12);
    // Each label is the vertex opposite the side of the same name.
    assert_eq!(t.vertices(), [0, 1, 2]);

    assert!((t.ba - 0.8).abs() < 1e-12);
    assert!((t.ca - 0.6).abs() < 1e-12);
    assert!((t.cb - 0.75).abs() < 1e-12);

    // Side a runs from (3, 0) to (0, 4).
    let expected_orientation = 4.0f64.atan2(-3.0).to_degrees();
    assert!((t.orientation_deg - expected_orientation).abs() < 1e-12);

    // (P_a - P_c) . (P_b - P_c) = (0, -4) . (3, -4)
    assert!((t.xt - 16.0).abs() < 1e-12);
    assert!((t.yt - 5.0 / 3.0).abs() < 1e-12);
    assert!((t.d - 80.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_labels_follow_geometry_not_input_order() {
    let p = [
        DVec2::new(0.0, 4.0),
        DVec2::new(0.0, 0.0),
        DVec2::new(3.0, 0.0),
    ];
    let t = triangle_of(p);
    assert_eq!(t.vertices(), [1, 2, 0]);
}

#[test]
fn test_degenerate_triangles_use_defaults() {
    let same = DVec2::new(7.0, 7.0);
    let t = triangle_of([same, same, same]);
    assert_eq!(t.a, 0.0);
    assert_eq!(t.ba, 1.0);
    assert_eq!(t.ca, 1.0);
    assert_eq!(t.cb, 1.0);
    assert_eq!(t.yt, 1.0);
    assert!(t.d.is_finite());

    let t = triangle_of([DVec2::ZERO, DVec2::ZERO, DVec2::new(5.0, 0.0)]);
    assert!((t.ba - 1.0).abs() < 1e-12);
    assert_eq!(t.ca, 0.0);
    assert_eq!(t.cb, 0.0);
    assert_eq!(t.yt, 0.0);
    assert_eq!(t.d, 0.0);
}

#[test]
fn test_shape_is_similarity_invariant() {
    let p = [
        DVec2::new(10.0, 20.0),
        DVec2::new(140.0, 35.0),
        DVec2::new(60.0, 110.0),
    ];
    let t = Transform::similarity(DVec2::new(-300.0, 45.0), 73.0, 1.7);
    let q = p.map(|v| t.apply(v));

    let ta = triangle_of(p);
    let tb = triangle_of(q);
    assert!(ta.shape_distance(&tb) < 1e-12);
    assert!((ta.cb - tb.cb).abs() < 1e-12);
    assert_eq!(ta.vertices(), tb.vertices());
    assert!((tb.a / ta.a - 1.7).abs() < 1e-12);
    let rotation = (tb.orientation_deg - ta.orientation_deg).wrap_degrees();
    assert!((rotation - 73.0).abs() < 1e-9, "rotation {rotation}");
}

// ============================================================================
// TriangleSet
// ============================================================================

#[test]
fn test_triangle_count() {
    assert_eq!(triangle_count(0), 0);
    assert_eq!(triangle_count(2), 0);
    assert_eq!(triangle_count(3), 1);
    assert_eq!(triangle_count(10), 120);
    assert_eq!(triangle_count(20), 1140);
}

#[test]
fn test_build_uses_brightest_points() {
    let mut points = random_field(30, 1000.0, 1000.0, 5);
    points.reverse();

    let set = TriangleSet::build(&points, 10, None);
    assert_eq!(set.num_points(), 10);
    assert_eq!(set.triangles.len(), 120);
    assert_eq!(set.usable().len(), 120);

    for (rank, p) in set.points.iter().enumerate() {
        assert_eq!(p.rank, Some(rank));
        assert_eq!(points[set.source_indices[rank]].id, p.id);
    }
    for w in set.points.windows(2) {
        assert!(w[0].magnitude <= w[1].magnitude);
    }
    // random_field assigns magnitudes by id, so the brightest are ids 0..10.
    let mut ids: Vec<u64> = set.points.iter().map(|p| p.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..10).collect::<Vec<u64>>());
}

#[test]
fn test_build_invariants() {
    let points = random_field(15, 2000.0, 2000.0, 11);
    let set = TriangleSet::build(&points, 15, Some(0.9));

    assert_eq!(set.triangles.len(), triangle_count(15));
    for w in set.triangles.windows(2) {
        assert!(w[0].ba <= w[1].ba, "triangles not sorted by ba");
    }
    for t in &set.triangles {
        assert!(t.a >= t.b && t.b >= t.c, "sides out of order: {t:?}");
        for ratio in [t.ba, t.ca, t.cb] {
            assert!((0.0..=1.0).contains(&ratio), "ratio out of range: {t:?}");
        }
        assert!(t.yt >= 1.0);
    }
    assert!(set.usable().len() < set.triangles.len());
    assert!(set.usable().iter().all(|t| t.ba <= 0.9));
    assert!(set.triangles[set.usable().len()..].iter().all(|t| t.ba > 0.9));
}

#[test]
fn test_build_small_lists() {
    let points = vec![Point::new(0, 0.0, 0.0, 1.0), Point::new(1, 1.0, 0.0, 2.0)];
    let set = TriangleSet::build(&points, 20, None);
    assert_eq!(set.num_points(), 2);
    assert!(set.triangles.is_empty());
    assert!(set.usable().is_empty());
}

// ============================================================================
// Voting
// ============================================================================

#[test]
fn test_top_pairs_ordering_and_ties() {
    let mut m = VoteMatrix::new(3, 3);
    for _ in 0..3 {
        m.increment(0, 1);
        m.increment(1, 0);
    }
    for _ in 0..5 {
        m.increment(2, 2);
    }
    m.increment(0, 0);

    assert_eq!(m.get(2, 2), 5);
    assert_eq!(m.dims(), (3, 3));

    let top = m.top_pairs(3, 2);
    let pairs: Vec<(PairIndex, u32)> = top.iter().map(|v| (v.pair, v.votes)).collect();
    assert_eq!(
        pairs,
        vec![
            (PairIndex::new(2, 2), 5),
            (PairIndex::new(0, 1), 3),
            (PairIndex::new(1, 0), 3),
        ]
    );

    let top = m.top_pairs(2, 1);
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].pair, PairIndex::new(0, 1));

    // The single-vote cell is only reachable with min_votes <= 1.
    assert_eq!(m.top_pairs(10, 2).len(), 3);
    assert_eq!(m.top_pairs(10, 1).len(), 4);
    assert!(m.top_pairs(0, 1).is_empty());
    assert!(m.top_pairs(10, 6).is_empty());
}

#[test]
fn test_votes_recover_identity_correspondence() {
    let points = random_field(12, 1000.0, 1000.0, 21);
    let set = TriangleSet::build(&points, 12, Some(0.9));
    let config = MatchConfig::default();

    let matrix = vote_for_correspondences(&set, &set, &config);
    let top = matrix.top_pairs(12, config.min_votes);
    assert!(!top.is_empty());
    for v in &top {
        assert_eq!(v.pair.a, v.pair.b, "off-diagonal winner {v:?}");
    }
}

#[test]
fn test_votes_under_similarity_transform() {
    let points = random_field(15, 1000.0, 1000.0, 8);
    let t = Transform::similarity(DVec2::new(120.0, -80.0), 30.0, 1.25);
    let moved = transform_points(&points, &t, 1000);

    let set_a = TriangleSet::build(&points, 15, Some(0.9));
    let set_b = TriangleSet::build(&moved, 15, Some(0.9));
    let matrix = vote_for_correspondences(&set_a, &set_b, &MatchConfig::default());

    // Same brightness order on both sides, so ranks correspond one to one.
    for v in matrix.top_pairs(10, 2) {
        assert_eq!(v.pair.a, v.pair.b, "wrong correspondence {v:?}");
    }
}

#[test]
fn test_constraints_filter_triangle_pairs() {
    let p = [
        DVec2::new(0.0, 0.0),
        DVec2::new(100.0, 10.0),
        DVec2::new(30.0, 80.0),
    ];
    let t = Transform::similarity(DVec2::ZERO, 175.0, 2.0);
    let ta = triangle_of(p);
    let tb = triangle_of(p.map(|v| t.apply(v)));

    assert!(passes_constraints(&ta, &tb, &MatchConfig::default()));

    let scaled = MatchConfig {
        scale_range: Some((0.5, 1.5)),
        ..Default::default()
    };
    assert!(!passes_constraints(&ta, &tb, &scaled));

    let wrapped = MatchConfig {
        rotation: Some(RotationConstraint {
            angle_deg: -178.0,
            tolerance_deg: 10.0,
        }),
        ..Default::default()
    };
    assert!(passes_constraints(&ta, &tb, &wrapped));

    let wrong = MatchConfig {
        rotation: Some(RotationConstraint {
            angle_deg: 0.0,
            tolerance_deg: 10.0,
        }),
        ..Default::default()
    };
    assert!(!passes_constraints(&ta, &tb, &wrong));
}
