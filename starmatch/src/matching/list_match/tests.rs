use glam::DVec2;

use super::*;
use crate::matching::transform::TransformOrder;
use crate::testing::{positions, random_field, transform_points};

fn pts(coords: &[(f64, f64)], first_id: u64) -> Vec<Point> {
    coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Point::new(first_id + i as u64, x, y, 10.0 + i as f64))
        .collect()
}

#[test]
fn test_match_positions_closest_within_radius() {
    let a = vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(50.0, 50.0)];
    let b = vec![
        DVec2::new(10.5, 0.2),
        DVec2::new(0.3, -0.1),
        DVec2::new(0.0, 1.5),
        DVec2::new(80.0, 80.0),
    ];
    let b_by_x = sort_by_x(&b);

    let matches = match_positions(&a, &b, &b_by_x, 2.0);
    let pairs: Vec<PairIndex> = matches.iter().map(|m| m.pair).collect();
    assert_eq!(pairs, vec![PairIndex::new(0, 1), PairIndex::new(1, 0)]);
    assert!((matches[0].distance - DVec2::new(0.3, -0.1).length()).abs() < 1e-12);
}

#[test]
fn test_match_positions_resolves_collisions() {
    // Both A points prefer B[0]; only the closer keeps it.
    let a = vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0)];
    let b = vec![DVec2::new(0.8, 0.0), DVec2::new(-1.5, 0.0)];
    let b_by_x = sort_by_x(&b);

    let matches = match_positions(&a, &b, &b_by_x, 2.0);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].pair, PairIndex::new(1, 0));
}

#[test]
fn test_match_positions_radius_is_inclusive() {
    let a = vec![DVec2::new(0.0, 0.0)];
    let b = vec![DVec2::new(3.0, 4.0)];
    let b_by_x = sort_by_x(&b);
    assert_eq!(match_positions(&a, &b, &b_by_x, 5.0).len(), 1);
    assert!(match_positions(&a, &b, &b_by_x, 4.999).is_empty());
}

#[test]
fn test_match_positions_empty_lists() {
    let a = vec![DVec2::new(0.0, 0.0)];
    assert!(match_positions(&a, &[], &[], 1.0).is_empty());
    assert!(match_positions(&[], &a, &[0], 1.0).is_empty());
}

#[test]
fn test_match_lists_partitions_every_point() {
    let a = pts(&[(0.0, 0.0), (100.0, 0.0), (200.0, 200.0), (300.0, 5.0)], 0);
    let b = pts(&[(300.4, 5.2), (0.1, 0.1), (900.0, 900.0)], 100);

    let result = match_lists(&a, &b, 1.0);

    assert_eq!(result.num_matched(), 2);
    assert_eq!(result.matched_a.len(), result.matched_b.len());
    assert_eq!(result.matched_a.len() + result.unmatched_a.len(), a.len());
    assert_eq!(result.matched_b.len() + result.unmatched_b.len(), b.len());

    // Matches come back in A order with partner ids filled in.
    assert_eq!(result.matched_a[0].id, 0);
    assert_eq!(result.matched_a[0].match_id, Some(101));
    assert_eq!(result.matched_b[0].match_id, Some(0));
    assert_eq!(result.matched_a[1].id, 3);
    assert_eq!(result.matched_b[1].id, 100);

    let unmatched_a: Vec<u64> = result.unmatched_a.iter().map(|p| p.id).collect();
    assert_eq!(unmatched_a, vec![1, 2]);
    assert!(result.unmatched_a.iter().all(|p| p.match_id.is_none()));
    assert_eq!(result.unmatched_b[0].id, 102);
}

#[test]
fn test_match_lists_keeps_original_positions() {
    let a = pts(&[(1.0, 1.0)], 0);
    let b = pts(&[(1.5, 1.0)], 7);
    let result = match_lists(&a, &b, 1.0);
    assert_eq!(result.matched_a[0].pos, DVec2::new(1.0, 1.0));
    assert_eq!(result.matched_b[0].pos, DVec2::new(1.5, 1.0));
}

#[test]
fn test_apply_transform_preserves_bookkeeping() {
    let points = vec![Point::new(42, 10.0, 20.0, 11.5).with_color_index(0.65)];
    let t = Transform::similarity(DVec2::new(5.0, -5.0), 90.0, 1.0);
    let moved = apply_transform(&points, &t);

    assert_eq!(moved[0].id, 42);
    assert_eq!(moved[0].magnitude, 11.5);
    assert_eq!(moved[0].color_index, Some(0.65));
    assert!((moved[0].pos - DVec2::new(-15.0, 5.0)).length() < 1e-12);
}

#[test]
fn test_apply_then_match_recovers_field() {
    let field = random_field(200, 4000.0, 4000.0, 17);
    let t = Transform::similarity(DVec2::new(30.0, 12.0), 2.0, 1.0);
    let moved = transform_points(&field, &t, 10_000);

    let result = match_lists(&apply_transform(&field, &t), &moved, 0.5);
    assert_eq!(result.num_matched(), 200);
    for (pa, pb) in result.matched_a.iter().zip(&result.matched_b) {
        assert_eq!(pa.id + 10_000, pb.id);
    }

    let projected = transformed_positions(&field, &Transform::identity(TransformOrder::Linear));
    assert_eq!(projected, positions(&field));
}

#[test]
fn test_non_finite_positions_never_match() {
    let a = vec![
        Point::new(0, f64::NAN, f64::NAN, 10.0),
        Point::new(1, 100.0, 100.0, 11.0),
        Point::new(2, f64::INFINITY, 5.0, 12.0),
    ];
    let b = vec![
        Point::new(10, 100.0, 100.0, 10.0),
        Point::new(11, f64::NAN, 5.0, 11.0),
    ];

    let result = match_lists(&a, &b, 1.0);
    let ids = |points: &[Point]| points.iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(ids(&result.matched_a), vec![1]);
    assert_eq!(ids(&result.matched_b), vec![10]);
    assert_eq!(ids(&result.unmatched_a), vec![0, 2]);
    assert_eq!(ids(&result.unmatched_b), vec![11]);
}

#[test]
fn test_sort_by_x_skips_non_finite() {
    let positions = vec![
        DVec2::new(3.0, 0.0),
        DVec2::new(-f64::NAN, 0.0),
        DVec2::new(1.0, f64::INFINITY),
        DVec2::new(2.0, 0.0),
    ];
    assert_eq!(sort_by_x(&positions), vec![3, 0]);
}
