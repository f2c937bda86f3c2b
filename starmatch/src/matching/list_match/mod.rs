//! Applying transforms to point lists and matching lists by proximity.

#[cfg(test)]
mod tests;

use glam::DVec2;

use crate::matching::result::{ListMatch, PairIndex};
use crate::matching::transform::Transform;
use crate::point::Point;

/// A proximity correspondence and the distance between its points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityMatch {
    pub pair: PairIndex,
    pub distance: f64,
}

/// Map every point through `transform`. Identifiers and bookkeeping are kept.
pub fn apply_transform(points: &[Point], transform: &Transform) -> Vec<Point> {
    points
        .iter()
        .map(|p| p.with_pos(transform.apply(p.pos)))
        .collect()
}

/// Positions of `points` after `transform`.
pub(crate) fn transformed_positions(points: &[Point], transform: &Transform) -> Vec<DVec2> {
    points.iter().map(|p| transform.apply(p.pos)).collect()
}

/// Indices of the finite `positions`, sorted by x.
pub(crate) fn sort_by_x(positions: &[DVec2]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..positions.len())
        .filter(|&i| positions[i].is_finite())
        .collect();
    order.sort_by(|&i, &j| positions[i].x.total_cmp(&positions[j].x));
    order
}

/// One-to-one proximity matching of two position lists in the same frame.
///
/// `b_by_x` must be the x-sorted index order of `b` (see [`sort_by_x`]), so
/// callers that match many candidate transforms against the same list sort it
/// once. For each A position the closest B within `radius` is chosen, the
/// first one in x order winning exact ties. When several A positions pick the
/// same B, only the closest A keeps it. Matches are returned in A order.
/// Non-finite positions never match.
pub(crate) fn match_positions(
    a: &[DVec2],
    b: &[DVec2],
    b_by_x: &[usize],
    radius: f64,
) -> Vec<ProximityMatch> {
    let radius_sq = radius * radius;
    let mut candidates: Vec<(usize, usize, f64)> = Vec::with_capacity(a.len());

    for (ia, pa) in a.iter().enumerate() {
        if !pa.is_finite() {
            continue;
        }
        let start = b_by_x.partition_point(|&ib| b[ib].x < pa.x - radius);
        let mut best: Option<(usize, f64)> = None;

        for &ib in &b_by_x[start..] {
            let pb = b[ib];
            if pb.x > pa.x + radius {
                break;
            }
            let d2 = pa.distance_squared(pb);
            if d2 > radius_sq {
                continue;
            }
            if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                best = Some((ib, d2));
            }
        }

        if let Some((ib, d2)) = best {
            candidates.push((ia, ib, d2));
        }
    }

    let mut owner: Vec<Option<(usize, f64)>> = vec![None; b.len()];
    for &(ia, ib, d2) in &candidates {
        if owner[ib].is_none_or(|(_, owner_d2)| d2 < owner_d2) {
            owner[ib] = Some((ia, d2));
        }
    }

    candidates
        .into_iter()
        .filter(|&(ia, ib, _)| owner[ib].is_some_and(|(owner_a, _)| owner_a == ia))
        .map(|(ia, ib, d2)| ProximityMatch {
            pair: PairIndex::new(ia, ib),
            distance: d2.sqrt(),
        })
        .collect()
}

/// Partition two lists that are already in the same frame into matched and
/// unmatched points.
///
/// Matched points carry their partner's identifier in `match_id`. Unmatched
/// points keep their input order.
pub fn match_lists(a: &[Point], b: &[Point], radius: f64) -> ListMatch {
    let pos_a: Vec<DVec2> = a.iter().map(|p| p.pos).collect();
    let pos_b: Vec<DVec2> = b.iter().map(|p| p.pos).collect();
    let b_by_x = sort_by_x(&pos_b);
    let matches = match_positions(&pos_a, &pos_b, &b_by_x, radius);
    partition(a, b, &matches)
}

/// Split `a` and `b` by `matches`, which index into them.
pub(crate) fn partition(a: &[Point], b: &[Point], matches: &[ProximityMatch]) -> ListMatch {
    let mut used_a = vec![false; a.len()];
    let mut used_b = vec![false; b.len()];
    let mut result = ListMatch {
        matched_a: Vec::with_capacity(matches.len()),
        matched_b: Vec::with_capacity(matches.len()),
        ..Default::default()
    };

    for m in matches {
        let PairIndex { a: ia, b: ib } = m.pair;
        used_a[ia] = true;
        used_b[ib] = true;
        result.matched_a.push(Point {
            match_id: Some(b[ib].id),
            ..a[ia]
        });
        result.matched_b.push(Point {
            match_id: Some(a[ia].id),
            ..b[ib]
        });
    }

    result.unmatched_a = a
        .iter()
        .zip(&used_a)
        .filter(|(_, used)| !**used)
        .map(|(p, _)| *p)
        .collect();
    result.unmatched_b = b
        .iter()
        .zip(&used_b)
        .filter(|(_, used)| !**used)
        .map(|(p, _)| *p)
        .collect();

    result
}
