use crate::point::{Point, brightness_order};

use super::geometry::Triangle;

/// The brightest points of one list and every triangle among them.
///
/// `triangles` is sorted by `ba` ascending. Pruning only shortens the usable
/// prefix returned by [`usable`](Self::usable); the full combinatorial set is
/// kept.
#[derive(Debug, Clone)]
pub struct TriangleSet {
    /// Brightest points sorted by magnitude, `rank` set to their position.
    pub points: Vec<Point>,
    /// Index of each bright point in the list it was built from.
    pub source_indices: Vec<usize>,
    pub triangles: Vec<Triangle>,
    usable: usize,
}

impl TriangleSet {
    /// Build triangles from the `nbright` brightest points.
    ///
    /// `nbright` is clamped to the list length. Every combination of three
    /// distinct ranks yields one triangle, so there are `C(nbright, 3)` in
    /// total. With `max_ba_ratio` set, triangles whose `b/a` exceeds it fall
    /// outside the usable prefix.
    pub fn build(points: &[Point], nbright: usize, max_ba_ratio: Option<f64>) -> Self {
        let n = nbright.min(points.len());
        let source_indices: Vec<usize> = brightness_order(points).into_iter().take(n).collect();
        let bright: Vec<Point> = source_indices
            .iter()
            .enumerate()
            .map(|(rank, &src)| Point {
                rank: Some(rank),
                ..points[src]
            })
            .collect();

        let mut dist = vec![0.0f64; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = (bright[i].pos - bright[j].pos).length();
                dist[i * n + j] = d;
                dist[j * n + i] = d;
            }
        }

        let mut triangles = Vec::with_capacity(triangle_count(n));
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    triangles.push(Triangle::new(
                        [i, j, k],
                        [bright[i].pos, bright[j].pos, bright[k].pos],
                        |p, q| dist[p * n + q],
                    ));
                }
            }
        }

        triangles.sort_by(|x, y| x.ba.total_cmp(&y.ba));

        let usable = match max_ba_ratio {
            Some(max_ba) => triangles.partition_point(|t| t.ba <= max_ba),
            None => triangles.len(),
        };

        tracing::debug!(
            points = n,
            triangles = triangles.len(),
            usable,
            "built triangle set"
        );

        Self {
            points: bright,
            source_indices,
            triangles,
            usable,
        }
    }

    /// Triangles that survived pruning, sorted by `ba`.
    #[inline]
    pub fn usable(&self) -> &[Triangle] {
        &self.triangles[..self.usable]
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }
}

/// `C(n, 3)`.
pub fn triangle_count(n: usize) -> usize {
    if n < 3 { 0 } else { n * (n - 1) * (n - 2) / 6 }
}
