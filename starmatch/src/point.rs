//! Point model for matching.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A detected or catalogued point with a stable identifier.
///
/// Only `match_id` and `rank` change after construction; both are bookkeeping
/// written by the matcher on the copies it hands back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Caller supplied identifier, stable across matching.
    pub id: u64,
    /// Position in the point list's own coordinate system.
    pub pos: DVec2,
    /// Magnitude. Smaller is brighter.
    pub magnitude: f64,
    /// Optional color index carried through untouched.
    pub color_index: Option<f64>,
    /// Identifier of the partner point once matched.
    pub match_id: Option<u64>,
    /// 0-based brightness rank, set when the point is sorted by magnitude.
    pub rank: Option<usize>,
}

impl Point {
    pub fn new(id: u64, x: f64, y: f64, magnitude: f64) -> Self {
        Self {
            id,
            pos: DVec2::new(x, y),
            magnitude,
            color_index: None,
            match_id: None,
            rank: None,
        }
    }

    pub fn with_color_index(mut self, color_index: f64) -> Self {
        self.color_index = Some(color_index);
        self
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.pos.y
    }

    /// Copy of this point moved to `pos`, bookkeeping preserved.
    #[inline]
    pub fn with_pos(&self, pos: DVec2) -> Self {
        Self { pos, ..*self }
    }
}

/// Indices of `points` sorted by ascending magnitude (brightest first).
///
/// The sort is stable so equal magnitudes keep their input order.
pub(crate) fn brightness_order(points: &[Point]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[a].magnitude.total_cmp(&points[b].magnitude));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_order_is_stable() {
        let points = vec![
            Point::new(0, 0.0, 0.0, 12.0),
            Point::new(1, 1.0, 0.0, 9.5),
            Point::new(2, 2.0, 0.0, 12.0),
            Point::new(3, 3.0, 0.0, 7.0),
        ];
        assert_eq!(brightness_order(&points), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_with_pos_keeps_bookkeeping() {
        let mut p = Point::new(42, 1.0, 2.0, 10.0).with_color_index(0.65);
        p.match_id = Some(7);
        p.rank = Some(3);

        let moved = p.with_pos(DVec2::new(5.0, 6.0));
        assert_eq!(moved.id, 42);
        assert_eq!(moved.match_id, Some(7));
        assert_eq!(moved.rank, Some(3));
        assert_eq!(moved.color_index, Some(0.65));
        assert_eq!(moved.x(), 5.0);
        assert_eq!(moved.y(), 6.0);
    }
}
