//! Polynomial coordinate transforms between two point lists.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Largest number of polynomial terms per output axis.
pub const MAX_TERMS: usize = 8;

/// Polynomial degree of the coordinate mapping.
///
/// Per output axis the basis is:
///
/// | Order | Terms |
/// |-------|-------|
/// | Linear | `1, x, y` |
/// | Quadratic | `1, x, y, x², xy, y²` |
/// | Cubic | `1, x, y, x², xy, y², x·r², y·r²` with `r² = x² + y²` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransformOrder {
    #[default]
    Linear,
    Quadratic,
    Cubic,
}

impl TransformOrder {
    /// Order from a polynomial degree (1, 2 or 3).
    pub fn from_degree(degree: u8) -> Option<Self> {
        match degree {
            1 => Some(TransformOrder::Linear),
            2 => Some(TransformOrder::Quadratic),
            3 => Some(TransformOrder::Cubic),
            _ => None,
        }
    }

    pub fn degree(&self) -> u8 {
        match self {
            TransformOrder::Linear => 1,
            TransformOrder::Quadratic => 2,
            TransformOrder::Cubic => 3,
        }
    }

    /// Number of basis terms per output axis.
    pub fn terms(&self) -> usize {
        match self {
            TransformOrder::Linear => 3,
            TransformOrder::Quadratic => 6,
            TransformOrder::Cubic => 8,
        }
    }

    /// Total number of coefficients for both axes.
    pub fn coefficient_count(&self) -> usize {
        2 * self.terms()
    }

    /// Minimum number of point pairs that determine this transform.
    pub fn min_pairs(&self) -> usize {
        self.terms()
    }
}

/// Evaluate the polynomial basis of `order` at `p`. Unused slots are zero.
#[inline]
pub(crate) fn basis(order: TransformOrder, p: DVec2) -> [f64; MAX_TERMS] {
    let (x, y) = (p.x, p.y);
    match order {
        TransformOrder::Linear => [1.0, x, y, 0.0, 0.0, 0.0, 0.0, 0.0],
        TransformOrder::Quadratic => [1.0, x, y, x * x, x * y, y * y, 0.0, 0.0],
        TransformOrder::Cubic => {
            let r2 = x * x + y * y;
            [1.0, x, y, x * x, x * y, y * y, x * r2, y * r2]
        }
    }
}

/// A fitted polynomial mapping from list A coordinates to list B coordinates,
/// together with the quality statistics of the fit.
///
/// ```text
/// x' = Σ x_coeffs[i] · basis[i](x, y)
/// y' = Σ y_coeffs[i] · basis[i](x, y)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub order: TransformOrder,
    /// Coefficients of the x output. Only the first `order.terms()` are used.
    pub x_coeffs: [f64; MAX_TERMS],
    /// Coefficients of the y output. Only the first `order.terms()` are used.
    pub y_coeffs: [f64; MAX_TERMS],
    /// Pairs that survived outlier rejection in the final fit.
    pub pairs_used: usize,
    /// Pairs found by proximity matching with this transform.
    pub pairs_matched: usize,
    /// 68.3rd percentile residual distance of the pairs used.
    pub sigma: f64,
    /// Standard deviation of the x residuals of the pairs used.
    pub sigma_x: f64,
    /// Standard deviation of the y residuals of the pairs used.
    pub sigma_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity(TransformOrder::Linear)
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shift = self.apply(DVec2::ZERO);
        write!(
            f,
            "{:?}(dx={:.2}, dy={:.2}, rot={:.3}°, scale={:.4}, sigma={:.3}, pairs={}/{})",
            self.order,
            shift.x,
            shift.y,
            self.rotation_deg(),
            self.scale_factor(),
            self.sigma,
            self.pairs_used,
            self.pairs_matched
        )
    }
}

impl Transform {
    /// Identity mapping of the given order with zeroed statistics.
    pub fn identity(order: TransformOrder) -> Self {
        let mut x_coeffs = [0.0; MAX_TERMS];
        let mut y_coeffs = [0.0; MAX_TERMS];
        x_coeffs[1] = 1.0;
        y_coeffs[2] = 1.0;
        Self::from_coeffs(order, x_coeffs, y_coeffs)
    }

    /// Transform from raw coefficient blocks with zeroed statistics.
    ///
    /// Coefficients beyond `order.terms()` are cleared.
    pub fn from_coeffs(
        order: TransformOrder,
        mut x_coeffs: [f64; MAX_TERMS],
        mut y_coeffs: [f64; MAX_TERMS],
    ) -> Self {
        for i in order.terms()..MAX_TERMS {
            x_coeffs[i] = 0.0;
            y_coeffs[i] = 0.0;
        }
        Self {
            order,
            x_coeffs,
            y_coeffs,
            pairs_used: 0,
            pairs_matched: 0,
            sigma: 0.0,
            sigma_x: 0.0,
            sigma_y: 0.0,
        }
    }

    /// Linear transform that rotates by `angle_deg`, scales by `scale`, then shifts.
    pub fn similarity(shift: DVec2, angle_deg: f64, scale: f64) -> Self {
        let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
        let mut x_coeffs = [0.0; MAX_TERMS];
        let mut y_coeffs = [0.0; MAX_TERMS];
        x_coeffs[..3].copy_from_slice(&[shift.x, scale * cos_a, -scale * sin_a]);
        y_coeffs[..3].copy_from_slice(&[shift.y, scale * sin_a, scale * cos_a]);
        Self::from_coeffs(TransformOrder::Linear, x_coeffs, y_coeffs)
    }

    /// The active coefficients: the x block followed by the y block
    /// (6, 12 or 16 values).
    pub fn coefficients(&self) -> Vec<f64> {
        let n = self.order.terms();
        self.x_coeffs[..n]
            .iter()
            .chain(self.y_coeffs[..n].iter())
            .copied()
            .collect()
    }

    /// Map a point from list A coordinates into list B coordinates.
    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        let b = basis(self.order, p);
        let n = self.order.terms();
        let mut out = DVec2::ZERO;
        for i in 0..n {
            out.x += self.x_coeffs[i] * b[i];
            out.y += self.y_coeffs[i] * b[i];
        }
        out
    }

    /// The 2x2 linear part `[[∂x'/∂x, ∂x'/∂y], [∂y'/∂x, ∂y'/∂y]]` at the origin.
    pub fn linear_part(&self) -> [[f64; 2]; 2] {
        [
            [self.x_coeffs[1], self.x_coeffs[2]],
            [self.y_coeffs[1], self.y_coeffs[2]],
        ]
    }

    /// Determinant of the linear part. Negative for mirrored mappings.
    pub fn determinant(&self) -> f64 {
        let [[a, b], [c, d]] = self.linear_part();
        a * d - b * c
    }

    /// Mean scale of the linear part, `sqrt(|det|)`.
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// Rotation of the linear part in degrees, in `(-180, 180]`.
    ///
    /// Shear is averaged out, so for similarity transforms this is the exact angle.
    pub fn rotation_deg(&self) -> f64 {
        let [[a, b], [c, d]] = self.linear_part();
        (c - b).atan2(a + d).to_degrees()
    }

    /// True when all coefficients are finite and the linear part is not degenerate.
    pub fn is_valid(&self) -> bool {
        let n = self.order.terms();
        let finite = self.x_coeffs[..n]
            .iter()
            .chain(self.y_coeffs[..n].iter())
            .all(|v| v.is_finite());
        let det = self.determinant();
        finite && det.abs() > 1e-12
    }

    /// Inverse of a linear transform. `None` for higher orders or a singular
    /// linear part.
    pub fn inverse(&self) -> Option<Self> {
        if self.order != TransformOrder::Linear {
            return None;
        }
        let det = self.determinant();
        if det.abs() < 1e-12 || !det.is_finite() {
            return None;
        }
        let [[a, b], [c, d]] = self.linear_part();
        let (tx, ty) = (self.x_coeffs[0], self.y_coeffs[0]);
        let (ia, ib, ic, id) = (d / det, -b / det, -c / det, a / det);

        let mut x_coeffs = [0.0; MAX_TERMS];
        let mut y_coeffs = [0.0; MAX_TERMS];
        x_coeffs[..3].copy_from_slice(&[-(ia * tx + ib * ty), ia, ib]);
        y_coeffs[..3].copy_from_slice(&[-(ic * tx + id * ty), ic, id]);
        Some(Self::from_coeffs(TransformOrder::Linear, x_coeffs, y_coeffs))
    }
}
