use glam::DVec2;

/// A triangle over three points of one [`TriangleSet`](super::TriangleSet).
///
/// Sides are labelled longest to shortest, `a >= b >= c`. `a_index` is the
/// vertex opposite side `a`, and likewise for `b` and `c`. Vertices with the
/// same label in two similar triangles are candidate correspondences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a_index: usize,
    pub b_index: usize,
    pub c_index: usize,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// `b / a`, or 1.0 when `a` is zero.
    pub ba: f64,
    /// `c / a`, or 1.0 when `a` is zero.
    pub ca: f64,
    /// `c / b`, or 1.0 when `b` is zero.
    pub cb: f64,
    /// Direction of side `a`, from vertex `b_index` to vertex `c_index`, in degrees.
    pub orientation_deg: f64,
    /// Dot product of sides `a` and `b` as vectors from their shared vertex `c_index`.
    pub xt: f64,
    /// `1 / ca`, or 0.0 when `ca` is zero.
    pub yt: f64,
    /// Discriminant `xt * yt`.
    pub d: f64,
}

impl Triangle {
    /// Build from three distinct vertex indices and their positions.
    ///
    /// `dist(i, j)` must return the distance between vertices `i` and `j`.
    pub fn new(
        indices: [usize; 3],
        positions: [DVec2; 3],
        dist: impl Fn(usize, usize) -> f64,
    ) -> Self {
        let [i, j, k] = indices;

        // (side length, local vertex opposite it)
        let mut sides = [(dist(j, k), 0usize), (dist(k, i), 1), (dist(i, j), 2)];
        sides.sort_by(|x, y| y.0.total_cmp(&x.0));

        let (a, va) = sides[0];
        let (b, vb) = sides[1];
        let (c, vc) = sides[2];

        let ba = if a > 0.0 { b / a } else { 1.0 };
        let ca = if a > 0.0 { c / a } else { 1.0 };
        let cb = if b > 0.0 { c / b } else { 1.0 };

        let pa = positions[va];
        let pb = positions[vb];
        let pc = positions[vc];

        let side_a = pc - pb;
        let orientation_deg = side_a.y.atan2(side_a.x).to_degrees();

        let xt = (pa - pc).dot(pb - pc);
        let yt = if ca > 0.0 { 1.0 / ca } else { 0.0 };

        Self {
            a_index: indices[va],
            b_index: indices[vb],
            c_index: indices[vc],
            a,
            b,
            c,
            ba,
            ca,
            cb,
            orientation_deg,
            xt,
            yt,
            d: xt * yt,
        }
    }

    /// Vertex indices in label order `[a_index, b_index, c_index]`.
    #[inline]
    pub fn vertices(&self) -> [usize; 3] {
        [self.a_index, self.b_index, self.c_index]
    }

    /// Euclidean distance between the `(ba, ca)` shape coordinates.
    #[inline]
    pub fn shape_distance(&self, other: &Triangle) -> f64 {
        let dba = self.ba - other.ba;
        let dca = self.ca - other.ca;
        (dba * dba + dca * dca).sqrt()
    }
}
