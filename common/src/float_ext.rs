/// Approximate comparison for floating point values.
pub trait FloatExt: Copy {
    /// Absolute comparison against [`crate::EPSILON`].
    fn approximately_eq(self, other: Self) -> bool;

    /// Absolute comparison against a caller supplied tolerance.
    fn approx_eq_within(self, other: Self, tolerance: Self) -> bool;

    /// Wraps an angle in degrees into `(-180, 180]`.
    fn wrap_degrees(self) -> Self;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        self.approx_eq_within(other, crate::EPSILON as f32)
    }

    fn approx_eq_within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() < tolerance
    }

    fn wrap_degrees(self) -> Self {
        let mut a = self % 360.0;
        if a <= -180.0 {
            a += 360.0;
        } else if a > 180.0 {
            a -= 360.0;
        }
        a
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        self.approx_eq_within(other, crate::EPSILON)
    }

    fn approx_eq_within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() < tolerance
    }

    fn wrap_degrees(self) -> Self {
        let mut a = self % 360.0;
        if a <= -180.0 {
            a += 360.0;
        } else if a > 180.0 {
            a -= 360.0;
        }
        a
    }
}
