//! Affine transformation matrix.
//!
//! The painter's current transform. Contours, rectangles and arc centres are
//! multiplied by it in the transform stage, right before rasterization.

use crate::contour::Point;

/// Epsilon for affine matrix comparisons.
pub const AFFINE_EPSILON: f64 = 1e-14;

/// 2D affine transformation matrix.
///
/// Stores six components: `[sx, shy, shx, sy, tx, ty]` representing the
/// matrix:
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// Transform: `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
#[derive(Debug, Clone, Copy)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl TransAffine {
    /// Identity matrix.
    pub const IDENTITY: TransAffine = TransAffine {
        sx: 1.0,
        shy: 0.0,
        shx: 0.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Identity matrix.
    pub fn new() -> Self {
        Self::IDENTITY
    }

    /// Custom matrix from six components.
    pub fn new_custom(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    /// Rotation matrix.
    pub fn new_rotation(a: f64) -> Self {
        let (sa, ca) = a.sin_cos();
        Self::new_custom(ca, sa, -sa, ca, 0.0, 0.0)
    }

    /// Non-uniform scaling matrix.
    pub fn new_scaling(x: f64, y: f64) -> Self {
        Self::new_custom(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    /// Translation matrix.
    pub fn new_translation(x: f64, y: f64) -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, x, y)
    }

    // ====================================================================
    // Operations (mutate self)
    // ====================================================================

    /// Reset to identity.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::IDENTITY;
        self
    }

    /// Translate the output.
    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.tx += x;
        self.ty += y;
        self
    }

    /// Rotate the output by angle `a` (radians).
    pub fn rotate(&mut self, a: f64) -> &mut Self {
        self.multiply(&Self::new_rotation(a))
    }

    /// Scale the output.
    pub fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.sx *= x;
        self.shx *= x;
        self.tx *= x;
        self.shy *= y;
        self.sy *= y;
        self.ty *= y;
        self
    }

    /// Post-multiply: apply `self`, then `m`.
    pub fn multiply(&mut self, m: &TransAffine) -> &mut Self {
        let t0 = self.sx * m.sx + self.shy * m.shx;
        let t2 = self.shx * m.sx + self.sy * m.shx;
        let t4 = self.tx * m.sx + self.ty * m.shx + m.tx;
        self.shy = self.sx * m.shy + self.shy * m.sy;
        self.sy = self.shx * m.shy + self.sy * m.sy;
        self.ty = self.tx * m.shy + self.ty * m.sy + m.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    /// Pre-multiply: apply `m`, then `self`.
    pub fn premultiply(&mut self, m: &TransAffine) -> &mut Self {
        let mut t = *m;
        t.multiply(self);
        *self = t;
        self
    }

    /// Invert the matrix in place. A singular matrix becomes non-finite.
    pub fn invert(&mut self) -> &mut Self {
        let d = 1.0 / self.determinant();
        let t0 = self.sy * d;
        self.sy = self.sx * d;
        self.shy = -self.shy * d;
        self.shx = -self.shx * d;
        let t4 = -self.tx * t0 - self.ty * self.shx;
        self.ty = -self.tx * self.shy - self.ty * self.sy;
        self.sx = t0;
        self.tx = t4;
        self
    }

    // ====================================================================
    // Transformations
    // ====================================================================

    /// Forward transform of a point.
    #[inline]
    pub fn transform(&self, p: Point) -> Point {
        Point::new(
            p.x * self.sx + p.y * self.shx + self.tx,
            p.x * self.shy + p.y * self.sy + self.ty,
        )
    }

    /// Forward transform without translation (for vectors).
    #[inline]
    pub fn transform_2x2(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + p.y * self.shx, p.x * self.shy + p.y * self.sy)
    }

    // ====================================================================
    // Auxiliary
    // ====================================================================

    /// Determinant of the 2x2 portion.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    /// Average scale factor, used to size pen widths in device space.
    pub fn get_scale(&self) -> f64 {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let x = s * self.sx + s * self.shx;
        let y = s * self.shy + s * self.sy;
        (x * x + y * y).sqrt()
    }

    /// Largest stretch the matrix applies to any direction, an upper bound
    /// on how much device-space error grows relative to user space.
    pub fn max_scale(&self) -> f64 {
        let a = self.sx * self.sx + self.shy * self.shy;
        let b = self.sx * self.shx + self.shy * self.sy;
        let c = self.shx * self.shx + self.sy * self.sy;
        let mid = (a + c) * 0.5;
        let rad = (((a - c) * 0.5).powi(2) + b * b).sqrt();
        (mid + rad).sqrt()
    }

    /// `true` when the matrix maps axis-aligned boxes to axis-aligned boxes
    /// (no rotation other than multiples of 90 degrees, no shear).
    pub fn is_axis_preserving(&self, epsilon: f64) -> bool {
        (self.shx.abs() <= epsilon && self.shy.abs() <= epsilon)
            || (self.sx.abs() <= epsilon && self.sy.abs() <= epsilon)
    }

    /// `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.sx.is_finite()
            && self.shy.is_finite()
            && self.shx.is_finite()
            && self.sy.is_finite()
            && self.tx.is_finite()
            && self.ty.is_finite()
    }

    /// Check if this is an identity matrix.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.is_equal(&Self::IDENTITY, epsilon)
    }

    /// Check if two matrices are equal within epsilon.
    pub fn is_equal(&self, m: &TransAffine, epsilon: f64) -> bool {
        (self.sx - m.sx).abs() <= epsilon
            && (self.shy - m.shy).abs() <= epsilon
            && (self.shx - m.shx).abs() <= epsilon
            && (self.sy - m.sy).abs() <= epsilon
            && (self.tx - m.tx).abs() <= epsilon
            && (self.ty - m.ty).abs() <= epsilon
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TransAffine {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other, AFFINE_EPSILON)
    }
}

impl std::ops::Mul for TransAffine {
    type Output = TransAffine;
    fn mul(self, rhs: TransAffine) -> TransAffine {
        let mut result = self;
        result.multiply(&rhs);
        result
    }
}

impl std::ops::MulAssign for TransAffine {
    fn mul_assign(&mut self, rhs: TransAffine) {
        self.multiply(&rhs);
    }
}

// ============================================================================
// Tests
// ============================================================================
