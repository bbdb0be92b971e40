//! 16.16 fixed-point coordinates.
//!
//! Every coordinate the profile builder touches is a [`Fixed`]: a signed
//! 64-bit integer holding `floor(real * 65536)`. Pixel row `i` is sampled at
//! its centre, `i + 0.5`, so the low 16 bits carry the sub-pixel fraction and
//! the half unit acts as the sampling bias.
//!
//! All arithmetic saturates. Coordinates coming from floats are clamped to
//! [`Fixed::LIMIT`], which leaves enough headroom that a difference of two
//! coordinates times [`Fixed::ONE`] still fits in 64 bits.

use core::ops::{Add, Neg, Sub};

/// Number of fractional bits.
pub const FIXED_SHIFT: u32 = 16;
/// Mask selecting the fractional bits.
pub const FIXED_MASK: i64 = (1 << FIXED_SHIFT) - 1;

/// Signed 16.16 fixed-point number stored in an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i64);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << FIXED_SHIFT);
    pub const HALF: Fixed = Fixed(1 << (FIXED_SHIFT - 1));
    pub const MAX: Fixed = Fixed(i64::MAX);
    pub const MIN: Fixed = Fixed(i64::MIN);
    /// Largest magnitude produced by [`Fixed::from_f64`] (2^30 pixels).
    pub const LIMIT: i64 = 1 << 46;

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Fixed(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Integer pixel coordinate.
    #[inline]
    pub fn from_int(v: i32) -> Self {
        Fixed((v as i64) << FIXED_SHIFT)
    }

    /// Convert from floating point, flooring and clamping to `±LIMIT`.
    /// NaN maps to zero.
    #[inline]
    pub fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            return Fixed::ZERO;
        }
        let scaled = (v * (1u64 << FIXED_SHIFT) as f64).floor();
        if scaled >= Self::LIMIT as f64 {
            Fixed(Self::LIMIT)
        } else if scaled <= -(Self::LIMIT as f64) {
            Fixed(-Self::LIMIT)
        } else {
            Fixed(scaled as i64)
        }
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u64 << FIXED_SHIFT) as f64
    }

    /// Largest integer not greater than the value.
    #[inline]
    pub fn floor(self) -> i64 {
        self.0 >> FIXED_SHIFT
    }

    /// Smallest integer not less than the value.
    #[inline]
    pub fn ceil(self) -> i64 {
        (self.0 >> FIXED_SHIFT) + ((self.0 & FIXED_MASK) != 0) as i64
    }

    /// Fractional part in `[0, ONE)`.
    #[inline]
    pub fn frac(self) -> Fixed {
        Fixed(self.0 & FIXED_MASK)
    }

    #[inline]
    pub fn abs(self) -> Fixed {
        Fixed(self.0.saturating_abs())
    }

    #[inline]
    pub fn saturating_add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(rhs.0))
    }

    /// `self * num / den`, floored, saturating, never dividing by zero.
    #[inline]
    pub fn mul_div(self, num: Fixed, den: Fixed) -> Fixed {
        Fixed(mul_div(self.0, num.0, den.0))
    }

    /// Centre of pixel row (or column) `index`.
    #[inline]
    pub fn center(index: i64) -> Fixed {
        Fixed(
            index
                .saturating_mul(1 << FIXED_SHIFT)
                .saturating_add(Self::HALF.0),
        )
    }

    /// Index of the first row whose centre is at or after this coordinate.
    #[inline]
    pub fn first_center(self) -> i64 {
        let shifted = self.0.saturating_sub(Self::HALF.0);
        (shifted >> FIXED_SHIFT) + ((shifted & FIXED_MASK) != 0) as i64
    }

    /// Coverage of the pixel starting at this coordinate's floor, given the
    /// shape begins here (`1 - frac`), in 1/65536 units.
    #[inline]
    pub fn leading_coverage(self) -> i64 {
        Self::ONE.0 - (self.0 & FIXED_MASK)
    }

    /// Coverage of the pixel containing the end of a shape (`frac`).
    #[inline]
    pub fn trailing_coverage(self) -> i64 {
        self.0 & FIXED_MASK
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        self.saturating_add(rhs)
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        self.saturating_sub(rhs)
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

/// Saturating `floor(a * b / c)`.
///
/// The product is formed in 128 bits, so only the final quotient can
/// overflow; it is clamped to the `i64` range. A zero divisor yields
/// `i64::MAX` or `i64::MIN` following the sign of the product (zero for a
/// zero product).
pub fn mul_div(a: i64, b: i64, c: i64) -> i64 {
    let num = a as i128 * b as i128;
    if c == 0 {
        return match num.signum() {
            1 => i64::MAX,
            -1 => i64::MIN,
            _ => 0,
        };
    }
    let (n, d) = if c < 0 {
        (-num, -(c as i128))
    } else {
        (num, c as i128)
    };
    let q = n.div_euclid(d);
    if q > i64::MAX as i128 {
        i64::MAX
    } else if q < i64::MIN as i128 {
        i64::MIN
    } else {
        q as i64
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64() {
        assert_eq!(Fixed::from_f64(1.0), Fixed::ONE);
        assert_eq!(Fixed::from_f64(0.5), Fixed::HALF);
        assert_eq!(Fixed::from_f64(-0.5).raw(), -32768);
        assert_eq!(Fixed::from_f64(f64::NAN), Fixed::ZERO);
        assert_eq!(Fixed::from_f64(f64::INFINITY).raw(), Fixed::LIMIT);
        assert_eq!(Fixed::from_f64(f64::NEG_INFINITY).raw(), -Fixed::LIMIT);
    }

    #[test]
    fn test_floor_ceil_frac() {
        let v = Fixed::from_f64(2.25);
        assert_eq!(v.floor(), 2);
        assert_eq!(v.ceil(), 3);
        assert_eq!(v.frac(), Fixed::from_f64(0.25));

        let n = Fixed::from_f64(-2.25);
        assert_eq!(n.floor(), -3);
        assert_eq!(n.ceil(), -2);
        assert_eq!(n.frac(), Fixed::from_f64(0.75));

        assert_eq!(Fixed::from_int(4).ceil(), 4);
    }

    #[test]
    fn test_first_center() {
        // Row 3's centre is 3.5.
        assert_eq!(Fixed::from_f64(3.5).first_center(), 3);
        assert_eq!(Fixed::from_f64(3.25).first_center(), 3);
        assert_eq!(Fixed::from_f64(3.75).first_center(), 4);
        assert_eq!(Fixed::from_f64(3.0).first_center(), 3);
        assert_eq!(Fixed::from_f64(-0.25).first_center(), 0);
        assert_eq!(Fixed::from_f64(-0.75).first_center(), -1);
        assert_eq!(Fixed::center(3), Fixed::from_f64(3.5));
    }

    #[test]
    fn test_coverage_helpers() {
        let x = Fixed::from_f64(10.25);
        assert_eq!(x.leading_coverage(), 49152);
        assert_eq!(x.trailing_coverage(), 16384);
        assert_eq!(Fixed::from_int(7).leading_coverage(), Fixed::ONE.raw());
        assert_eq!(Fixed::from_int(7).trailing_coverage(), 0);
    }

    #[test]
    fn test_mul_div_basic() {
        assert_eq!(mul_div(6, 4, 3), 8);
        assert_eq!(mul_div(7, 1, 2), 3);
        assert_eq!(mul_div(-7, 1, 2), -4);
        assert_eq!(mul_div(7, 1, -2), -4);
        assert_eq!(mul_div(-7, 1, -2), 3);
    }

    #[test]
    fn test_mul_div_zero_divisor() {
        assert_eq!(mul_div(5, 5, 0), i64::MAX);
        assert_eq!(mul_div(-5, 5, 0), i64::MIN);
        assert_eq!(mul_div(0, 5, 0), 0);
    }

    #[test]
    fn test_mul_div_saturates() {
        assert_eq!(mul_div(i64::MAX, i64::MAX, 1), i64::MAX);
        assert_eq!(mul_div(i64::MIN, i64::MAX, 1), i64::MIN);
        assert_eq!(mul_div(i64::MIN, -1, 1), i64::MAX);
        assert_eq!(mul_div(i64::MAX, i64::MAX, i64::MAX), i64::MAX);
    }

    #[test]
    fn test_saturating_ops() {
        assert_eq!(Fixed::MAX + Fixed::ONE, Fixed::MAX);
        assert_eq!(Fixed::MIN - Fixed::ONE, Fixed::MIN);
        assert_eq!(-Fixed::MIN, Fixed::MAX);
        assert_eq!(Fixed::MIN.abs(), Fixed::MAX);
    }

    quickcheck::quickcheck! {
        fn prop_mul_div_matches_floor_division(a: i32, b: i32, c: i32) -> bool {
            if c == 0 {
                return true;
            }
            let n = a as i128 * b as i128;
            let expected = if c < 0 {
                (-n).div_euclid(-(c as i128))
            } else {
                n.div_euclid(c as i128)
            };
            mul_div(a as i64, b as i64, c as i64) as i128 == expected
        }

        fn prop_mul_div_sign_follows_operands(a: i64, b: i64, c: i64) -> bool {
            let q = mul_div(a, b, c);
            let n = a as i128 * b as i128;
            if n == 0 {
                q == 0
            } else if (n > 0) == (c >= 0) {
                q >= 0
            } else {
                q < 0
            }
        }

        fn prop_from_f64_stays_in_limit(v: f64) -> bool {
            Fixed::from_f64(v).raw().abs() <= Fixed::LIMIT
        }

        fn prop_floor_frac_reassemble(raw: i64) -> bool {
            let raw = raw >> 2;
            let v = Fixed::from_raw(raw);
            (v.floor() << FIXED_SHIFT) + v.frac().raw() == raw
        }

        fn prop_first_center_is_first(raw: i32) -> bool {
            let y = Fixed::from_raw(raw as i64);
            let row = y.first_center();
            Fixed::center(row) >= y && Fixed::center(row - 1) < y
        }
    }
}
