//! Foundation types shared by every stage of the painter.
//!
//! Rounding helpers, the generic [`Rect`] used for clip boxes and device
//! rectangles, coverage constants, and the [`FillingRule`] that decides how
//! crossing edges resolve into spans.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round to the nearest integer, half away from zero.
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Floor toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

/// Ceiling as a signed integer.
#[inline]
pub fn iceil(v: f64) -> i32 {
    v.ceil() as i32
}

/// Round `v` to int, clamping to `[-limit, limit]`.
#[inline]
pub fn saturation_iround(limit: i32, v: f64) -> i32 {
    if v.is_nan() {
        return 0;
    }
    if v < -(limit as f64) {
        return -limit;
    }
    if v > limit as f64 {
        return limit;
    }
    iround(v)
}

/// `true` if `v` lies within `epsilon` of an integer.
#[inline]
pub fn is_integral(v: f64, epsilon: f64) -> bool {
    (v - v.round()).abs() <= epsilon
}

// ============================================================================
// Coverage constants
// ============================================================================

/// The type used for anti-aliasing coverage values.
pub type CoverType = u8;

pub const COVER_SHIFT: u32 = 8;
pub const COVER_SIZE: u32 = 1 << COVER_SHIFT;
pub const COVER_MASK: u32 = COVER_SIZE - 1;
pub const COVER_NONE: CoverType = 0;
pub const COVER_FULL: CoverType = COVER_MASK as CoverType;

// ============================================================================
// Filling rule
// ============================================================================

/// How the sweep turns a row of edge crossings into spans.
///
/// Ascending edges count `+1`, descending edges `-1`. A pixel run is inside
/// when the running winding is non-zero (`NonZero`) or odd (`EvenOdd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillingRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillingRule {
    /// Whether a running winding number counts as inside.
    #[inline]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillingRule::NonZero => winding != 0,
            FillingRule::EvenOdd => winding & 1 != 0,
        }
    }
}

// ============================================================================
// Mathematical constants
// ============================================================================

pub const PI: f64 = std::f64::consts::PI;

/// Convert degrees to radians.
#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by two corner points.
///
/// Integer rectangles are inclusive on both ends: `RectI::new(0, 0, 9, 9)` is
/// a 10x10 pixel block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Normalize so that x1 <= x2 and y1 <= y2, swapping if needed.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// Clip this rectangle to the intersection with `r`.
    /// Returns `true` if the result is a valid (non-empty) rectangle.
    pub fn clip(&mut self, r: &Self) -> bool {
        if self.x2 > r.x2 {
            self.x2 = r.x2;
        }
        if self.y2 > r.y2 {
            self.y2 = r.y2;
        }
        if self.x1 < r.x1 {
            self.x1 = r.x1;
        }
        if self.y1 < r.y1 {
            self.y1 = r.y1;
        }
        self.is_valid()
    }

    /// Returns `true` if the rectangle is valid (non-empty).
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Returns `true` if the point (x, y) is inside the rectangle.
    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Returns `true` if this rectangle overlaps with `r`.
    pub fn overlaps(&self, r: &Self) -> bool {
        !(r.x1 > self.x2 || r.x2 < self.x1 || r.y1 > self.y2 || r.y2 < self.y1)
    }
}

/// Compute the intersection of two rectangles. The result may be invalid.
pub fn intersect_rectangles<T: Copy + PartialOrd>(r1: &Rect<T>, r2: &Rect<T>) -> Rect<T> {
    let mut r = *r1;
    r.clip(r2);
    r
}

/// Compute the union (bounding box) of two rectangles.
pub fn unite_rectangles<T: Copy + PartialOrd>(r1: &Rect<T>, r2: &Rect<T>) -> Rect<T> {
    let mut r = *r1;
    if r.x2 < r2.x2 {
        r.x2 = r2.x2;
    }
    if r.y2 < r2.y2 {
        r.y2 = r2.y2;
    }
    if r.x1 > r2.x1 {
        r.x1 = r2.x1;
    }
    if r.y1 > r2.y1 {
        r.y1 = r2.y1;
    }
    r
}

/// Rectangle with inclusive `i32` pixel coordinates.
pub type RectI = Rect<i32>;
/// Rectangle with `f64` coordinates.
pub type RectD = Rect<f64>;

impl RectI {
    /// The canonical empty rectangle (`x1 > x2`).
    pub const EMPTY: RectI = RectI {
        x1: 1,
        y1: 1,
        x2: 0,
        y2: 0,
    };

    /// A rectangle covering everything addressable.
    pub const UNBOUNDED: RectI = RectI {
        x1: i32::MIN / 2,
        y1: i32::MIN / 2,
        x2: i32::MAX / 2,
        y2: i32::MAX / 2,
    };

    /// Pixel rectangle covering a `width` x `height` surface.
    pub fn from_size(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::EMPTY;
        }
        RectI::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    /// Number of pixel columns (0 when invalid), saturating at `i32::MAX`.
    pub fn width(&self) -> i32 {
        if self.is_valid() {
            span_len(self.x1, self.x2)
        } else {
            0
        }
    }

    /// Number of pixel rows (0 when invalid), saturating at `i32::MAX`.
    pub fn height(&self) -> i32 {
        if self.is_valid() {
            span_len(self.y1, self.y2)
        } else {
            0
        }
    }

    /// Move the rectangle by an integer offset.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        RectI::new(
            self.x1.saturating_add(dx),
            self.y1.saturating_add(dy),
            self.x2.saturating_add(dx),
            self.y2.saturating_add(dy),
        )
    }
}

#[inline]
fn span_len(lo: i32, hi: i32) -> i32 {
    (i64::from(hi) - i64::from(lo) + 1).min(i64::from(i32::MAX)) as i32
}

impl RectD {
    /// Area of the rectangle (0 when degenerate).
    pub fn area(&self) -> f64 {
        let w = self.x2 - self.x1;
        let h = self.y2 - self.y1;
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
