//! Colors and the integer blending arithmetic used by fills.
//!
//! The painter is opaque to color beyond straight (non-premultiplied) RGBA
//! with 8 bits per channel. Partial coverage is applied by scaling the alpha
//! channel; blending is a linear interpolation toward the fill color.

use crate::basics::{CoverType, COVER_FULL};
use crate::fixed::FIXED_SHIFT;

/// RGBA color with u8 components, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == Self::BASE_MASK as u8
    }

    /// Fixed-point multiply, exact over u8.
    /// `(a * b + 128) >> 8`, with rounding correction.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Multiply a color component by a cover.
    #[inline]
    pub fn mult_cover(a: u8, cover: CoverType) -> u8 {
        Self::multiply(a, cover)
    }

    /// Interpolate `p` toward `q` by `a`; `a == 255` yields exactly `q`.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }

    /// This color with its alpha scaled by an 8-bit cover.
    #[inline]
    pub fn covered(self, cover: CoverType) -> Self {
        if cover == COVER_FULL {
            return self;
        }
        self.with_alpha(Self::mult_cover(self.a, cover))
    }

    /// Blend `self` over `dst`, returning the new destination pixel.
    #[inline]
    pub fn blend_over(self, dst: Rgba8) -> Rgba8 {
        match self.a {
            0 => dst,
            255 => self,
            alpha => Rgba8::new(
                Self::lerp(dst.r, self.r, alpha),
                Self::lerp(dst.g, self.g, alpha),
                Self::lerp(dst.b, self.b, alpha),
                Self::lerp(dst.a, 255, alpha),
            ),
        }
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Convert a 16.16 coverage fraction (`0..=65536`) into an 8-bit cover,
/// rounding to nearest.
#[inline]
pub fn cover_from_fixed(coverage: i64) -> CoverType {
    let c = coverage.clamp(0, 1 << FIXED_SHIFT);
    ((c * COVER_FULL as i64 + (1 << (FIXED_SHIFT - 1))) >> FIXED_SHIFT) as CoverType
}

// ============================================================================
// Tests
// ============================================================================
