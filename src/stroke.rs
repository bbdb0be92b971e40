//! Stroke-to-polyline conversion.
//!
//! Strokes do not go through the profile rasterizer. Each device-space
//! primitive becomes integer pixel polylines handed to the sink's stroke
//! primitives, which backends may draw natively. Closed axis-aligned
//! rectangles become a single `draw_rectangle` call.
//!
//! Curves are sampled uniformly: a segment whose control box spans `d`
//! pixels on its longer side gets `2 + 2 * d` samples, capped at
//! [`MAX_CURVE_SAMPLES`].

use crate::basics::{iround, RectI};
use crate::color::Rgba8;
use crate::contour::{Contour, Point, Segment};
use crate::sink::Sink;
use crate::trans_affine::TransAffine;
use crate::transform::DevicePrimitive;

/// Upper bound on samples for one curved segment.
pub const MAX_CURVE_SAMPLES: usize = 4096;

/// Distance under which a contour's end counts as its start.
const CLOSE_EPSILON: f64 = 1e-9;

/// Stroke color and width in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Rgba8,
    pub width: f64,
}

impl Pen {
    pub const fn new(color: Rgba8, width: f64) -> Self {
        Self { color, width }
    }

    /// Device width in whole pixels under `matrix`, never below one.
    pub fn pixel_width(&self, matrix: &TransAffine) -> u32 {
        let w = self.width * matrix.get_scale();
        if !w.is_finite() || w < 1.0 {
            return 1;
        }
        iround(w).max(1) as u32
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Rgba8::BLACK, 1.0)
    }
}

// ============================================================================
// Sampling
// ============================================================================

#[inline]
fn pixel(p: Point) -> (i32, i32) {
    (iround(p.x), iround(p.y))
}

#[inline]
fn push_dedup(out: &mut Vec<(i32, i32)>, p: (i32, i32)) {
    if out.last() != Some(&p) {
        out.push(p);
    }
}

fn sample_count(from: Point, seg: &Segment) -> usize {
    let (mut x1, mut y1, mut x2, mut y2) = (from.x, from.y, from.x, from.y);
    seg.for_each_point(|p| {
        x1 = x1.min(p.x);
        y1 = y1.min(p.y);
        x2 = x2.max(p.x);
        y2 = y2.max(p.y);
    });
    let d = (x2 - x1).max(y2 - y1);
    if !d.is_finite() {
        return MAX_CURVE_SAMPLES;
    }
    (2.0 + 2.0 * d.ceil()).min(MAX_CURVE_SAMPLES as f64) as usize
}

fn conic_point(p0: Point, c: Point, p1: Point, t: f64) -> Point {
    p0.lerp(c, t).lerp(c.lerp(p1, t), t)
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let a = p0.lerp(c1, t);
    let b = c1.lerp(c2, t);
    let c = c2.lerp(p1, t);
    a.lerp(b, t).lerp(b.lerp(c, t), t)
}

/// Append the pixel polyline of `contour` to `out`, dropping repeated
/// points. Returns `true` when the contour ends where it started, in which
/// case the closing point is left off.
pub fn contour_polyline(contour: &Contour, out: &mut Vec<(i32, i32)>) -> bool {
    let first = out.len();
    push_dedup(out, pixel(contour.start()));
    for (from, seg) in contour.iter_from() {
        match *seg {
            Segment::Line(p) => push_dedup(out, pixel(p)),
            Segment::Conic(c, p) => {
                let n = sample_count(from, seg);
                for i in 1..=n {
                    let t = i as f64 / n as f64;
                    push_dedup(out, pixel(conic_point(from, c, p, t)));
                }
            }
            Segment::Cubic(c1, c2, p) => {
                let n = sample_count(from, seg);
                for i in 1..=n {
                    let t = i as f64 / n as f64;
                    push_dedup(out, pixel(cubic_point(from, c1, c2, p, t)));
                }
            }
        }
    }
    let closed = contour.is_closed(CLOSE_EPSILON);
    if closed && out.len() - first > 1 && out.last() == out.get(first) {
        out.pop();
    }
    closed
}

// ============================================================================
// Stroking
// ============================================================================

/// Stroke one device primitive. Text and pixmaps are not strokes and are
/// ignored. Returns the number of sink calls made.
pub fn stroke_primitive<S: Sink + ?Sized>(
    prim: &DevicePrimitive<'_>,
    width: u32,
    color: Rgba8,
    clip: RectI,
    sink: &mut S,
) -> usize {
    match prim {
        DevicePrimitive::Rect(r) => {
            // A filled pixel rect covers x1..=x2; its border runs along x2 + 1.
            let outline = RectI::new(r.x1, r.y1, r.x2.saturating_add(1), r.y2.saturating_add(1));
            sink.draw_rectangle(outline, width, color, clip);
            1
        }
        DevicePrimitive::Contours(set) => {
            let mut calls = 0;
            let mut points = Vec::new();
            for c in set {
                if c.is_closed(CLOSE_EPSILON) {
                    if let Some(r) = c.axis_aligned_rect(CLOSE_EPSILON) {
                        let rect = RectI::new(iround(r.x1), iround(r.y1), iround(r.x2), iround(r.y2));
                        sink.draw_rectangle(rect, width, color, clip);
                        calls += 1;
                        continue;
                    }
                }
                points.clear();
                let closed = contour_polyline(c, &mut points);
                if points.is_empty() {
                    continue;
                }
                sink.draw_polyline(&points, width, color, closed, clip);
                calls += 1;
            }
            calls
        }
        DevicePrimitive::Text { .. } | DevicePrimitive::Pixmap { .. } => 0,
    }
}

// ============================================================================
// Tests
// ============================================================================
