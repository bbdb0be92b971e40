//! Contour model: a start point followed by line, quadratic and cubic
//! segments.
//!
//! A contour is continuous by construction since each segment only stores
//! the points after the current one. The rasterizer always treats contours as
//! closed; [`Contour::closed`] makes the closing edge explicit.

use core::ops::{Add, Mul, Sub};

use crate::basics::RectD;
use crate::trans_affine::TransAffine;

/// 2-D floating-point coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation: `self + (to - self) * t`.
    #[inline]
    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    #[inline]
    pub fn midpoint(self, to: Point) -> Point {
        Point::new((self.x + to.x) * 0.5, (self.y + to.y) * 0.5)
    }

    #[inline]
    pub fn distance(self, to: Point) -> f64 {
        (to.x - self.x).hypot(to.y - self.y)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Equality within `epsilon` on both axes.
    #[inline]
    pub fn approx_eq(self, other: Point, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

// ============================================================================
// Segment
// ============================================================================

/// One curve segment, continuing from the previous segment's end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Order 1: straight line to the point.
    Line(Point),
    /// Order 2: quadratic Bezier with one control point.
    Conic(Point, Point),
    /// Order 3: cubic Bezier with two control points.
    Cubic(Point, Point, Point),
}

impl Segment {
    /// Polynomial order of the segment.
    pub fn order(&self) -> u8 {
        match self {
            Segment::Line(_) => 1,
            Segment::Conic(..) => 2,
            Segment::Cubic(..) => 3,
        }
    }

    /// The point the segment ends at.
    pub fn end(&self) -> Point {
        match *self {
            Segment::Line(p) | Segment::Conic(_, p) | Segment::Cubic(_, _, p) => p,
        }
    }

    /// Apply `f` to every point of the segment.
    pub fn map(&self, mut f: impl FnMut(Point) -> Point) -> Segment {
        match *self {
            Segment::Line(p) => Segment::Line(f(p)),
            Segment::Conic(c, p) => Segment::Conic(f(c), f(p)),
            Segment::Cubic(c1, c2, p) => Segment::Cubic(f(c1), f(c2), f(p)),
        }
    }

    /// Visit every point of the segment in order.
    pub fn for_each_point(&self, mut f: impl FnMut(Point)) {
        match *self {
            Segment::Line(p) => f(p),
            Segment::Conic(c, p) => {
                f(c);
                f(p);
            }
            Segment::Cubic(c1, c2, p) => {
                f(c1);
                f(c2);
                f(p);
            }
        }
    }
}

// ============================================================================
// Contour
// ============================================================================

/// A start point plus an ordered, continuous list of segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    start: Point,
    segments: Vec<Segment>,
}

impl Contour {
    /// Empty contour starting at `start`.
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// Empty contour reusing an existing segment buffer.
    pub fn with_buffer(start: Point, mut segments: Vec<Segment>) -> Self {
        segments.clear();
        Self { start, segments }
    }

    /// Hand back the segment buffer, for recycling.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The current pen position: the end of the last segment.
    pub fn end_point(&self) -> Point {
        self.segments.last().map_or(self.start, Segment::end)
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn line_to(&mut self, p: Point) {
        self.segments.push(Segment::Line(p));
    }

    pub fn conic_to(&mut self, c: Point, p: Point) {
        self.segments.push(Segment::Conic(c, p));
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.segments.push(Segment::Cubic(c1, c2, p));
    }

    /// Iterate segments together with the point each one starts from.
    pub fn iter_from(&self) -> impl Iterator<Item = (Point, &Segment)> + '_ {
        let mut from = self.start;
        self.segments.iter().map(move |s| {
            let start = from;
            from = s.end();
            (start, s)
        })
    }

    /// Multiply every point by `m` in place.
    pub fn transform(&mut self, m: &TransAffine) {
        self.start = m.transform(self.start);
        for s in &mut self.segments {
            *s = s.map(|p| m.transform(p));
        }
    }

    /// Shift every point by `(dx, dy)` in place.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let d = Point::new(dx, dy);
        self.start = self.start + d;
        for s in &mut self.segments {
            *s = s.map(|p| p + d);
        }
    }

    /// Bounding box of the start point and all control points.
    pub fn bounding_box(&self) -> RectD {
        let mut r = RectD::new(self.start.x, self.start.y, self.start.x, self.start.y);
        for s in &self.segments {
            s.for_each_point(|p| {
                r.x1 = r.x1.min(p.x);
                r.y1 = r.y1.min(p.y);
                r.x2 = r.x2.max(p.x);
                r.y2 = r.y2.max(p.y);
            });
        }
        r
    }

    /// No segments, or nothing to cover: the control hull has zero area.
    pub fn is_degenerate(&self) -> bool {
        self.segments.is_empty() || self.bounding_box().area() <= 0.0
    }

    /// `true` if every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        if !self.start.is_finite() {
            return false;
        }
        let mut ok = true;
        for s in &self.segments {
            s.for_each_point(|p| ok &= p.is_finite());
        }
        ok
    }

    /// Whether the last point coincides with the start.
    pub fn is_closed(&self, epsilon: f64) -> bool {
        self.end_point().approx_eq(self.start, epsilon)
    }

    /// A copy with an explicit closing line appended when the contour is open.
    pub fn closed(&self) -> Contour {
        let mut c = self.clone();
        if !c.segments.is_empty() && c.end_point() != c.start {
            c.line_to(c.start);
        }
        c
    }

    /// The rectangle this contour traces, if it is an axis-aligned box made of
    /// straight lines (explicitly closed or not).
    pub fn axis_aligned_rect(&self, epsilon: f64) -> Option<RectD> {
        let mut pts = Vec::with_capacity(5);
        pts.push(self.start);
        for s in &self.segments {
            match *s {
                Segment::Line(p) => pts.push(p),
                _ => return None,
            }
        }
        if pts.len() == 5 && pts[4].approx_eq(pts[0], epsilon) {
            pts.pop();
        }
        if pts.len() != 4 {
            return None;
        }
        // Each edge must be horizontal or vertical, alternating.
        let horizontal = |a: Point, b: Point| (a.y - b.y).abs() <= epsilon;
        let vertical = |a: Point, b: Point| (a.x - b.x).abs() <= epsilon;
        let h_first = horizontal(pts[0], pts[1]);
        for i in 0..4 {
            let (a, b) = (pts[i], pts[(i + 1) % 4]);
            let want_h = (i % 2 == 0) == h_first;
            let ok = if want_h { horizontal(a, b) } else { vertical(a, b) };
            if !ok {
                return None;
            }
        }
        let mut r = RectD::new(pts[0].x, pts[0].y, pts[2].x, pts[2].y);
        r.normalize();
        Some(r)
    }
}

// ============================================================================
// Tests
// ============================================================================
