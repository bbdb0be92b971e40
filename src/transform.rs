//! Transform stage: user-space primitives to device pixels.
//!
//! Every point goes through the current matrix and is then shifted by the
//! negated window offset. Contours are copied into pooled buffers first so
//! the queued originals survive `*_preserve` calls.
//!
//! Rectangles that stay axis-aligned with whole-pixel corners come out as a
//! plain [`RectI`], which the painter fills without anti-aliasing. Any other
//! rectangle turns into a closed four-edge contour. Arcs are tessellated into
//! cubics sized for their device-space radius.

use log::{trace, warn};

use crate::basics::{iround, is_integral, RectI};
use crate::color::Rgba8;
use crate::contour::{Contour, Point};
use crate::pool::SegmentPool;
use crate::primitive::Primitive;
use crate::sink::Pixmap;
use crate::trans_affine::TransAffine;

/// Tolerance for treating transformed rectangle corners as aligned and
/// integral.
pub const RECT_EPSILON: f64 = 1e-6;

/// A primitive in device pixels, ready for the rasterizer or the sink.
#[derive(Debug, Clone, PartialEq)]
pub enum DevicePrimitive<'a> {
    /// Whole-pixel rectangle (inclusive), filled without anti-aliasing.
    Rect(RectI),
    /// Contours to rasterize together.
    Contours(Vec<Contour>),
    Text {
        pos: Point,
        text: &'a str,
        color: Rgba8,
    },
    Pixmap {
        pixmap: &'a Pixmap,
        src: RectI,
        dest: (i32, i32),
        transparent: bool,
    },
}

/// Matrix, window offset and arc tolerance in effect for one flush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformStage {
    pub matrix: TransAffine,
    /// Accumulated window/scroll origin, subtracted after the matrix.
    pub offset: (i32, i32),
    pub arc_tolerance: f64,
}

impl TransformStage {
    pub fn new(matrix: TransAffine, offset: (i32, i32), arc_tolerance: f64) -> Self {
        Self {
            matrix,
            offset,
            arc_tolerance,
        }
    }

    /// Map one user-space point to device space.
    #[inline]
    pub fn to_device(&self, p: Point) -> Point {
        let q = self.matrix.transform(p);
        Point::new(q.x - self.offset.0 as f64, q.y - self.offset.1 as f64)
    }

    /// Device-space copy of `contour`, or `None` when it cannot produce
    /// coverage.
    pub fn contour(&self, contour: &Contour, pool: &mut SegmentPool) -> Option<Contour> {
        let mut out = pool.contour(contour.start());
        for s in contour.segments() {
            out.push(*s);
        }
        self.place(out, pool)
    }

    /// Transform, offset and validate a contour the stage already owns.
    fn place(&self, mut c: Contour, pool: &mut SegmentPool) -> Option<Contour> {
        c.transform(&self.matrix);
        c.translate(-(self.offset.0 as f64), -(self.offset.1 as f64));
        if !c.is_finite() {
            warn!("A path contains NaN or infinite coordinates, ignoring it.");
            pool.recycle(c);
            return None;
        }
        if c.is_degenerate() {
            trace!("skipping degenerate contour");
            pool.recycle(c);
            return None;
        }
        Some(c)
    }

    /// Convert one queued primitive.
    pub fn apply<'a>(&self, prim: &'a Primitive, pool: &mut SegmentPool) -> Option<DevicePrimitive<'a>> {
        match prim {
            Primitive::Contours(set) => {
                let out: Vec<Contour> = set.iter().filter_map(|c| self.contour(c, pool)).collect();
                (!out.is_empty()).then_some(DevicePrimitive::Contours(out))
            }
            Primitive::Rectangle { p1, p2 } => self.rectangle(*p1, *p2, pool),
            Primitive::Arc(arc) => {
                let Some(c) = arc.to_contour(self.arc_tolerance, self.matrix.max_scale()) else {
                    trace!("skipping degenerate arc");
                    return None;
                };
                self.place(c, pool).map(|c| DevicePrimitive::Contours(vec![c]))
            }
            Primitive::Text { pos, text, color } => Some(DevicePrimitive::Text {
                pos: self.to_device(*pos),
                text,
                color: *color,
            }),
            Primitive::Pixmap {
                pixmap,
                src,
                dest,
                transparent,
            } => {
                let d = self.to_device(*dest);
                if !d.is_finite() {
                    warn!("A pixmap destination is not finite, ignoring it.");
                    return None;
                }
                Some(DevicePrimitive::Pixmap {
                    pixmap,
                    src: *src,
                    dest: (iround(d.x), iround(d.y)),
                    transparent: *transparent,
                })
            }
        }
    }

    fn rectangle<'a>(&self, p1: Point, p2: Point, pool: &mut SegmentPool) -> Option<DevicePrimitive<'a>> {
        let mut c = pool.contour(p1);
        c.line_to(Point::new(p2.x, p1.y));
        c.line_to(p2);
        c.line_to(Point::new(p1.x, p2.y));
        c.line_to(p1);
        let c = self.place(c, pool)?;

        if let Some(r) = c.axis_aligned_rect(RECT_EPSILON) {
            let corners = [r.x1, r.y1, r.x2, r.y2];
            if corners.iter().all(|&v| is_integral(v, RECT_EPSILON)) {
                pool.recycle(c);
                let (x1, y1, x2, y2) = (iround(r.x1), iround(r.y1), iround(r.x2), iround(r.y2));
                return Some(DevicePrimitive::Rect(RectI::new(
                    x1,
                    y1,
                    x2.saturating_sub(1),
                    y2.saturating_sub(1),
                )));
            }
        }
        Some(DevicePrimitive::Contours(vec![c]))
    }
}

// ============================================================================
// Tests
// ============================================================================
