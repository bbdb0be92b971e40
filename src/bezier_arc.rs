//! Circular arcs as cubic Bezier contours.
//!
//! An arc is split into equal sub-arcs, each replaced by the usual cubic with
//! control arms of length `4/3 * tan(span / 4)`. The span is picked from
//! [`ARC_SPAN_TABLE`]: the widest entry whose deviation bound, measured at
//! the arc's device-space radius, stays under the tolerance. Large on-screen
//! circles therefore get more segments, small ones fewer.

use crate::basics::PI;
use crate::contour::{Contour, Point};

/// Candidate sub-arc spans, widest first.
pub const ARC_SPAN_TABLE: [f64; 10] = [
    PI / 2.0,
    PI / 4.0,
    PI / 8.0,
    PI / 16.0,
    PI / 32.0,
    PI / 64.0,
    PI / 128.0,
    PI / 256.0,
    PI / 512.0,
    PI / 1024.0,
];

/// Sweeps smaller than this produce nothing.
const ARC_SWEEP_EPSILON: f64 = 1e-10;

/// Upper bound on the radial deviation between a sub-arc of `span` radians
/// and its cubic approximation, for a circle of `radius`.
///
/// The true maximum is half this value; the slack keeps the bound safe
/// against rounding in the control points.
pub fn arc_error_bound(radius: f64, span: f64) -> f64 {
    let q = span.abs() / 4.0;
    let (s, c) = q.sin_cos();
    radius.abs() * (4.0 / 27.0) * s.powi(6) / (c * c)
}

/// Widest table span whose error bound at `device_radius` is within
/// `tolerance`. Falls back to the narrowest entry for enormous radii.
pub fn max_span_for_radius(device_radius: f64, tolerance: f64) -> f64 {
    ARC_SPAN_TABLE
        .iter()
        .copied()
        .find(|&span| arc_error_bound(device_radius, span) <= tolerance)
        .unwrap_or(ARC_SPAN_TABLE[ARC_SPAN_TABLE.len() - 1])
}

/// Number of cubic segments needed to cover `sweep` radians.
pub fn segment_count(sweep: f64, device_radius: f64, tolerance: f64) -> usize {
    let span = max_span_for_radius(device_radius, tolerance);
    ((sweep.abs() / span).ceil() as usize).max(1)
}

/// Control points of one cubic approximating the arc from `start_angle`
/// through `sweep` radians: `[p0, c1, c2, p3]`.
pub fn arc_to_bezier(center: Point, radius: f64, start_angle: f64, sweep: f64) -> [Point; 4] {
    let k = 4.0 / 3.0 * (sweep / 4.0).tan();
    let (s0, c0) = start_angle.sin_cos();
    let (s1, c1) = (start_angle + sweep).sin_cos();
    let p0 = Point::new(center.x + radius * c0, center.y + radius * s0);
    let p3 = Point::new(center.x + radius * c1, center.y + radius * s1);
    let c1p = Point::new(p0.x - k * radius * s0, p0.y + k * radius * c0);
    let c2p = Point::new(p3.x + k * radius * s1, p3.y - k * radius * c1);
    [p0, c1p, c2p, p3]
}

/// Parameters of a circular arc in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpec {
    pub center: Point,
    pub radius: f64,
    /// Start angle in radians; 0 points along +x, angles grow toward +y.
    pub start: f64,
    /// End angle in radians.
    pub end: f64,
    /// Close through the centre (pie slice) instead of along the chord.
    pub pie: bool,
}

impl ArcSpec {
    /// Signed sweep, clamped to one full turn.
    pub fn sweep(&self) -> f64 {
        (self.end - self.start).clamp(-2.0 * PI, 2.0 * PI)
    }

    /// `true` when the arc cannot produce any outline.
    pub fn is_degenerate(&self) -> bool {
        !(self.radius.is_finite() && self.radius > 0.0)
            || !self.center.is_finite()
            || !self.start.is_finite()
            || !self.end.is_finite()
            || self.sweep().abs() < ARC_SWEEP_EPSILON
    }

    /// Build the arc as a contour of cubic segments.
    ///
    /// `scale` is the largest stretch of the transform the contour will be
    /// drawn with, so the tolerance holds in device space.
    pub fn to_contour(&self, tolerance: f64, scale: f64) -> Option<Contour> {
        if self.is_degenerate() {
            return None;
        }
        let sweep = self.sweep();
        let n = segment_count(sweep, self.radius * scale.abs(), tolerance);
        let local = sweep / n as f64;

        let first = arc_to_bezier(self.center, self.radius, self.start, local);
        let mut contour = if self.pie {
            let mut c = Contour::new(self.center);
            c.line_to(first[0]);
            c
        } else {
            Contour::new(first[0])
        };

        let mut angle = self.start;
        for _ in 0..n {
            let [_, c1, c2, p] = arc_to_bezier(self.center, self.radius, angle, local);
            contour.cubic_to(c1, c2, p);
            angle += local;
        }
        if self.pie {
            contour.line_to(self.center);
        }
        Some(contour)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::Segment;
    use crate::trans_affine::TransAffine;

    fn cubic_at(p0: Point, c1: Point, c2: Point, p3: Point, t: f64) -> Point {
        let u = 1.0 - t;
        p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p3 * (t * t * t)
    }

    /// Largest |distance - radius| over dense samples of every cubic.
    fn max_deviation(contour: &Contour, center: Point, radius: f64) -> f64 {
        let mut worst: f64 = 0.0;
        for (from, seg) in contour.iter_from() {
            if let Segment::Cubic(c1, c2, p) = *seg {
                for i in 0..=256 {
                    let q = cubic_at(from, c1, c2, p, i as f64 / 256.0);
                    worst = worst.max((q.distance(center) - radius).abs());
                }
            }
        }
        worst
    }

    #[test]
    fn test_error_bound_grows_with_radius() {
        let span = PI / 4.0;
        assert!(arc_error_bound(10.0, span) < arc_error_bound(100.0, span));
        assert!((arc_error_bound(100.0, span) / arc_error_bound(10.0, span) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_span_shrinks_with_radius() {
        let tol = 1e-5;
        let small = max_span_for_radius(0.01, tol);
        let large = max_span_for_radius(1000.0, tol);
        assert_eq!(small, PI / 2.0);
        assert!(large < small);
        assert!(arc_error_bound(1000.0, large) <= tol);
    }

    #[test]
    fn test_span_table_fallback() {
        assert_eq!(max_span_for_radius(1e300, 1e-5), PI / 1024.0);
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count(2.0 * PI, 0.01, 1e-5), 4);
        assert_eq!(segment_count(1e-3, 0.01, 1e-5), 1);
        assert!(segment_count(2.0 * PI, 1000.0, 1e-5) > 4);
    }

    #[test]
    fn test_arc_to_bezier_endpoints() {
        let [p0, _, _, p3] = arc_to_bezier(Point::new(1.0, 1.0), 2.0, 0.0, PI / 2.0);
        assert!(p0.approx_eq(Point::new(3.0, 1.0), 1e-12));
        assert!(p3.approx_eq(Point::new(1.0, 3.0), 1e-12));
    }

    #[test]
    fn test_degenerate_arcs() {
        let base = ArcSpec {
            center: Point::ZERO,
            radius: 10.0,
            start: 0.0,
            end: PI,
            pie: false,
        };
        assert!(!base.is_degenerate());
        assert!(ArcSpec { radius: 0.0, ..base }.to_contour(1e-5, 1.0).is_none());
        assert!(ArcSpec { radius: -1.0, ..base }.is_degenerate());
        assert!(ArcSpec { end: 0.0, ..base }.is_degenerate());
        assert!(ArcSpec { radius: f64::NAN, ..base }.is_degenerate());
    }

    #[test]
    fn test_pie_closes_through_center() {
        let arc = ArcSpec {
            center: Point::new(5.0, 5.0),
            radius: 4.0,
            start: 0.0,
            end: PI / 2.0,
            pie: true,
        };
        let c = arc.to_contour(1e-5, 1.0).unwrap();
        assert_eq!(c.start(), Point::new(5.0, 5.0));
        assert_eq!(c.end_point(), Point::new(5.0, 5.0));
        assert!(matches!(c.segments()[0], Segment::Line(_)));
    }

    #[test]
    fn test_full_circle_closes() {
        let arc = ArcSpec {
            center: Point::ZERO,
            radius: 3.0,
            start: 0.0,
            end: 2.0 * PI,
            pie: false,
        };
        let c = arc.to_contour(1e-5, 1.0).unwrap();
        assert!(c.is_closed(1e-9));
    }

    #[test]
    fn test_sweep_clamped() {
        let arc = ArcSpec {
            center: Point::ZERO,
            radius: 1.0,
            start: 0.0,
            end: 10.0 * PI,
            pie: false,
        };
        assert_eq!(arc.sweep(), 2.0 * PI);
    }

    #[test]
    fn test_tessellation_error_independent_of_scale() {
        let tol = 1e-5;
        for &radius in &[0.5, 3.0, 40.0, 250.0] {
            for &scale in &[0.25, 1.0, 4.0, 16.0] {
                let arc = ArcSpec {
                    center: Point::new(7.0, -3.0),
                    radius,
                    start: 0.3,
                    end: 0.3 + 2.0 * PI,
                    pie: false,
                };
                let mut c = arc.to_contour(tol, scale).unwrap();
                let m = TransAffine::new_scaling(scale, scale);
                c.transform(&m);
                let center = m.transform(arc.center);
                let dev = max_deviation(&c, center, radius * scale);
                assert!(
                    dev <= tol,
                    "radius {} scale {}: deviation {} exceeds {}",
                    radius,
                    scale,
                    dev,
                    tol
                );
            }
        }
    }
}
