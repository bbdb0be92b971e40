//! End-to-end checks of the painter against the reference canvas and a
//! recording sink.

use raster_painter::bezier_arc::ArcSpec;
use raster_painter::{
    Canvas, Contour, FillingRule, Painter, Pixmap, Point, RasterConfig, RectI, Rgba8, Segment, Sink,
    TransAffine,
};

const RED: Rgba8 = Rgba8::new_opaque(255, 0, 0);

/// Records every rectangle batch instead of drawing.
#[derive(Default)]
struct Recorder {
    fills: Vec<(Vec<RectI>, Rgba8)>,
    blits: usize,
}

impl Sink for Recorder {
    fn width(&self) -> u32 {
        32
    }
    fn height(&self) -> u32 {
        32
    }
    fn fill_rectangles(&mut self, rects: &[RectI], color: Rgba8) {
        self.fills.push((rects.to_vec(), color));
    }
    fn draw_pixmap(&mut self, _: &Pixmap, _: (i32, i32), _: (u32, u32), _: (i32, i32), _: bool) {
        self.blits += 1;
    }
}

fn polygon<S: Sink>(p: &mut Painter<S>, pts: &[(f64, f64)]) {
    p.move_to(pts[0].0, pts[0].1);
    for &(x, y) in &pts[1..] {
        p.line_to(x, y);
    }
}

fn alpha_grid(p: &Painter<Canvas>) -> Vec<Vec<u8>> {
    let (w, h) = (p.sink().width() as i32, p.sink().height() as i32);
    (0..h)
        .map(|y| (0..w).map(|x| p.sink().pixel(x, y).a).collect())
        .collect()
}

// ============================================================================
// Integer-aligned rectangles are exact
// ============================================================================

#[test]
fn test_integer_rectangle_has_no_fringe() {
    for via_path in [false, true] {
        let mut p = Painter::new(Canvas::new(12, 12));
        if via_path {
            polygon(&mut p, &[(3.0, 2.0), (9.0, 2.0), (9.0, 7.0), (3.0, 7.0)]);
        } else {
            p.rectangle(3.0, 2.0, 9.0, 7.0);
        }
        p.fill();
        for y in 0..12 {
            for x in 0..12 {
                let inside = (3..9).contains(&x) && (2..7).contains(&y);
                let want = if inside { 255 } else { 0 };
                assert_eq!(p.sink().pixel(x, y).a, want, "pixel ({}, {}), path {}", x, y, via_path);
            }
        }
    }
}

#[test]
fn test_integer_rectangle_fast_path_is_one_rect() {
    let mut p = Painter::new(Recorder::default());
    p.rectangle(3.0, 2.0, 9.0, 7.0);
    p.fill();
    assert_eq!(p.sink().fills, vec![(vec![RectI::new(3, 2, 8, 6)], Rgba8::BLACK)]);
}

// ============================================================================
// Half-pixel edges
// ============================================================================

#[test]
fn test_half_pixel_edge_fades_only_that_edge() {
    let mut p = Painter::new(Canvas::new(10, 8));
    p.rectangle(2.0, 2.0, 5.5, 4.0);
    p.fill();
    for y in 2..4 {
        assert_eq!(p.sink().pixel(1, y).a, 0);
        assert_eq!(p.sink().pixel(2, y).a, 255);
        assert_eq!(p.sink().pixel(4, y).a, 255);
        assert_eq!(p.sink().pixel(5, y).a, 128);
        assert_eq!(p.sink().pixel(6, y).a, 0);
    }
    for x in 0..10 {
        assert_eq!(p.sink().pixel(x, 1).a, 0);
        assert_eq!(p.sink().pixel(x, 4).a, 0);
    }
}

#[test]
fn test_quarter_pixel_top_edge_from_orthogonal_pass() {
    let mut p = Painter::new(Canvas::new(8, 8));
    p.rectangle(1.0, 2.75, 4.0, 6.0);
    p.fill();
    for x in 1..4 {
        assert_eq!(p.sink().pixel(x, 2).a, 64, "column {}", x);
        assert_eq!(p.sink().pixel(x, 3).a, 255);
    }

    let config = RasterConfig::default().with_orthogonal_pass(false);
    let mut p = Painter::with_config(Canvas::new(8, 8), config).expect("valid config");
    p.rectangle(1.0, 2.75, 4.0, 6.0);
    p.fill();
    assert_eq!(p.sink().pixel(2, 2).a, 0);
}

#[test]
fn test_top_edge_fades_like_bottom_edge() {
    let column = |p: &Painter<Canvas>| -> Vec<u8> { (0..8).map(|y| p.sink().pixel(3, y).a).collect() };

    let mut p = Painter::new(Canvas::new(10, 10));
    polygon(&mut p, &[(2.0, 2.5), (6.0, 2.5), (6.0, 6.0), (2.0, 6.0)]);
    p.fill();
    assert_eq!(column(&p), vec![0, 0, 128, 255, 255, 255, 0, 0]);

    let mut p = Painter::new(Canvas::new(10, 10));
    polygon(&mut p, &[(2.0, 2.0), (6.0, 2.0), (6.0, 6.5), (2.0, 6.5)]);
    p.fill();
    assert_eq!(column(&p), vec![0, 0, 255, 255, 255, 255, 128, 0]);

    // A quarter-pixel top edge leaves three quarters of its row.
    let mut p = Painter::new(Canvas::new(10, 10));
    polygon(&mut p, &[(2.0, 2.25), (6.0, 2.25), (6.0, 6.0), (2.0, 6.0)]);
    p.fill();
    for x in 2..6 {
        let a = p.sink().pixel(x, 2).a;
        assert!((189..=193).contains(&a), "column {}: {}", x, a);
    }
}

#[test]
fn test_shallow_top_edge_ramps() {
    let mut p = Painter::new(Canvas::new(12, 10));
    polygon(&mut p, &[(0.0, 2.0), (10.0, 3.0), (10.0, 8.0), (0.0, 8.0)]);
    p.fill();
    let row: Vec<u8> = (0..10).map(|x| p.sink().pixel(x, 2).a).collect();
    for (x, &a) in row.iter().enumerate() {
        let want = 255.0 * (1.0 - (x as f64 + 0.5) / 10.0);
        assert!((a as f64 - want).abs() <= 2.0, "column {}: {} vs {}", x, a, want);
    }
    assert!(row.windows(2).all(|w| w[0] > w[1]), "{:?}", row);
    assert_eq!(p.sink().pixel(10, 2).a, 0);
}

#[test]
fn test_fractional_rectangle_corners_are_covered() {
    let mut p = Painter::new(Canvas::new(8, 8));
    p.rectangle(2.0, 2.75, 5.5, 6.0);
    p.fill();
    // True coverage 0.5 x 0.25.
    let corner = p.sink().pixel(5, 2).a;
    assert!((30..=34).contains(&corner), "{}", corner);
    assert_eq!(p.sink().pixel(2, 2).a, 64);
    assert_eq!(p.sink().pixel(5, 3).a, 128);
    assert_eq!(p.sink().pixel(6, 2).a, 0);
    assert_eq!(p.sink().pixel(5, 1).a, 0);

    let mut p = Painter::new(Canvas::new(8, 8));
    p.rectangle(2.25, 2.25, 5.75, 5.75);
    p.fill();
    for (x, y) in [(2, 2), (5, 2), (2, 5), (5, 5)] {
        let a = p.sink().pixel(x, y).a;
        assert!(a > 0 && a < 255, "corner ({}, {}): {}", x, y, a);
    }
}

// ============================================================================
// Degenerate input draws nothing
// ============================================================================

#[test]
fn test_degenerate_input_writes_nothing() {
    let mut p = Painter::new(Recorder::default());
    p.move_to(5.0, 5.0);
    p.line_to(5.0, 5.0);
    p.fill();

    polygon(&mut p, &[(1.0, 1.0), (4.0, 4.0), (8.0, 8.0)]);
    p.fill();

    p.rectangle(2.0, 2.0, 2.0, 9.0);
    p.fill();

    p.arc(5.0, 5.0, 0.0, 0.0, 3.0);
    p.fill();

    p.move_to(1.0, 1.0);
    p.line_to(f64::NAN, 3.0);
    p.line_to(4.0, 4.0);
    p.fill();

    p.move_to(1.0, 1.0);
    p.stroke();

    assert!(p.sink().fills.is_empty());
    assert_eq!(p.sink().blits, 0);
}

// ============================================================================
// Open contours fill as if closed
// ============================================================================

#[test]
fn test_open_and_closed_contours_fill_alike() {
    let shapes: [&[(f64, f64)]; 3] = [
        &[(1.3, 1.1), (13.7, 3.2), (6.4, 12.8)],
        &[(2.0, 2.5), (12.25, 2.5), (12.25, 11.0), (7.1, 6.6), (2.0, 11.0)],
        &[(14.0, 1.0), (1.5, 7.5), (14.0, 14.0), (9.9, 7.5)],
    ];
    for shape in shapes {
        let mut open = Painter::new(Canvas::new(16, 16));
        polygon(&mut open, shape);
        open.fill();

        let mut closed = Painter::new(Canvas::new(16, 16));
        polygon(&mut closed, shape);
        closed.close_path();
        closed.fill();

        assert_eq!(open.sink().pixmap(), closed.sink().pixmap(), "shape {:?}", shape);
    }
}

#[test]
fn test_open_curve_fills_like_closed() {
    let mut c = Contour::new(Point::new(2.0, 12.0));
    c.cubic_to(Point::new(2.0, 1.0), Point::new(14.0, 1.0), Point::new(14.0, 12.0));
    c.conic_to(Point::new(8.0, 6.3), Point::new(3.1, 13.2));

    let mut open = Painter::new(Canvas::new(16, 16));
    open.contour(&c);
    open.fill();

    let mut closed = Painter::new(Canvas::new(16, 16));
    closed.contour(&c.closed());
    closed.fill();

    assert_eq!(open.sink().pixmap(), closed.sink().pixmap());
}

// ============================================================================
// Arc tolerance
// ============================================================================

fn cubic_at(p0: Point, c1: Point, c2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

#[test]
fn test_arc_deviation_within_tolerance_at_any_scale() {
    let tolerance = 1e-5;
    for radius in [0.5, 10.0, 300.0] {
        for scale in [0.25, 1.0, 40.0] {
            let arc = ArcSpec {
                center: Point::new(3.0, -2.0),
                radius,
                start: 0.3,
                end: 5.9,
                pie: false,
            };
            let Some(mut c) = arc.to_contour(tolerance, scale) else {
                panic!("arc r={} produced nothing", radius);
            };
            c.transform(&TransAffine::new_scaling(scale, scale));
            let center = Point::new(3.0 * scale, -2.0 * scale);
            let r = radius * scale;
            let mut worst: f64 = 0.0;
            for (from, seg) in c.iter_from() {
                if let Segment::Cubic(c1, c2, p) = *seg {
                    for i in 0..=128 {
                        let q = cubic_at(from, c1, c2, p, i as f64 / 128.0);
                        worst = worst.max((q.distance(center) - r).abs());
                    }
                }
            }
            assert!(worst <= tolerance, "r={} s={} deviation {}", radius, scale, worst);
        }
    }
}

#[test]
fn test_circle_fill_is_symmetric() {
    let mut p = Painter::new(Canvas::new(20, 20));
    p.arc(10.0, 10.0, 6.0, 0.0, 2.0 * std::f64::consts::PI);
    p.fill();
    let g = alpha_grid(&p);
    assert_eq!(g[10][10], 255);
    assert_eq!(g[0][0], 0);
    for y in 0..20 {
        for x in 0..20 {
            let d = g[y][x] as i32 - g[y][19 - x] as i32;
            assert!(d.abs() <= 3, "({}, {}) {} vs {}", x, y, g[y][x], g[y][19 - x]);
        }
    }
}

// ============================================================================
// Nested contours
// ============================================================================

#[test]
fn test_ring_leaves_hole_empty() {
    let mut p = Painter::new(Canvas::new(12, 12));
    polygon(&mut p, &[(1.0, 1.0), (11.0, 1.0), (11.0, 11.0), (1.0, 11.0)]);
    polygon(&mut p, &[(4.0, 4.0), (4.0, 8.0), (8.0, 8.0), (8.0, 4.0)]);
    p.fill();
    for y in 0..12 {
        for x in 0..12 {
            let in_outer = (1..11).contains(&x) && (1..11).contains(&y);
            let in_hole = (4..8).contains(&x) && (4..8).contains(&y);
            let want = if in_outer && !in_hole { 255 } else { 0 };
            assert_eq!(p.sink().pixel(x, y).a, want, "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_same_direction_inner_contour_depends_on_rule() {
    let outer = [(1.0, 1.0), (11.0, 1.0), (11.0, 11.0), (1.0, 11.0)];
    let inner = [(4.0, 4.0), (8.0, 4.0), (8.0, 8.0), (4.0, 8.0)];

    let mut p = Painter::new(Canvas::new(12, 12));
    polygon(&mut p, &outer);
    polygon(&mut p, &inner);
    p.fill();
    assert_eq!(p.sink().pixel(6, 6).a, 255);

    let config = RasterConfig::default().with_filling_rule(FillingRule::EvenOdd);
    let mut p = Painter::with_config(Canvas::new(12, 12), config).expect("valid config");
    polygon(&mut p, &outer);
    polygon(&mut p, &inner);
    p.fill();
    assert_eq!(p.sink().pixel(6, 6).a, 0);
    assert_eq!(p.sink().pixel(2, 6).a, 255);
}

// ============================================================================
// Opaque fills are idempotent
// ============================================================================

#[test]
fn test_opaque_fill_twice_equals_once() {
    let shape = [(2.0, 2.0), (10.0, 2.0), (10.0, 5.0), (6.0, 5.0), (6.0, 12.0), (2.0, 12.0)];

    let mut once = Painter::new(Canvas::new(14, 14));
    once.set_brush(RED);
    polygon(&mut once, &shape);
    once.fill();

    let mut twice = Painter::new(Canvas::new(14, 14));
    twice.set_brush(RED);
    polygon(&mut twice, &shape);
    twice.fill_preserve();
    twice.fill();

    assert_eq!(once.sink().pixmap(), twice.sink().pixmap());
    assert_eq!(once.sink().pixel(3, 10), RED);
    assert_eq!(once.sink().pixel(8, 10), Rgba8::TRANSPARENT);
}

// ============================================================================
// Unmatched pops
// ============================================================================

#[test]
fn test_unmatched_pop_keeps_last_state() {
    let mut p = Painter::new(Canvas::new(10, 10));
    p.set_brush(RED);
    p.translate(2.0, 0.0);
    p.pop();
    p.wpop();
    p.rectangle(0.0, 0.0, 2.0, 2.0);
    p.fill();
    assert_eq!(p.sink().pixel(2, 0), RED);
    assert_eq!(p.sink().pixel(0, 0), Rgba8::TRANSPARENT);

    p.push();
    p.set_brush(Rgba8::BLACK);
    p.pop();
    p.pop();
    assert_eq!(p.state().brush, RED);
}

#[test]
fn test_window_clip_limits_output() {
    let mut p = Painter::new(Recorder::default());
    p.wpush((0, 0), RectI::new(0, 0, 4, 4));
    p.rectangle(2.0, 2.0, 9.0, 9.0);
    p.fill();
    p.wpop();
    assert_eq!(p.sink().fills, vec![(vec![RectI::new(2, 2, 4, 4)], Rgba8::BLACK)]);
}
