//! Per-pixel coverage gathered from the row and column sweeps of one fill.
//!
//! Each sweep samples the shape along pixel centre lines: the row sweep along
//! `y = r + 0.5`, the column sweep along `x = c + 0.5`. A span on such a line
//! gives, for every pixel it touches, the fraction of the centre line inside
//! the shape. That fraction is the pixel's true coverage when the boundary
//! crosses the pixel from one side to the opposite side, which for a given
//! straight edge holds on at least one of the two axes.
//!
//! Rows holding only the tip of an edge are crossed by no centre line. For
//! those the sweep repeats the spans of the neighbouring sampled row as an
//! *extended* sample, which says how far across the row the shape reaches
//! but nothing about how far into it.
//!
//! The two axes are merged per pixel:
//!
//! - only one axis saw the pixel: its exact sample; an extended sample alone
//!   is dropped;
//! - both axes sampled it exactly: the value nearer one half, the one
//!   measured across the boundary;
//! - otherwise the product, as at the corner of a box.
//!
//! Spans are kept per row and per column, so memory follows the outline
//! rather than the filled area. Full-coverage pixels leave as one rectangle
//! per row run, in batches; faded pixels are grouped by their scaled color.

use std::cmp::Ordering;

use crate::basics::{RectI, COVER_FULL, COVER_NONE};
use crate::color::{cover_from_fixed, Rgba8};
use crate::fixed::Fixed;
use crate::sink::Sink;

/// Largest batch of full-coverage rectangles per sink call.
const RUN_BATCH: usize = 256;

/// How a span was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// Measured on the row's own centre line.
    Exact,
    /// Copied from the neighbouring row for an edge tip no centre line
    /// crosses.
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    from: Fixed,
    to: Fixed,
    sample: Sample,
}

/// Coverage one axis measured for one pixel, in 16.16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Axis {
    exact: i64,
    extended: i64,
}

impl Axis {
    fn add(&mut self, sample: Sample, coverage: i64) {
        let slot = match sample {
            Sample::Exact => &mut self.exact,
            Sample::Extended => &mut self.extended,
        };
        *slot = (*slot + coverage).min(Fixed::ONE.raw());
    }

    fn value(self) -> Option<(i64, Sample)> {
        if self.exact > 0 {
            Some((self.exact, Sample::Exact))
        } else if self.extended > 0 {
            Some((self.extended, Sample::Extended))
        } else {
            None
        }
    }
}

/// Coverage of pixel `p` by the span `[from, to]` along one line.
fn coverage_at(from: Fixed, to: Fixed, p: i64) -> i64 {
    let (p1, p2) = (from.floor(), to.floor());
    if p < p1 || p > p2 {
        0
    } else if p1 == p2 {
        (to - from).raw()
    } else if p == p1 {
        from.leading_coverage()
    } else if p == p2 {
        to.trailing_coverage()
    } else {
        Fixed::ONE.raw()
    }
}

/// Merge the row and column measurements of one pixel.
fn merge(rows: Axis, cols: Axis) -> i64 {
    match (rows.value(), cols.value()) {
        (None, None) => 0,
        (Some((c, Sample::Exact)), None) | (None, Some((c, Sample::Exact))) => c,
        (Some(_), None) | (None, Some(_)) => 0,
        (Some((a, Sample::Exact)), Some((b, Sample::Exact))) => {
            let half = Fixed::HALF.raw();
            match (a - half).abs().cmp(&(b - half).abs()) {
                Ordering::Less => a,
                Ordering::Greater => b,
                Ordering::Equal => a.min(b),
            }
        }
        (Some((a, _)), Some((b, _))) => a * b / Fixed::ONE.raw(),
    }
}

// ============================================================================
// CoverageMap
// ============================================================================

/// Spans of one fill, clipped to a pixel area.
#[derive(Debug, Clone)]
pub struct CoverageMap {
    area: RectI,
    rows: Vec<Vec<Span>>,
    cols: Vec<Vec<Span>>,
}

impl CoverageMap {
    /// An empty map over `area` (inclusive). An invalid area accepts nothing.
    pub fn new(area: RectI) -> Self {
        let (w, h) = if area.is_valid() {
            (area.width() as usize, area.height() as usize)
        } else {
            (0, 0)
        };
        Self {
            area,
            rows: vec![Vec::new(); h],
            cols: vec![Vec::new(); w],
        }
    }

    pub fn area(&self) -> RectI {
        self.area
    }

    /// `true` until a span lands inside the area.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().chain(&self.cols).all(Vec::is_empty)
    }

    /// Rows (columns when `vert`) of the area, half-open.
    pub fn limits(&self, vert: bool) -> (i64, i64) {
        if !self.area.is_valid() {
            return (0, 0);
        }
        let (lo, hi) = if vert {
            (self.area.x1, self.area.x2)
        } else {
            (self.area.y1, self.area.y2)
        };
        (i64::from(lo), i64::from(hi) + 1)
    }

    /// Rows a raster should sample for this map: the area plus the row on
    /// each side that extended samples may be copied from.
    pub fn sample_limits(&self, vert: bool) -> (i64, i64) {
        let (lo, hi) = self.limits(vert);
        if lo >= hi {
            return (lo, hi);
        }
        (lo - 1, hi + 1)
    }

    /// Record the span `[x1, x2]` on `row` (a column when `vert`, with `x1`
    /// and `x2` then being y coordinates). Rows outside the area and empty
    /// spans are ignored.
    pub fn add_span(&mut self, vert: bool, row: i64, x1: Fixed, x2: Fixed, sample: Sample) {
        if x2 <= x1 {
            return;
        }
        let (lo, hi) = self.limits(vert);
        if row < lo || row >= hi {
            return;
        }
        let lines = if vert { &mut self.cols } else { &mut self.rows };
        lines[(row - lo) as usize].push(Span {
            from: x1,
            to: x2,
            sample,
        });
    }

    /// Merged coverage of pixel `(x, y)` in 16.16 units.
    pub fn coverage(&self, x: i32, y: i32) -> i64 {
        if !self.area.hit_test(x, y) {
            return 0;
        }
        let (px, py) = (i64::from(x), i64::from(y));
        let row = &self.rows[(y - self.area.y1) as usize];
        let col = &self.cols[(x - self.area.x1) as usize];
        merge(axis_at(row, px), axis_at(col, py))
    }

    /// Merge both axes and hand the result to `sink` in `color`. Returns the
    /// number of rectangles sent.
    pub fn emit<S: Sink + ?Sized>(&mut self, color: Rgba8, sink: &mut S) -> usize {
        if self.is_empty() || color.is_transparent() {
            return 0;
        }
        for line in self.rows.iter_mut().chain(self.cols.iter_mut()) {
            line.sort_unstable_by_key(|s| s.from);
        }

        let area = self.area;
        let width = self.cols.len();
        let mut h = vec![Axis::default(); width];
        let mut v = vec![Axis::default(); width];
        let mut cursors = vec![0usize; width];
        let mut full: Vec<RectI> = Vec::new();
        let mut faded: Vec<(Rgba8, RectI)> = Vec::new();

        for (i, spans) in self.rows.iter().enumerate() {
            let y = area.y1 + i as i32;
            h.fill(Axis::default());
            for s in spans {
                let p1 = s.from.floor().max(i64::from(area.x1));
                let p2 = s.to.floor().min(i64::from(area.x2));
                for p in p1..=p2 {
                    h[(p - i64::from(area.x1)) as usize].add(s.sample, coverage_at(s.from, s.to, p));
                }
            }
            for ((slot, col), cursor) in v.iter_mut().zip(&self.cols).zip(cursors.iter_mut()) {
                *slot = axis_from(col, cursor, i64::from(y));
            }

            let mut run: Option<i32> = None;
            for (c, (&hc, &vc)) in h.iter().zip(&v).enumerate() {
                let x = area.x1 + c as i32;
                let cover = cover_from_fixed(merge(hc, vc));
                if cover == COVER_FULL {
                    if run.is_none() {
                        run = Some(x);
                    }
                    continue;
                }
                if let Some(start) = run.take() {
                    full.push(RectI::new(start, y, x - 1, y));
                }
                if cover != COVER_NONE {
                    let faded_color = color.covered(cover);
                    if !faded_color.is_transparent() {
                        faded.push((faded_color, RectI::new(x, y, x, y)));
                    }
                }
            }
            if let Some(start) = run {
                full.push(RectI::new(start, y, area.x2, y));
            }
        }
        flush(color, &full, &mut faded, sink)
    }
}

/// Measurement of one line's spans at pixel `p`.
fn axis_at(spans: &[Span], p: i64) -> Axis {
    let mut axis = Axis::default();
    for s in spans {
        axis.add(s.sample, coverage_at(s.from, s.to, p));
    }
    axis
}

/// Like [`axis_at`] over `from`-sorted spans visited with increasing `p`;
/// `cursor` skips spans that ended before `p`.
fn axis_from(spans: &[Span], cursor: &mut usize, p: i64) -> Axis {
    while *cursor < spans.len() && spans[*cursor].to.floor() < p {
        *cursor += 1;
    }
    let mut axis = Axis::default();
    for s in &spans[*cursor..] {
        if s.from.floor() > p {
            break;
        }
        axis.add(s.sample, coverage_at(s.from, s.to, p));
    }
    axis
}

fn flush<S: Sink + ?Sized>(
    color: Rgba8,
    full: &[RectI],
    faded: &mut [(Rgba8, RectI)],
    sink: &mut S,
) -> usize {
    let mut sent = 0;
    for chunk in full.chunks(RUN_BATCH) {
        sink.fill_rectangles(chunk, color);
        sent += chunk.len();
    }

    faded.sort_unstable_by_key(|(c, r)| (c.a, r.y1, r.x1));
    let mut batch: Vec<RectI> = Vec::new();
    let mut i = 0;
    while i < faded.len() {
        let group = faded[i].0;
        batch.clear();
        while i < faded.len() && faded[i].0 == group {
            batch.push(faded[i].1);
            i += 1;
        }
        sink.fill_rectangles(&batch, group);
        sent += batch.len();
    }
    sent
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Pixmap;

    /// Records every rectangle with the alpha it was sent in.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u8, Vec<RectI>)>,
    }

    impl Sink for Recorder {
        fn width(&self) -> u32 {
            64
        }
        fn height(&self) -> u32 {
            64
        }
        fn fill_rectangles(&mut self, rects: &[RectI], color: Rgba8) {
            self.calls.push((color.a, rects.to_vec()));
        }
        fn draw_pixmap(&mut self, _: &Pixmap, _: (i32, i32), _: (u32, u32), _: (i32, i32), _: bool) {}
    }

    fn fx(v: f64) -> Fixed {
        Fixed::from_f64(v)
    }

    fn exact(c: f64) -> Axis {
        let mut a = Axis::default();
        a.add(Sample::Exact, fx(c).raw());
        a
    }

    fn extended(c: f64) -> Axis {
        let mut a = Axis::default();
        a.add(Sample::Extended, fx(c).raw());
        a
    }

    #[test]
    fn test_coverage_at() {
        let (a, b) = (fx(2.25), fx(5.5));
        assert_eq!(coverage_at(a, b, 1), 0);
        assert_eq!(coverage_at(a, b, 2), fx(0.75).raw());
        assert_eq!(coverage_at(a, b, 3), Fixed::ONE.raw());
        assert_eq!(coverage_at(a, b, 5), fx(0.5).raw());
        assert_eq!(coverage_at(a, b, 6), 0);
        assert_eq!(coverage_at(fx(3.25), fx(3.75), 3), fx(0.5).raw());
        // Ending on a pixel boundary adds nothing to the next pixel.
        assert_eq!(coverage_at(fx(1.0), fx(4.0), 4), 0);
    }

    #[test]
    fn test_merge_rules() {
        let none = Axis::default();
        assert_eq!(merge(none, none), 0);
        assert_eq!(merge(exact(0.25), none), fx(0.25).raw());
        assert_eq!(merge(none, exact(0.75)), fx(0.75).raw());
        // Extended samples never stand alone.
        assert_eq!(merge(extended(1.0), none), 0);
        assert_eq!(merge(none, extended(0.5)), 0);
        // Both exact: the one measured across the edge.
        assert_eq!(merge(exact(1.0), exact(0.5)), fx(0.5).raw());
        assert_eq!(merge(exact(0.4), exact(0.1)), fx(0.4).raw());
        assert_eq!(merge(exact(0.25), exact(0.75)), fx(0.25).raw());
        // Any extended sample: the product.
        assert_eq!(merge(extended(0.5), extended(0.25)), fx(0.125).raw());
        assert_eq!(merge(exact(0.5), extended(1.0)), fx(0.5).raw());
    }

    #[test]
    fn test_exact_wins_over_extended() {
        let mut a = exact(0.5);
        a.add(Sample::Extended, Fixed::ONE.raw());
        assert_eq!(a.value(), Some((fx(0.5).raw(), Sample::Exact)));
    }

    #[test]
    fn test_spans_outside_area_are_ignored() {
        let mut m = CoverageMap::new(RectI::new(0, 0, 3, 3));
        m.add_span(false, -1, fx(0.0), fx(4.0), Sample::Exact);
        m.add_span(false, 4, fx(0.0), fx(4.0), Sample::Exact);
        m.add_span(true, 9, fx(0.0), fx(4.0), Sample::Exact);
        m.add_span(false, 1, fx(2.0), fx(2.0), Sample::Exact);
        assert!(m.is_empty());
        assert_eq!(m.emit(Rgba8::BLACK, &mut Recorder::default()), 0);
    }

    #[test]
    fn test_sample_limits_widen_by_one() {
        let m = CoverageMap::new(RectI::new(2, 5, 9, 7));
        assert_eq!(m.limits(false), (5, 8));
        assert_eq!(m.sample_limits(false), (4, 9));
        assert_eq!(m.limits(true), (2, 10));
        assert_eq!(m.sample_limits(true), (1, 11));
        let empty = CoverageMap::new(RectI::EMPTY);
        assert_eq!(empty.sample_limits(false), (0, 0));
    }

    #[test]
    fn test_row_only_box() {
        // Rows 1..=2 of a box from x 1 to 3.5, no column samples.
        let mut m = CoverageMap::new(RectI::new(0, 0, 4, 3));
        for row in 1..3 {
            m.add_span(false, row, fx(1.0), fx(3.5), Sample::Exact);
        }
        assert_eq!(m.coverage(0, 1), 0);
        assert_eq!(m.coverage(1, 1), Fixed::ONE.raw());
        assert_eq!(m.coverage(3, 2), fx(0.5).raw());
        assert_eq!(m.coverage(1, 0), 0);

        let mut rec = Recorder::default();
        let sent = m.emit(Rgba8::BLACK, &mut rec);
        // Two full runs, then the two faded pixels in one call.
        assert_eq!(sent, 4);
        assert_eq!(
            rec.calls,
            vec![
                (255, vec![RectI::new(1, 1, 2, 1), RectI::new(1, 2, 2, 2)]),
                (128, vec![RectI::new(3, 1, 3, 1), RectI::new(3, 2, 3, 2)]),
            ]
        );
    }

    #[test]
    fn test_extended_corner_uses_product() {
        // Box x 1..3.5, y 0.75..3: row 0 and column 3 only hold extended
        // samples.
        let mut m = CoverageMap::new(RectI::new(0, 0, 4, 3));
        for row in 1..3 {
            m.add_span(false, row, fx(1.0), fx(3.5), Sample::Exact);
        }
        m.add_span(false, 0, fx(1.0), fx(3.5), Sample::Extended);
        for col in 1..3 {
            m.add_span(true, col, fx(0.75), fx(3.0), Sample::Exact);
        }
        m.add_span(true, 3, fx(0.75), fx(3.0), Sample::Extended);

        assert_eq!(m.coverage(1, 0), fx(0.25).raw());
        assert_eq!(m.coverage(3, 0), fx(0.125).raw());
        assert_eq!(m.coverage(3, 1), fx(0.5).raw());
        assert_eq!(m.coverage(2, 2), Fixed::ONE.raw());
    }

    #[test]
    fn test_full_runs_are_batched() {
        let mut m = CoverageMap::new(RectI::new(0, 0, 3, 299));
        for row in 0..300 {
            m.add_span(false, row, fx(0.0), fx(4.0), Sample::Exact);
        }
        let mut rec = Recorder::default();
        assert_eq!(m.emit(Rgba8::BLACK, &mut rec), 300);
        let sizes: Vec<usize> = rec.calls.iter().map(|(_, r)| r.len()).collect();
        assert_eq!(sizes, vec![256, 44]);
    }

    #[test]
    fn test_transparent_color_sends_nothing() {
        let mut m = CoverageMap::new(RectI::new(0, 0, 3, 3));
        m.add_span(false, 1, fx(0.0), fx(4.0), Sample::Exact);
        let mut rec = Recorder::default();
        assert_eq!(m.emit(Rgba8::new(0, 0, 0, 0), &mut rec), 0);
        assert!(rec.calls.is_empty());
    }
}
