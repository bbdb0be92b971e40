//! Painter: drawing state, the primitive queue and the fill/stroke/paint
//! pipeline.
//!
//! Drawing calls only queue primitives. `fill`, `stroke` and `paint` run the
//! queue through the transform stage against the current state and hand the
//! results to the sink:
//!
//! - fill: each contour set is built into a row [`Raster`] and swept into a
//!   [`CoverageMap`]; with the orthogonal pass enabled a column raster is
//!   swept into the same map, which then merges both axes per pixel. Whole-pixel
//!   rectangles skip rasterization entirely.
//! - stroke: primitives become pixel polylines for the sink's stroke calls.
//! - paint: only text runs and pixmaps are drawn.
//!
//! Text runs and pixmaps are drawn by all three operations.
//!
//! Two independent stacks save state. `push`/`pop` cover the matrix, clip,
//! brush and pen; `wpush`/`wpop` cover the window offset and window clip.
//! Popping an empty stack does nothing.

use log::{debug, trace};

use crate::basics::{ifloor, intersect_rectangles, unite_rectangles, RectI};
use crate::bezier_arc::ArcSpec;
use crate::color::Rgba8;
use crate::config::RasterConfig;
use crate::contour::{Contour, Point, Segment};
use crate::coverage::CoverageMap;
use crate::error::Result;
use crate::queue::PrimitiveQueue;
use crate::raster::Raster;
use crate::sink::{Pixmap, Sink};
use crate::stroke::{stroke_primitive, Pen};
use crate::sweep::{sweep, SweepStats};
use crate::trans_affine::TransAffine;
use crate::transform::{DevicePrimitive, TransformStage};

use std::rc::Rc;

/// State saved and restored by [`Painter::push`] and [`Painter::pop`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PainterState {
    /// User to device transform, applied before the window offset.
    pub matrix: TransAffine,
    /// Clip in device pixels, inclusive.
    pub clip: RectI,
    /// Fill color.
    pub brush: Rgba8,
    pub pen: Pen,
}

impl Default for PainterState {
    fn default() -> Self {
        Self {
            matrix: TransAffine::IDENTITY,
            clip: RectI::UNBOUNDED,
            brush: Rgba8::BLACK,
            pen: Pen::default(),
        }
    }
}

/// State saved and restored by [`Painter::wpush`] and [`Painter::wpop`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowState {
    offset: (i32, i32),
    clip: RectI,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            offset: (0, 0),
            clip: RectI::UNBOUNDED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Fill,
    Stroke,
    Paint,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Fill => "fill",
            Operation::Stroke => "stroke",
            Operation::Paint => "paint",
        }
    }
}

/// Counters for one flush, reported at debug level.
#[derive(Debug, Default)]
struct Summary {
    primitives: usize,
    skipped: usize,
    sweep: SweepStats,
    rects: usize,
    rect_fills: usize,
    stroke_calls: usize,
    blits: usize,
}

// ============================================================================
// Painter
// ============================================================================

/// Vector painter drawing into a [`Sink`].
pub struct Painter<S: Sink> {
    sink: S,
    config: RasterConfig,
    state: PainterState,
    states: Vec<PainterState>,
    window: WindowState,
    windows: Vec<WindowState>,
    queue: PrimitiveQueue,
    visible: bool,
}

impl<S: Sink> Painter<S> {
    /// Painter with the default configuration.
    pub fn new(sink: S) -> Self {
        let config = RasterConfig::default();
        Self {
            sink,
            config,
            state: PainterState::default(),
            states: Vec::new(),
            window: WindowState::default(),
            windows: Vec::new(),
            queue: PrimitiveQueue::new(config.pool_capacity),
            visible: true,
        }
    }

    /// Painter with a validated configuration.
    pub fn with_config(sink: S, config: RasterConfig) -> Result<Self> {
        config.validate()?;
        let mut p = Self::new(sink);
        p.queue = PrimitiveQueue::new(config.pool_capacity);
        p.config = config;
        Ok(p)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    pub fn state(&self) -> &PainterState {
        &self.state
    }

    pub fn matrix(&self) -> &TransAffine {
        &self.state.matrix
    }

    pub fn set_matrix(&mut self, m: TransAffine) {
        self.state.matrix = m;
    }

    /// Translate user space. Later drawing is moved before the current
    /// matrix applies.
    pub fn translate(&mut self, x: f64, y: f64) {
        self.state.matrix.premultiply(&TransAffine::new_translation(x, y));
    }

    pub fn scale(&mut self, x: f64, y: f64) {
        self.state.matrix.premultiply(&TransAffine::new_scaling(x, y));
    }

    /// Rotate user space by `a` radians.
    pub fn rotate(&mut self, a: f64) {
        self.state.matrix.premultiply(&TransAffine::new_rotation(a));
    }

    /// Set the clip, in device pixels.
    pub fn set_clip(&mut self, clip: RectI) {
        self.state.clip = clip;
    }

    pub fn set_brush(&mut self, color: Rgba8) {
        self.state.brush = color;
    }

    pub fn set_pen(&mut self, pen: Pen) {
        self.state.pen = pen;
    }

    /// Save matrix, clip, brush and pen.
    pub fn push(&mut self) {
        self.states.push(self.state);
    }

    /// Restore the last saved state. Without a matching `push` the current
    /// state is kept.
    pub fn pop(&mut self) {
        match self.states.pop() {
            Some(s) => self.state = s,
            None => debug!("pop without a saved state, keeping the current one"),
        }
    }

    /// Enter a window: shift the device origin by `offset` and narrow the
    /// window clip to `clip` (device pixels).
    pub fn wpush(&mut self, offset: (i32, i32), clip: RectI) {
        self.windows.push(self.window);
        self.window.offset = (
            self.window.offset.0.saturating_add(offset.0),
            self.window.offset.1.saturating_add(offset.1),
        );
        self.window.clip = intersect_rectangles(&self.window.clip, &clip);
    }

    /// Leave the current window. Without a matching `wpush` nothing changes.
    pub fn wpop(&mut self) {
        match self.windows.pop() {
            Some(w) => self.window = w,
            None => debug!("wpop without a saved window, keeping the current one"),
        }
    }

    /// Accumulated window offset.
    pub fn window_offset(&self) -> (i32, i32) {
        self.window.offset
    }

    /// Show or hide the target. A hidden target draws nothing.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// The state clip, window clip and surface intersected, or `None` when
    /// nothing is left.
    pub fn effective_clip(&self) -> Option<RectI> {
        let surface = RectI::from_size(self.sink.width(), self.sink.height());
        let clip = intersect_rectangles(&intersect_rectangles(&self.state.clip, &self.window.clip), &surface);
        clip.is_valid().then_some(clip)
    }

    pub fn is_visible(&self) -> bool {
        self.visible && self.effective_clip().is_some()
    }

    // ------------------------------------------------------------------------
    // Path and primitive calls
    // ------------------------------------------------------------------------

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.queue.move_to(Point::new(x, y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.queue.line_to(Point::new(x, y));
    }

    /// Quadratic Bezier through control point `(cx, cy)`.
    pub fn conic_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.queue.conic_to(Point::new(cx, cy), Point::new(x, y));
    }

    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.queue
            .cubic_to(Point::new(c1x, c1y), Point::new(c2x, c2y), Point::new(x, y));
    }

    pub fn close_path(&mut self) {
        self.queue.close_path();
    }

    /// Queue a whole contour, for outlines built elsewhere.
    pub fn contour(&mut self, contour: &Contour) {
        self.queue.move_to(contour.start());
        for seg in contour.segments() {
            match *seg {
                Segment::Line(p) => self.queue.line_to(p),
                Segment::Conic(c, p) => self.queue.conic_to(c, p),
                Segment::Cubic(c1, c2, p) => self.queue.cubic_to(c1, c2, p),
            }
        }
    }

    /// Rectangle between two opposite corners.
    pub fn rectangle(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.queue.rectangle(Point::new(x1, y1), Point::new(x2, y2));
    }

    /// Circular arc from `start` to `end` radians, closed along its chord.
    pub fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.queue.arc(ArcSpec {
            center: Point::new(cx, cy),
            radius,
            start,
            end,
            pie: false,
        });
    }

    /// Pie slice: an arc closed through its centre.
    pub fn pie(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.queue.arc(ArcSpec {
            center: Point::new(cx, cy),
            radius,
            start,
            end,
            pie: true,
        });
    }

    /// Text run at `(x, y)`, drawn by the sink in `color`.
    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>, color: Rgba8) {
        self.queue.text(Point::new(x, y), text, color);
    }

    /// Block `src` of `pixmap`, its top-left corner placed at `(x, y)`.
    pub fn pixmap(&mut self, pixmap: Rc<Pixmap>, src: RectI, x: f64, y: f64, transparent: bool) {
        self.queue.pixmap(pixmap, src, Point::new(x, y), transparent);
    }

    /// `true` while primitives are queued.
    pub fn has_path(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Discard everything queued.
    pub fn new_path(&mut self) {
        self.queue.clear();
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Fill the queue with the brush, then clear it.
    pub fn fill(&mut self) {
        self.run(Operation::Fill, false);
    }

    /// Fill the queue with the brush and keep it.
    pub fn fill_preserve(&mut self) {
        self.run(Operation::Fill, true);
    }

    /// Stroke the queue with the pen, then clear it.
    pub fn stroke(&mut self) {
        self.run(Operation::Stroke, false);
    }

    /// Stroke the queue with the pen and keep it.
    pub fn stroke_preserve(&mut self) {
        self.run(Operation::Stroke, true);
    }

    /// Draw queued text runs and pixmaps, then clear the queue.
    pub fn paint(&mut self) {
        self.run(Operation::Paint, false);
    }

    /// Fill the whole effective clip with `color`. The queue is untouched.
    pub fn clear(&mut self, color: Rgba8) {
        if !self.visible {
            return;
        }
        if let Some(clip) = self.effective_clip() {
            self.sink.fill_rectangles(&[clip], color);
        }
    }

    fn run(&mut self, op: Operation, preserve: bool) {
        let clip = self.effective_clip().filter(|_| self.visible);
        let Some(clip) = clip else {
            trace!("{}: target not visible", op.name());
            if !preserve {
                self.queue.clear();
            }
            return;
        };

        let stage = TransformStage::new(self.state.matrix, self.window.offset, self.config.arc_tolerance);
        let state = self.state;
        let config = self.config;
        let sink = &mut self.sink;
        let (items, pool) = self.queue.parts_mut();
        let mut summary = Summary::default();

        for prim in items {
            if op == Operation::Paint && prim.is_geometry() {
                continue;
            }
            summary.primitives += 1;
            let Some(dev) = stage.apply(prim, pool) else {
                summary.skipped += 1;
                continue;
            };
            match (op, dev) {
                (_, DevicePrimitive::Text { pos, text, color }) => sink.draw_text(pos, text, color),
                (
                    _,
                    DevicePrimitive::Pixmap {
                        pixmap,
                        src,
                        dest,
                        transparent,
                    },
                ) => {
                    if blit(sink, pixmap, src, dest, transparent, &clip) {
                        summary.blits += 1;
                    }
                }
                (Operation::Stroke, dev) => {
                    let width = state.pen.pixel_width(&state.matrix);
                    summary.stroke_calls += stroke_primitive(&dev, width, state.pen.color, clip, sink);
                    if let DevicePrimitive::Contours(set) = dev {
                        pool.recycle_all(set);
                    }
                }
                (_, DevicePrimitive::Rect(mut r)) => {
                    if !state.brush.is_transparent() && r.clip(&clip) {
                        sink.fill_rectangles(&[r], state.brush);
                        summary.rect_fills += 1;
                    }
                }
                (_, DevicePrimitive::Contours(set)) => {
                    let (stats, rects) = fill_contours(&set, &config, state.brush, clip, sink);
                    summary.sweep.rows += stats.rows;
                    summary.sweep.spans += stats.spans;
                    summary.sweep.extended += stats.extended;
                    summary.rects += rects;
                    pool.recycle_all(set);
                }
            }
        }

        debug!(
            "{}: {} primitives ({} skipped), {} rows, {} spans, {} extended, {} rects, {} rect fills, {} stroke calls, {} blits",
            op.name(),
            summary.primitives,
            summary.skipped,
            summary.sweep.rows,
            summary.sweep.spans,
            summary.sweep.extended,
            summary.rects,
            summary.rect_fills,
            summary.stroke_calls,
            summary.blits,
        );

        if !preserve {
            self.queue.clear();
        }
    }
}

// ============================================================================
// Pipeline helpers
// ============================================================================

/// Rasterize and sweep one contour set: rows first, then, when enabled, the
/// columns, then merge both into pixel coverage. Returns the sweep counters
/// and the number of rectangles sent.
fn fill_contours<S: Sink + ?Sized>(
    set: &[Contour],
    config: &RasterConfig,
    color: Rgba8,
    clip: RectI,
    sink: &mut S,
) -> (SweepStats, usize) {
    let Some(area) = coverage_area(set, &clip) else {
        return (SweepStats::default(), 0);
    };
    let mut map = CoverageMap::new(area);

    let (lo, hi) = map.sample_limits(false);
    let mut rows = Raster::new(false, config.bezier_threshold).with_row_limits(lo, hi);
    rows.add_contours(set);
    let mut stats = sweep(&rows, config.filling_rule, &mut map);

    if config.orthogonal_pass {
        let (lo, hi) = map.sample_limits(true);
        let mut cols = Raster::new(true, config.bezier_threshold).with_row_limits(lo, hi);
        cols.add_contours(set);
        let s = sweep(&cols, config.filling_rule, &mut map);
        stats.rows += s.rows;
        stats.spans += s.spans;
        stats.extended += s.extended;
    }
    (stats, map.emit(color, sink))
}

/// Pixels that may receive coverage: the control boxes of `set` clipped to
/// `clip`.
fn coverage_area(set: &[Contour], clip: &RectI) -> Option<RectI> {
    let mut boxes = set.iter().map(Contour::bounding_box);
    let first = boxes.next()?;
    let b = boxes.fold(first, |acc, r| unite_rectangles(&acc, &r));
    let outside = b.x2 < f64::from(clip.x1)
        || b.y2 < f64::from(clip.y1)
        || b.x1 >= f64::from(clip.x2) + 1.0
        || b.y1 >= f64::from(clip.y2) + 1.0;
    if !clip.is_valid() || outside {
        return None;
    }
    let clamp_x = |v: f64| v.clamp(f64::from(clip.x1), f64::from(clip.x2));
    let clamp_y = |v: f64| v.clamp(f64::from(clip.y1), f64::from(clip.y2));
    let mut area = RectI::new(
        ifloor(clamp_x(b.x1)),
        ifloor(clamp_y(b.y1)),
        ifloor(clamp_x(b.x2)),
        ifloor(clamp_y(b.y2)),
    );
    area.clip(clip).then_some(area)
}

/// Clip a pixmap block against its source and `clip`, then hand what is
/// left to the sink. Returns `false` when nothing remains.
fn blit<S: Sink + ?Sized>(
    sink: &mut S,
    pixmap: &Pixmap,
    src: RectI,
    dest: (i32, i32),
    transparent: bool,
    clip: &RectI,
) -> bool {
    let mut s = src;
    s.normalize();
    if !s.clip(&pixmap.bounds()) {
        return false;
    }
    // Where the trimmed source block lands.
    let dx = dest.0.saturating_add(s.x1 - src.x1.min(src.x2));
    let dy = dest.1.saturating_add(s.y1 - src.y1.min(src.y2));
    let mut d = RectI::new(
        dx,
        dy,
        dx.saturating_add(s.width() - 1),
        dy.saturating_add(s.height() - 1),
    );
    if !d.clip(clip) {
        return false;
    }
    let origin = (s.x1 + (d.x1 - dx), s.y1 + (d.y1 - dy));
    sink.draw_pixmap(
        pixmap,
        origin,
        (d.width() as u32, d.height() as u32),
        (d.x1, d.y1),
        transparent,
    );
    true
}

// ============================================================================
// Tests
// ============================================================================
