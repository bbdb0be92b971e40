//! Fixed-point edge profile builder.
//!
//! Turns contours into monotonic edge runs ("profiles"): for every pixel row
//! an edge crosses, the profile stores the 16.16 x-coordinate where the edge
//! meets the row centre. Samples of all profiles live in one shared buffer.
//!
//! The builder is a small state machine. Each line moves the pen either
//! ascending (y grows) or descending; when the direction flips, the current
//! profile is finished and a new one begins. Curves are not flattened up
//! front. They are halved (de Casteljau) until a piece is shorter than the
//! threshold or no longer straddles a row centre, and each leaf goes through
//! the same line path.
//!
//! With `vert` set, x and y are swapped on input so the same machinery
//! produces column profiles for the orthogonal anti-aliasing pass.
//!
//! Row `r` is sampled at `r + 0.5`. An edge from `y1` to `y2` (`y1 < y2`)
//! covers the rows whose centre `c` satisfies `y1 <= c < y2`, so edges that
//! meet end to end share no row and miss none.

use crate::contour::{Contour, Point, Segment};
use crate::fixed::{mul_div, Fixed};

/// Maximum number of halvings applied to a single curve.
const MAX_BEZIER_DEPTH: u32 = 32;

/// Direction of a finished profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// y increases along the contour.
    Ascending,
    /// y decreases along the contour.
    Descending,
}

impl Direction {
    /// Winding contribution of a crossing with this direction.
    #[inline]
    pub fn winding(self) -> i32 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }
}

/// Direction state of the pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterState {
    /// No non-horizontal edge seen since the last move.
    #[default]
    Undetermined,
    Ascending,
    Descending,
}

impl From<Direction> for RasterState {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Ascending => RasterState::Ascending,
            Direction::Descending => RasterState::Descending,
        }
    }
}

/// One monotonic edge run.
///
/// Samples are stored top to bottom regardless of direction:
/// `xs[offset + i]` is the crossing for row `start + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// First sampled row.
    pub start: i64,
    /// Number of sampled rows.
    pub height: usize,
    pub direction: Direction,
    /// Index of the first sample in the shared buffer.
    pub offset: usize,
    /// The edge's top lies in the lower half of the row above `start`; that
    /// row is partially covered but not sampled.
    pub top_overshoot: bool,
    /// The edge's bottom lies in the upper half of the row after the last
    /// sampled one; that row is partially covered but not sampled.
    pub bottom_overshoot: bool,
}

impl Profile {
    /// One past the last sampled row.
    #[inline]
    pub fn end(&self) -> i64 {
        self.start + self.height as i64
    }
}

/// A point in the builder's own axes (swapped when `vert`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FPoint {
    x: Fixed,
    y: Fixed,
}

impl FPoint {
    #[inline]
    fn mid(a: FPoint, b: FPoint) -> FPoint {
        FPoint {
            x: Fixed::from_raw((a.x.raw() + b.x.raw()) >> 1),
            y: Fixed::from_raw((a.y.raw() + b.y.raw()) >> 1),
        }
    }
}

/// The profile currently receiving samples.
#[derive(Debug, Clone, Copy)]
struct Building {
    direction: Direction,
    offset: usize,
    ymin: Fixed,
    ymax: Fixed,
}

// ============================================================================
// Raster
// ============================================================================

/// Profile builder for one axis of one fill.
#[derive(Debug, Clone)]
pub struct Raster {
    vert: bool,
    threshold: i64,
    row_min: i64,
    row_max: i64,
    pen: FPoint,
    start: FPoint,
    open: bool,
    rstate: RasterState,
    building: Option<Building>,
    /// The current contour's first profile, while it still starts at the
    /// contour's start point.
    first_profile: Option<usize>,
    first_pending: bool,
    xs: Vec<Fixed>,
    profiles: Vec<Profile>,
}

impl Raster {
    /// A builder sampling rows (or columns when `vert`) with unbounded
    /// limits. `threshold` is the curve subdivision height in 16.16 units.
    pub fn new(vert: bool, threshold: i64) -> Self {
        Self {
            vert,
            threshold: threshold.max(1),
            row_min: i64::from(i32::MIN),
            row_max: i64::from(i32::MAX),
            pen: FPoint::default(),
            start: FPoint::default(),
            open: false,
            rstate: RasterState::Undetermined,
            building: None,
            first_profile: None,
            first_pending: false,
            xs: Vec::new(),
            profiles: Vec::new(),
        }
    }

    /// Only sample rows in `min..max`. Rows outside are never stored, which
    /// bounds memory for geometry far outside the clip.
    pub fn with_row_limits(mut self, min: i64, max: i64) -> Self {
        self.row_min = min;
        self.row_max = max.max(min);
        self
    }

    pub fn is_vertical(&self) -> bool {
        self.vert
    }

    pub fn state(&self) -> RasterState {
        self.rstate
    }

    /// Finished profiles, in creation order.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// The shared x-sample buffer.
    pub fn samples(&self) -> &[Fixed] {
        &self.xs
    }

    /// Samples belonging to `profile`.
    pub fn profile_samples(&self, profile: &Profile) -> &[Fixed] {
        &self.xs[profile.offset..profile.offset + profile.height]
    }

    /// Crossing of `profile` with `row`, if the row is inside the profile.
    pub fn sample_at(&self, profile: &Profile, row: i64) -> Option<Fixed> {
        if row < profile.start || row >= profile.end() {
            return None;
        }
        self.xs.get(profile.offset + (row - profile.start) as usize).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Add every contour of a set; each is implicitly closed.
    pub fn add_contours<'a>(&mut self, contours: impl IntoIterator<Item = &'a Contour>) {
        for c in contours {
            self.add_contour(c);
        }
    }

    /// Add one contour, closing it back to its start.
    pub fn add_contour(&mut self, contour: &Contour) {
        self.move_to(contour.start());
        for seg in contour.segments() {
            match *seg {
                Segment::Line(p) => self.line_to(p),
                Segment::Conic(c, p) => self.conic_to(c, p),
                Segment::Cubic(c1, c2, p) => self.cubic_to(c1, c2, p),
            }
        }
        self.close();
    }

    // ------------------------------------------------------------------------
    // Pen operations
    // ------------------------------------------------------------------------

    /// Close any open contour and start a new one at `p`.
    pub fn move_to(&mut self, p: Point) {
        self.close();
        let p = self.map(p);
        self.start = p;
        self.pen = p;
        self.open = true;
        self.first_profile = None;
        self.first_pending = true;
    }

    pub fn line_to(&mut self, p: Point) {
        self.open = true;
        let to = self.map(p);
        self.line_to_fixed(to);
    }

    pub fn conic_to(&mut self, c: Point, p: Point) {
        self.open = true;
        let pts = [self.pen, self.map(c), self.map(p)];
        self.raster_bezier_up(&pts, 0);
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.open = true;
        let pts = [self.pen, self.map(c1), self.map(c2), self.map(p)];
        self.raster_bezier_up(&pts, 0);
    }

    /// Walk the synthetic closing edge and finish the last profile.
    pub fn close(&mut self) {
        if self.open {
            let start = self.start;
            self.line_to_fixed(start);
            let last = self.finish_profile();
            if let (Some(first), Some(last)) = (self.first_profile, last) {
                self.join_at_start(first, last);
            }
            self.first_profile = None;
            self.first_pending = false;
            self.rstate = RasterState::Undetermined;
            self.open = false;
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    #[inline]
    fn map(&self, p: Point) -> FPoint {
        let (x, y) = if self.vert { (p.y, p.x) } else { (p.x, p.y) };
        FPoint {
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
        }
    }

    fn line_to_fixed(&mut self, to: FPoint) {
        let from = self.pen;
        self.pen = to;
        if to.y == from.y {
            return;
        }
        let direction = if to.y > from.y {
            Direction::Ascending
        } else {
            Direction::Descending
        };
        if self.rstate != RasterState::from(direction) {
            self.finish_profile();
            self.building = Some(Building {
                direction,
                offset: self.xs.len(),
                ymin: from.y,
                ymax: from.y,
            });
            self.rstate = direction.into();
        }
        match direction {
            Direction::Ascending => self.raster_line_up(from, to),
            Direction::Descending => {
                let mark = self.xs.len();
                self.raster_line_up(to, from);
                self.xs[mark..].reverse();
            }
        }
        if let Some(b) = self.building.as_mut() {
            b.ymin = b.ymin.min(to.y);
            b.ymax = b.ymax.max(to.y);
        }
    }

    /// Append the x-crossings of an upward edge (`a.y < b.y`) with every
    /// row centre in `[a.y, b.y)`, within the row limits.
    fn raster_line_up(&mut self, a: FPoint, b: FPoint) {
        let first = a.y.first_center().max(self.row_min);
        let last = b.y.first_center().min(self.row_max);
        if first >= last {
            return;
        }
        let dx = (b.x - a.x).raw();
        let dy = (b.y - a.y).raw();
        let one = Fixed::ONE.raw();

        // First sample by direct interpolation.
        let c0 = Fixed::center(first);
        let t = (c0 - a.y).raw();
        let mut x = a.x.raw().saturating_add(mul_div(dx, t, dy));
        // Remainder of that division, carried as the stepping error.
        let mut err = (dx as i128 * t as i128).rem_euclid(dy as i128) as i64;

        // Per-row step: `ix + rx / dy`, with `0 <= rx < dy`.
        let ix = mul_div(dx, one, dy);
        let rx = (dx as i128 * one as i128 - ix as i128 * dy as i128).clamp(0, dy as i128 - 1) as i64;

        let count = (last - first) as usize;
        self.xs.reserve(count);
        for _ in 0..count {
            self.xs.push(Fixed::from_raw(x));
            x = x.saturating_add(ix);
            err += rx;
            if err >= dy {
                err -= dy;
                x = x.saturating_add(1);
            }
        }
    }

    /// Halve a Bezier piece until it is flat enough in y, then hand its end
    /// to the line path. `pts` holds 3 (conic) or 4 (cubic) points.
    fn raster_bezier_up(&mut self, pts: &[FPoint], depth: u32) {
        let (mut ymin, mut ymax) = (pts[0].y, pts[0].y);
        for p in &pts[1..] {
            ymin = ymin.min(p.y);
            ymax = ymax.max(p.y);
        }
        let rows_lo = ymin.first_center().max(self.row_min);
        let rows_hi = ymax.first_center().min(self.row_max);
        let straddles = rows_lo < rows_hi;

        if depth >= MAX_BEZIER_DEPTH || !straddles || (ymax - ymin).raw() <= self.threshold {
            self.line_to_fixed(pts[pts.len() - 1]);
            return;
        }

        match *pts {
            [p0, c, p1] => {
                let q0 = FPoint::mid(p0, c);
                let q1 = FPoint::mid(c, p1);
                let m = FPoint::mid(q0, q1);
                self.raster_bezier_up(&[p0, q0, m], depth + 1);
                self.raster_bezier_up(&[m, q1, p1], depth + 1);
            }
            [p0, c1, c2, p1] => {
                let q0 = FPoint::mid(p0, c1);
                let q1 = FPoint::mid(c1, c2);
                let q2 = FPoint::mid(c2, p1);
                let r0 = FPoint::mid(q0, q1);
                let r1 = FPoint::mid(q1, q2);
                let m = FPoint::mid(r0, r1);
                self.raster_bezier_up(&[p0, q0, r0, m], depth + 1);
                self.raster_bezier_up(&[m, r1, q2, p1], depth + 1);
            }
            _ => self.line_to_fixed(pts[pts.len() - 1]),
        }
    }

    /// A contour starting midway along a monotonic run is split there into
    /// its first and last profile. The start point is no extremum of the
    /// shape, so neither profile overshoots at it.
    fn join_at_start(&mut self, first: usize, last: usize) {
        if first == last || self.profiles[first].direction != self.profiles[last].direction {
            return;
        }
        match self.profiles[first].direction {
            Direction::Ascending => {
                self.profiles[first].top_overshoot = false;
                self.profiles[last].bottom_overshoot = false;
            }
            Direction::Descending => {
                self.profiles[first].bottom_overshoot = false;
                self.profiles[last].top_overshoot = false;
            }
        }
    }

    /// Store the profile under construction, dropping it if it sampled no
    /// row. Returns the index of the stored profile.
    fn finish_profile(&mut self) -> Option<usize> {
        let b = self.building.take()?;
        let first = std::mem::take(&mut self.first_pending);
        let height = self.xs.len() - b.offset;
        if height == 0 {
            return None;
        }
        if b.direction == Direction::Descending {
            self.xs[b.offset..].reverse();
        }
        let half = Fixed::HALF;
        let top_frac = b.ymin.frac();
        let bottom_frac = b.ymax.frac();
        self.profiles.push(Profile {
            start: b.ymin.first_center().clamp(self.row_min, self.row_max),
            height,
            direction: b.direction,
            offset: b.offset,
            top_overshoot: top_frac > half,
            bottom_overshoot: bottom_frac > Fixed::ZERO && bottom_frac <= half,
        });
        let index = self.profiles.len() - 1;
        if first {
            self.first_profile = Some(index);
        }
        Some(index)
    }
}

// ============================================================================
// Tests
// ============================================================================
