//! Backend sink: the only place pixels are written.
//!
//! The rasterizer reduces every fill to batches of axis-aligned rectangles
//! with one color each, and every blit to a pixmap copy. A backend implements
//! [`Sink`] to receive them. Stroke primitives (`draw_line`,
//! `draw_polyline`, `draw_rectangle`) have default implementations built on
//! `fill_rectangles`; backends with native line drawing override them.
//!
//! [`Canvas`] is the reference backend over an owned RGBA [`Pixmap`].

use crate::basics::RectI;
use crate::color::Rgba8;
use crate::contour::Point;
use crate::error::{Error, Result};

const BPP: usize = 4;

// ============================================================================
// Pixmap
// ============================================================================

/// Owned RGBA8 pixel buffer, straight alpha, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Fully transparent pixmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BPP],
        }
    }

    /// Wrap an existing buffer, which must hold exactly `width * height`
    /// RGBA pixels.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BPP));
        if expected != Some(data.len()) {
            return Err(Error::PixmapSize {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bounds as an inclusive pixel rectangle.
    pub fn bounds(&self) -> RectI {
        RectI::from_size(self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * BPP)
    }

    /// Color at `(x, y)`, or `None` outside the pixmap.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8> {
        let off = self.offset(x, y)?;
        let p = &self.data[off..off + BPP];
        Some(Rgba8::new(p[0], p[1], p[2], p[3]))
    }

    /// Overwrite the pixel at `(x, y)`; ignored outside the pixmap.
    pub fn set_pixel(&mut self, x: i32, y: i32, c: Rgba8) {
        if let Some(off) = self.offset(x, y) {
            self.data[off..off + BPP].copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, c: Rgba8) {
        for p in self.data.chunks_exact_mut(BPP) {
            p.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Blend `c` over a horizontal run, `x1..=x2` on row `y`. The run must
    /// already be inside the pixmap.
    fn blend_hline(&mut self, x1: i32, y: i32, x2: i32, c: Rgba8) {
        let (Some(start), Some(end)) = (self.offset(x1, y), self.offset(x2, y)) else {
            return;
        };
        let run = &mut self.data[start..end + BPP];
        if c.is_opaque() {
            for p in run.chunks_exact_mut(BPP) {
                p.copy_from_slice(&[c.r, c.g, c.b, 255]);
            }
        } else {
            for p in run.chunks_exact_mut(BPP) {
                p[0] = Rgba8::lerp(p[0], c.r, c.a);
                p[1] = Rgba8::lerp(p[1], c.g, c.a);
                p[2] = Rgba8::lerp(p[2], c.b, c.a);
                p[3] = Rgba8::lerp(p[3], 255, c.a);
            }
        }
    }
}

// ============================================================================
// Sink
// ============================================================================

/// The contract a drawing backend implements.
pub trait Sink {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Blend `color` over every pixel of each inclusive rectangle. Rectangles
    /// arrive already clipped to the painter's clip.
    fn fill_rectangles(&mut self, rects: &[RectI], color: Rgba8);

    /// Copy the `src_size` block of `pixmap` at `src_origin` to
    /// `dest_origin`. With `transparent`, source pixels blend by their own
    /// alpha instead of replacing the destination.
    fn draw_pixmap(
        &mut self,
        pixmap: &Pixmap,
        src_origin: (i32, i32),
        src_size: (u32, u32),
        dest_origin: (i32, i32),
        transparent: bool,
    );

    /// Draw a text run. Glyph rendering belongs to the backend; the default
    /// draws nothing.
    fn draw_text(&mut self, _pos: Point, _text: &str, _color: Rgba8) {}

    /// Draw a `width`-pixel line between two pixel centres, end points
    /// included, limited to `clip`.
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), width: u32, color: Rgba8, clip: RectI) {
        let mut rects = Vec::new();
        push_line_squares(&mut rects, from, to, width, false);
        fill_clipped(self, rects, color, &clip);
    }

    /// Draw connected lines through `points`, back to the first point when
    /// `closed`, limited to `clip`. Shared vertices are painted once.
    fn draw_polyline(&mut self, points: &[(i32, i32)], width: u32, color: Rgba8, closed: bool, clip: RectI) {
        let mut rects = Vec::new();
        match points {
            [] => return,
            [p] => push_line_squares(&mut rects, *p, *p, width, false),
            _ => {
                for (i, w) in points.windows(2).enumerate() {
                    push_line_squares(&mut rects, w[0], w[1], width, i > 0);
                }
                if closed && points.len() > 2 {
                    let last = points[points.len() - 1];
                    if last != points[0] {
                        push_line_squares(&mut rects, last, points[0], width, true);
                        // The first vertex was painted by the first segment.
                        rects.pop();
                    }
                }
            }
        }
        fill_clipped(self, rects, color, &clip);
    }

    /// Outline an inclusive pixel rectangle with bars `width` pixels thick,
    /// centred on its border, limited to `clip`.
    fn draw_rectangle(&mut self, rect: RectI, width: u32, color: Rgba8, clip: RectI) {
        let mut r = rect;
        r.normalize();
        let w = width.max(1) as i32;
        let grow = (w - 1) / 2;
        let outer = RectI::new(
            r.x1.saturating_sub(grow),
            r.y1.saturating_sub(grow),
            r.x2.saturating_sub(grow).saturating_add(w - 1),
            r.y2.saturating_sub(grow).saturating_add(w - 1),
        );
        if outer.width() <= 2 * w || outer.height() <= 2 * w {
            fill_clipped(self, vec![outer], color, &clip);
            return;
        }
        let bars = vec![
            RectI::new(outer.x1, outer.y1, outer.x2, outer.y1 + w - 1),
            RectI::new(outer.x1, outer.y2 - w + 1, outer.x2, outer.y2),
            RectI::new(outer.x1, outer.y1 + w, outer.x1 + w - 1, outer.y2 - w),
            RectI::new(outer.x2 - w + 1, outer.y1 + w, outer.x2, outer.y2 - w),
        ];
        fill_clipped(self, bars, color, &clip);
    }
}

/// Clip `rects` in place and send the survivors, if any.
fn fill_clipped<S: Sink + ?Sized>(sink: &mut S, mut rects: Vec<RectI>, color: Rgba8, clip: &RectI) {
    rects.retain_mut(|r| r.clip(clip));
    if !rects.is_empty() {
        sink.fill_rectangles(&rects, color);
    }
}

/// Append one `width x width` square per DDA step from `a` to `b`. With
/// `skip_first`, the square at `a` is left out.
fn push_line_squares(out: &mut Vec<RectI>, a: (i32, i32), b: (i32, i32), width: u32, skip_first: bool) {
    let w = width.max(1) as i64;
    let half = (w - 1) / 2;
    let (dx, dy) = (b.0 as i64 - a.0 as i64, b.1 as i64 - a.1 as i64);
    let steps = dx.abs().max(dy.abs());
    let square = |x: i64, y: i64| {
        let x1 = (x - half).clamp(i32::MIN as i64, i32::MAX as i64);
        let y1 = (y - half).clamp(i32::MIN as i64, i32::MAX as i64);
        let x2 = (x - half + w - 1).clamp(i32::MIN as i64, i32::MAX as i64);
        let y2 = (y - half + w - 1).clamp(i32::MIN as i64, i32::MAX as i64);
        RectI::new(x1 as i32, y1 as i32, x2 as i32, y2 as i32)
    };
    let first = skip_first as i64;
    if steps == 0 {
        if !skip_first {
            out.push(square(a.0 as i64, a.1 as i64));
        }
        return;
    }
    for i in first..=steps {
        // Round to the nearest pixel: floor((2 * d * i + steps) / (2 * steps)).
        let x = a.0 as i64 + (2 * dx * i + steps).div_euclid(2 * steps);
        let y = a.1 as i64 + (2 * dy * i + steps).div_euclid(2 * steps);
        out.push(square(x, y));
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// Reference [`Sink`] writing into an owned [`Pixmap`].
#[derive(Debug, Clone)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: Pixmap::new(width, height),
        }
    }

    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Color at `(x, y)`; transparent outside the surface.
    pub fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        self.pixmap.pixel(x, y).unwrap_or_default()
    }

    /// Overwrite the whole surface.
    pub fn clear(&mut self, c: Rgba8) {
        self.pixmap.fill(c);
    }
}

impl Sink for Canvas {
    fn width(&self) -> u32 {
        self.pixmap.width
    }

    fn height(&self) -> u32 {
        self.pixmap.height
    }

    fn fill_rectangles(&mut self, rects: &[RectI], color: Rgba8) {
        if color.is_transparent() {
            return;
        }
        let bounds = self.pixmap.bounds();
        for r in rects {
            let mut r = *r;
            r.normalize();
            if !r.clip(&bounds) {
                continue;
            }
            for y in r.y1..=r.y2 {
                self.pixmap.blend_hline(r.x1, y, r.x2, color);
            }
        }
    }

    fn draw_pixmap(
        &mut self,
        pixmap: &Pixmap,
        src_origin: (i32, i32),
        src_size: (u32, u32),
        dest_origin: (i32, i32),
        transparent: bool,
    ) {
        if src_size.0 == 0 || src_size.1 == 0 {
            return;
        }
        // Source block, clipped to the source pixmap.
        let mut src = RectI::new(
            src_origin.0,
            src_origin.1,
            src_origin.0.saturating_add(src_size.0.min(i32::MAX as u32) as i32 - 1),
            src_origin.1.saturating_add(src_size.1.min(i32::MAX as u32) as i32 - 1),
        );
        if !src.clip(&pixmap.bounds()) {
            return;
        }
        let dx = dest_origin.0 as i64 - src_origin.0 as i64;
        let dy = dest_origin.1 as i64 - src_origin.1 as i64;
        for sy in src.y1..=src.y2 {
            let ty = sy as i64 + dy;
            if ty < 0 || ty >= self.pixmap.height as i64 {
                continue;
            }
            for sx in src.x1..=src.x2 {
                let tx = sx as i64 + dx;
                if tx < 0 || tx >= self.pixmap.width as i64 {
                    continue;
                }
                let Some(c) = pixmap.pixel(sx, sy) else {
                    continue;
                };
                let (tx, ty) = (tx as i32, ty as i32);
                if transparent {
                    let dst = self.pixel(tx, ty);
                    self.pixmap.set_pixel(tx, ty, c.blend_over(dst));
                } else {
                    self.pixmap.set_pixel(tx, ty, c);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
