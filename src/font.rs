//! Glyph outlines as contours, over `ttf-parser`.
//!
//! Font units grow upward; contours come out y-down with the baseline at
//! `y = 0`, scaled so one em is `size` units. A glyph's contours are meant to
//! be queued together so counters (the hole in "o") fill correctly.

use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::contour::{Contour, Point};

/// Outline and advance of one glyph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphOutline {
    pub contours: Vec<Contour>,
    /// Horizontal advance in output units.
    pub advance: f64,
}

/// Outline of `glyph` at `size` units per em. `None` when the face has no
/// such glyph. Glyphs without an outline (spaces) yield no contours but keep
/// their advance.
pub fn glyph_contours(face: &Face<'_>, glyph: GlyphId, size: f64) -> Option<GlyphOutline> {
    if glyph.0 >= face.number_of_glyphs() {
        return None;
    }
    let scale = size / f64::from(face.units_per_em());
    let mut collector = ContourCollector::new(scale);
    // An empty outline is not an error: the glyph just draws nothing.
    let _ = face.outline_glyph(glyph, &mut collector);
    let advance = face
        .glyph_hor_advance(glyph)
        .map_or(0.0, |a| f64::from(a) * scale);
    Some(GlyphOutline {
        contours: collector.finish(),
        advance,
    })
}

/// Contours for `text` laid out on one baseline starting at `origin`.
/// Characters missing from the face are skipped.
pub fn text_contours(face: &Face<'_>, text: &str, size: f64, origin: Point) -> Vec<Contour> {
    let mut out = Vec::new();
    let mut pen_x = origin.x;
    for ch in text.chars() {
        let Some(id) = face.glyph_index(ch) else {
            continue;
        };
        let Some(glyph) = glyph_contours(face, id, size) else {
            continue;
        };
        for mut c in glyph.contours {
            c.translate(pen_x, origin.y);
            out.push(c);
        }
        pen_x += glyph.advance;
    }
    out
}

// ============================================================================
// ContourCollector
// ============================================================================

/// Receives outline commands and builds contours.
struct ContourCollector {
    scale: f64,
    current: Option<Contour>,
    contours: Vec<Contour>,
}

impl ContourCollector {
    fn new(scale: f64) -> Self {
        Self {
            scale,
            current: None,
            contours: Vec::new(),
        }
    }

    #[inline]
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(f64::from(x) * self.scale, -f64::from(y) * self.scale)
    }

    fn flush(&mut self) {
        if let Some(c) = self.current.take() {
            if !c.is_empty() {
                self.contours.push(c);
            }
        }
    }

    fn contour(&mut self, at: Point) -> &mut Contour {
        self.current.get_or_insert_with(|| Contour::new(at))
    }

    fn finish(mut self) -> Vec<Contour> {
        self.flush();
        self.contours
    }
}

impl OutlineBuilder for ContourCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.current = Some(Contour::new(self.point(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.contour(p).line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.point(x1, y1), self.point(x, y));
        self.contour(c).conic_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.point(x1, y1), self.point(x2, y2), self.point(x, y));
        self.contour(c1).cubic_to(c1, c2, p);
    }

    fn close(&mut self) {
        if let Some(c) = self.current.as_mut() {
            let start = c.start();
            if !c.is_empty() && c.end_point() != start {
                c.line_to(start);
            }
        }
        self.flush();
    }
}

// ============================================================================
// Tests
// ============================================================================
