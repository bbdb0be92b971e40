//! Pending drawing operations.
//!
//! Path calls build a current contour; every other call pushes a standalone
//! primitive. Starting any new object first flushes the open contour.
//! Consecutive contours collect into one contour-set primitive so they are
//! filled together. Nothing is rasterized here.

use std::rc::Rc;

use crate::basics::RectI;
use crate::bezier_arc::ArcSpec;
use crate::color::Rgba8;
use crate::contour::{Contour, Point};
use crate::pool::SegmentPool;
use crate::primitive::Primitive;
use crate::sink::Pixmap;

/// Ordered list of primitives awaiting fill, stroke or paint.
#[derive(Debug, Default)]
pub struct PrimitiveQueue {
    items: Vec<Primitive>,
    current: Option<Contour>,
    /// Where a path call with no open contour starts.
    pen: Option<Point>,
    pool: SegmentPool,
}

impl PrimitiveQueue {
    /// Empty queue recycling up to `pool_capacity` segment buffers.
    pub fn new(pool_capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            current: None,
            pen: None,
            pool: SegmentPool::new(pool_capacity),
        }
    }

    // ------------------------------------------------------------------------
    // Path building
    // ------------------------------------------------------------------------

    /// Flush the open contour and start a new one at `p`.
    pub fn move_to(&mut self, p: Point) {
        self.flush_contour();
        self.current = Some(self.pool.contour(p));
        self.pen = Some(p);
    }

    pub fn line_to(&mut self, p: Point) {
        self.contour_at(p).line_to(p);
    }

    pub fn conic_to(&mut self, c: Point, p: Point) {
        self.contour_at(c).conic_to(c, p);
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.contour_at(c1).cubic_to(c1, c2, p);
    }

    /// Close the open contour with an explicit edge back to its start. The
    /// next path call continues from that start.
    pub fn close_path(&mut self) {
        if let Some(c) = self.current.as_mut() {
            let start = c.start();
            if !c.is_empty() && c.end_point() != start {
                c.line_to(start);
            }
            self.flush_contour();
            self.pen = Some(start);
        }
    }

    /// The open contour, starting one at the pen (or at `fallback` when
    /// there is no pen yet).
    fn contour_at(&mut self, fallback: Point) -> &mut Contour {
        let pool = &mut self.pool;
        let start = self.pen.unwrap_or(fallback);
        self.current.get_or_insert_with(|| pool.contour(start))
    }

    /// Move the open contour into the queue. Empty contours are recycled.
    fn flush_contour(&mut self) {
        let Some(c) = self.current.take() else {
            return;
        };
        if c.is_empty() {
            self.pool.recycle(c);
            return;
        }
        match self.items.last_mut() {
            Some(Primitive::Contours(set)) => set.push(c),
            _ => self.items.push(Primitive::Contours(vec![c])),
        }
    }

    // ------------------------------------------------------------------------
    // Standalone primitives
    // ------------------------------------------------------------------------

    fn push(&mut self, prim: Primitive) {
        self.flush_contour();
        self.pen = None;
        self.items.push(prim);
    }

    pub fn rectangle(&mut self, p1: Point, p2: Point) {
        self.push(Primitive::Rectangle { p1, p2 });
    }

    pub fn arc(&mut self, arc: ArcSpec) {
        self.push(Primitive::Arc(arc));
    }

    pub fn text(&mut self, pos: Point, text: impl Into<String>, color: Rgba8) {
        self.push(Primitive::Text {
            pos,
            text: text.into(),
            color,
        });
    }

    pub fn pixmap(&mut self, pixmap: Rc<Pixmap>, src: RectI, dest: Point, transparent: bool) {
        self.push(Primitive::Pixmap {
            pixmap,
            src,
            dest,
            transparent,
        });
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    /// Flush the open contour and return everything queued.
    pub fn primitives(&mut self) -> &[Primitive] {
        self.flush_contour();
        &self.items
    }

    /// Queued primitives together with the buffer pool, for the transform
    /// stage.
    pub fn parts_mut(&mut self) -> (&[Primitive], &mut SegmentPool) {
        self.flush_contour();
        (&self.items, &mut self.pool)
    }

    pub fn pool(&self) -> &SegmentPool {
        &self.pool
    }

    /// Number of queued primitives, not counting an open contour.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when nothing is queued and no contour is open.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.current.as_ref().map_or(true, Contour::is_empty)
    }

    /// Drop everything, recycling contour buffers.
    pub fn clear(&mut self) {
        if let Some(c) = self.current.take() {
            self.pool.recycle(c);
        }
        for prim in self.items.drain(..) {
            if let Primitive::Contours(set) = prim {
                self.pool.recycle_all(set);
            }
        }
        self.pen = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
