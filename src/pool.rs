//! Bounded recycling of contour segment buffers.
//!
//! Painters build and discard many small contours per frame. Instead of
//! freeing each segment vector after a fill, the queue hands it back here and
//! the next `move_to` reuses it. The free list is capped; past the cap,
//! buffers are simply dropped, and an empty pool just allocates.

use crate::contour::{Contour, Point, Segment};

/// Free list of segment buffers with a fixed capacity.
#[derive(Debug, Default)]
pub struct SegmentPool {
    free: Vec<Vec<Segment>>,
    capacity: usize,
    reused: u64,
    allocated: u64,
}

impl SegmentPool {
    /// A pool keeping at most `capacity` idle buffers.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
            reused: 0,
            allocated: 0,
        }
    }

    /// A fresh contour at `start`, backed by a recycled buffer if one is idle.
    pub fn contour(&mut self, start: Point) -> Contour {
        match self.free.pop() {
            Some(buf) => {
                self.reused += 1;
                Contour::with_buffer(start, buf)
            }
            None => {
                self.allocated += 1;
                Contour::new(start)
            }
        }
    }

    /// Return a contour's buffer to the pool.
    pub fn recycle(&mut self, contour: Contour) {
        if self.free.len() < self.capacity {
            let mut buf = contour.into_segments();
            buf.clear();
            self.free.push(buf);
        }
    }

    /// Return every contour of an iterator.
    pub fn recycle_all(&mut self, contours: impl IntoIterator<Item = Contour>) {
        for c in contours {
            self.recycle(c);
        }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(reused, freshly allocated)` counts since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.reused, self.allocated)
    }
}
