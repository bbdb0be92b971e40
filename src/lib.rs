//! # raster-painter
//!
//! Painter core with a fixed-point scanline rasterizer. Paths made of lines,
//! quadratic and cubic Bezier curves, circular arcs and rectangles are turned
//! into anti-aliased coverage after an affine transform, a window offset and
//! a clip rectangle. All pixel output goes through a small backend trait,
//! [`Sink`].
//!
//! ## Architecture
//!
//! A fill runs through five stages:
//!
//! 1. **Primitive queue**: drawing calls build contours and queue rectangles,
//!    arcs, text runs and pixmaps without rasterizing anything.
//! 2. **Transform stage**: the matrix and window offset map each primitive to
//!    device pixels; whole-pixel rectangles short-circuit to a plain fill and
//!    arcs are tessellated into cubics.
//! 3. **Profile builder**: edges are sampled at every pixel-row centre in
//!    16.16 fixed point, grouped into monotonic profiles.
//! 4. **Sweep**: rows are walked top to bottom, crossings merged by winding,
//!    and the resulting spans recorded per row. A second, orthogonal sweep
//!    records spans per column, so top and bottom edges fade like the sides.
//! 5. **Coverage and sink**: both sets of spans merge into per-pixel coverage,
//!    and clipped, batched rectangles reach the backend.
//!
//! Strokes skip stages 3 and 4 and become pixel polylines for the sink.
//!
//! ```
//! use raster_painter::{Canvas, Painter, Rgba8};
//!
//! let mut p = Painter::new(Canvas::new(16, 16));
//! p.set_brush(Rgba8::new_opaque(200, 0, 0));
//! p.move_to(2.0, 2.0);
//! p.line_to(14.0, 2.0);
//! p.line_to(8.0, 14.0);
//! p.fill();
//! assert_eq!(p.sink().pixel(8, 8), Rgba8::new_opaque(200, 0, 0));
//! ```

// Foundation types & math
pub mod basics;
pub mod color;
pub mod fixed;
pub mod trans_affine;

// Geometry
pub mod bezier_arc;
pub mod contour;

// Queue & transform
pub mod pool;
pub mod primitive;
pub mod queue;
pub mod transform;

// Rasterizer
pub mod coverage;
pub mod raster;
pub mod sweep;

// Output
pub mod painter;
pub mod sink;
pub mod stroke;

pub mod config;
pub mod error;

#[cfg(feature = "font")]
pub mod font;

pub use basics::{FillingRule, RectD, RectI};
pub use color::Rgba8;
pub use config::RasterConfig;
pub use contour::{Contour, Point, Segment};
pub use error::{Error, Result};
pub use fixed::Fixed;
pub use painter::{Painter, PainterState};
pub use sink::{Canvas, Pixmap, Sink};
pub use stroke::Pen;
pub use trans_affine::TransAffine;
