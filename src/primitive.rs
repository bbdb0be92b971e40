//! Queued drawing primitives.

use std::rc::Rc;

use crate::basics::RectI;
use crate::bezier_arc::ArcSpec;
use crate::color::Rgba8;
use crate::contour::{Contour, Point};
use crate::sink::Pixmap;

/// One pending drawing operation, in user space.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Contours filled or stroked together, so holes resolve by winding.
    Contours(Vec<Contour>),
    /// Rectangle between two opposite corners.
    Rectangle { p1: Point, p2: Point },
    /// Circular arc or pie slice.
    Arc(ArcSpec),
    /// Text run, drawn by the backend.
    Text {
        pos: Point,
        text: String,
        color: Rgba8,
    },
    /// Block `src` of a pixmap, placed with its top-left corner at `dest`.
    Pixmap {
        pixmap: Rc<Pixmap>,
        src: RectI,
        dest: Point,
        transparent: bool,
    },
}

impl Primitive {
    /// Contours, rectangles and arcs: the kinds fill and stroke draw.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            Primitive::Contours(_) | Primitive::Rectangle { .. } | Primitive::Arc(_)
        )
    }

    /// Text and pixmaps: the kinds `paint` draws.
    pub fn is_paintable(&self) -> bool {
        !self.is_geometry()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Primitive::Contours(_) => "contours",
            Primitive::Rectangle { .. } => "rectangle",
            Primitive::Arc(_) => "arc",
            Primitive::Text { .. } => "text",
            Primitive::Pixmap { .. } => "pixmap",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let rect = Primitive::Rectangle {
            p1: Point::ZERO,
            p2: Point::new(1.0, 1.0),
        };
        assert!(rect.is_geometry());
        assert_eq!(rect.kind_name(), "rectangle");

        let text = Primitive::Text {
            pos: Point::ZERO,
            text: "hi".into(),
            color: Rgba8::BLACK,
        };
        assert!(text.is_paintable());

        let pix = Primitive::Pixmap {
            pixmap: Rc::new(Pixmap::new(1, 1)),
            src: RectI::new(0, 0, 0, 0),
            dest: Point::ZERO,
            transparent: false,
        };
        assert!(pix.is_paintable());
        assert!(Primitive::Contours(Vec::new()).is_geometry());
    }
}
