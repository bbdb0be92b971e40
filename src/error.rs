//! Construction-time errors.
//!
//! Nothing in the fill/stroke path returns an error: degenerate geometry is
//! skipped and numeric edge cases saturate. These variants only come from
//! validating configuration and wrapping caller-provided pixel buffers.

use thiserror::Error;

/// Errors that can occur when setting up a painter or a pixmap.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Arc tolerance must be a positive, finite number of device units.
    #[error("arc tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
    /// Bezier subdivision threshold must be at least one fixed-point unit.
    #[error("bezier threshold must be at least 1 fixed-point unit, got {0}")]
    InvalidThreshold(i64),
    /// The segment pool must be able to hold at least one buffer.
    #[error("segment pool capacity must be non-zero")]
    InvalidPoolCapacity,
    /// A pixel buffer does not match the requested dimensions.
    #[error("pixel buffer of {len} bytes does not fit a {width}x{height} RGBA surface")]
    PixmapSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Actual buffer length in bytes.
        len: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
