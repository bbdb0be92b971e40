//! Rasterizer tuning knobs.

use crate::basics::FillingRule;
use crate::error::{Error, Result};

/// Default arc chord deviation, in device pixels.
pub const DEFAULT_ARC_TOLERANCE: f64 = 1e-5;
/// Default Bezier subdivision threshold, in 16.16 units (about 1/256 px).
pub const DEFAULT_BEZIER_THRESHOLD: i64 = 255;
/// Default number of idle contour buffers kept between fills.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Settings shared by every fill and stroke of a painter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterConfig {
    /// Maximum deviation between an arc and its cubic approximation.
    pub arc_tolerance: f64,
    /// Bezier pieces taller than this (16.16 units) are split again.
    pub bezier_threshold: i64,
    /// How overlapping and nested contours resolve into spans.
    pub filling_rule: FillingRule,
    /// Run the second, orthogonal sweep that fades top and bottom edges.
    pub orthogonal_pass: bool,
    /// Idle segment buffers kept for reuse.
    pub pool_capacity: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            arc_tolerance: DEFAULT_ARC_TOLERANCE,
            bezier_threshold: DEFAULT_BEZIER_THRESHOLD,
            filling_rule: FillingRule::NonZero,
            orthogonal_pass: true,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl RasterConfig {
    pub fn with_arc_tolerance(mut self, tolerance: f64) -> Self {
        self.arc_tolerance = tolerance;
        self
    }

    pub fn with_bezier_threshold(mut self, threshold: i64) -> Self {
        self.bezier_threshold = threshold;
        self
    }

    pub fn with_filling_rule(mut self, rule: FillingRule) -> Self {
        self.filling_rule = rule;
        self
    }

    pub fn with_orthogonal_pass(mut self, enabled: bool) -> Self {
        self.orthogonal_pass = enabled;
        self
    }

    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Check every field is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.arc_tolerance.is_finite() && self.arc_tolerance > 0.0) {
            return Err(Error::InvalidTolerance(self.arc_tolerance));
        }
        if self.bezier_threshold < 1 {
            return Err(Error::InvalidThreshold(self.bezier_threshold));
        }
        if self.pool_capacity == 0 {
            return Err(Error::InvalidPoolCapacity);
        }
        Ok(())
    }
}
