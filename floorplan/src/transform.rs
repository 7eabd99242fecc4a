//! Coordinate transform between plan-relative percentages and pixels.
//!
//! Percentages are the persisted, resolution-independent unit. Pixels are a
//! disposable projection derived from the current container size; nothing in
//! this module ever writes back into the percent model.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

/// A point in container pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the rendering container.
///
/// Process-local and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanSize {
    pub width: f64,
    pub height: f64,
}

impl PlanSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions have been laid out (strictly positive).
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Pixel extent along one axis.
    #[must_use]
    pub fn extent(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    /// The smaller of the two dimensions.
    #[must_use]
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// Axis a percentage is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

/// Convert a pixel length along `dimension` to a percentage of the plan.
///
/// Returns `0.0` when the plan has not been measured along that axis.
#[must_use]
pub fn to_percent(px: f64, dimension: Dimension, plan: PlanSize) -> f64 {
    let extent = plan.extent(dimension);
    if extent <= 0.0 {
        return 0.0;
    }
    px * 100.0 / extent
}

/// Convert a percentage of the plan along `dimension` to pixels.
///
/// Returns `0.0` when the plan has not been measured along that axis.
#[must_use]
pub fn to_pixels(percent: f64, dimension: Dimension, plan: PlanSize) -> f64 {
    let extent = plan.extent(dimension);
    if extent <= 0.0 {
        return 0.0;
    }
    percent * extent / 100.0
}

/// Axis-aligned rectangle in container pixel space, anchored top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Build a rectangle from its four edges.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { x: left, y: top, width: right - left, height: bottom - top }
    }
}
