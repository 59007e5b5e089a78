// src/coordinates.rs
//
// The one place normalized detector space meets view space.
//
// Detector space: origin bottom-left, y up, [0, 1]².
// View space:     origin top-left, y down, pixels.

use crate::types::Point2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub width: f64,
    pub height: f64,
}

impl ViewTransform {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn to_view(&self, p: Point2) -> Point2 {
        Point2::new(p.x * self.width, (1.0 - p.y) * self.height)
    }

    pub fn to_normalized(&self, p: Point2) -> Point2 {
        Point2::new(p.x / self.width, 1.0 - p.y / self.height)
    }
}
