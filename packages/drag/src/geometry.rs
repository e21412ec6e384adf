//! Geometry primitives and the pure insertion-index algorithm
//!
//! Everything here is platform-free: rectangles come in through the
//! `SpatialIndex` seam, so the midpoint scan can be tested without a DOM.

use serde::{Deserialize, Serialize};

/// Pointer position in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box of a rendered block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Primary axis along which a container lays out its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Candidate insertion index for a pointer over a container's children.
///
/// Linear scan in visual order: the first child whose midpoint on the
/// primary axis lies past the pointer claims the slot; if no midpoint is
/// past the pointer, the drop appends.
pub fn insertion_index(pointer: Point, child_rects: &[Rect], orientation: Orientation) -> usize {
    let coord = match orientation {
        Orientation::Vertical => pointer.y,
        Orientation::Horizontal => pointer.x,
    };

    for (index, rect) in child_rects.iter().enumerate() {
        let midpoint = match orientation {
            Orientation::Vertical => rect.mid_y(),
            Orientation::Horizontal => rect.mid_x(),
        };

        if coord < midpoint {
            return index;
        }
    }

    child_rects.len()
}
