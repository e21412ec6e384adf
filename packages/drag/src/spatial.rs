//! Spatial query seam
//!
//! The drag coordinator never touches the DOM directly. Hosts implement
//! `SpatialIndex` over whatever layout engine they render with; tests
//! implement it over hand-built rectangles.

use crate::geometry::{Orientation, Point, Rect};

/// Live geometry queries for drop containers and their rendered children
pub trait SpatialIndex {
    /// Innermost drop container under `point`, if any.
    ///
    /// Hosts resolve this the way a DOM hit test does: the deepest element
    /// tagged as a drop container that encloses the point.
    fn container_at(&self, point: Point) -> Option<String>;

    /// Ordered bounding boxes of the container's visible child items.
    /// `None` when the container id is unknown (e.g. unmounted mid-drag).
    fn child_rects(&self, container_id: &str) -> Option<Vec<Rect>>;

    /// Layout axis the container stacks its children along
    fn orientation(&self, container_id: &str) -> Orientation;

    /// Current position of `block_id` among the container's items
    fn index_of(&self, container_id: &str, block_id: &str) -> Option<usize>;

    /// True when the container element sits inside the rendered subtree of
    /// `block_id`. Used to refuse drops into the dragged block's own
    /// descendants at the DOM level, independent of the tree-level guard.
    fn is_inside(&self, container_id: &str, block_id: &str) -> bool;
}
