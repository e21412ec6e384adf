//! # Mosaic Drag
//!
//! Pointer-driven drag coordination for the Mosaic block engine.
//!
//! ```text
//! pointer events → DragCoordinator → DragResult → drop router → tree ops
//! ```
//!
//! The crate is platform-free: all live geometry flows in through the
//! [`SpatialIndex`] trait, so the state machine and the insertion-index
//! algorithm run headless in tests.

mod coordinator;
mod geometry;
mod spatial;

pub use coordinator::{DragCoordinator, DragResult, DropTarget};
pub use geometry::{insertion_index, Orientation, Point, Rect};
pub use spatial::SpatialIndex;
