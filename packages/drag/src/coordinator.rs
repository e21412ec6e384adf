//! # Drag Coordinator
//!
//! Single-gesture state machine turning raw pointer events into one
//! resolved drop decision.
//!
//! ## Design
//!
//! - One active drag at a time; a second start while dragging is ignored
//! - Hover state is a single cell, overwritten on every move event -
//!   bursts of pointer events coalesce to the latest value
//! - Drop resolution priority: native destination, then the cached hover
//!   state, then a fallback recomputation under the release point (fast
//!   or touch-originated gestures can skip every hover callback)
//! - Exactly one result per gesture: a committed drop sets a flag that
//!   suppresses the trailing drag-end event some platforms also fire
//! - A container rendered inside the dragged block is never a candidate
//!
//! The coordinator only decides *where*; applying the move to the tree is
//! the caller's job (see `mosaic-editor`'s drop router).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{insertion_index, Point};
use crate::spatial::SpatialIndex;

/// A container and insertion position within it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub container_id: String,
    pub index: usize,
}

/// Resolved outcome of one drag gesture
///
/// `destination: None` means the gesture cancelled - the caller must leave
/// the tree untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragResult {
    pub dragged_id: String,
    pub source: DropTarget,
    pub destination: Option<DropTarget>,
}

#[derive(Debug)]
enum DragState {
    Idle,
    Active(ActiveDrag),
}

#[derive(Debug)]
struct ActiveDrag {
    dragged_id: String,
    source: DropTarget,
    /// Last hover decision; last write wins
    over: Option<DropTarget>,
}

/// Pointer/touch drag state machine over an injected spatial index
pub struct DragCoordinator<S: SpatialIndex> {
    spatial: S,
    state: DragState,
    /// Set when a drop already emitted this gesture's result; cleared on
    /// the next start. Guards against a native drag-end firing after drop.
    committed: bool,
}

impl<S: SpatialIndex> DragCoordinator<S> {
    pub fn new(spatial: S) -> Self {
        Self {
            spatial,
            state: DragState::Idle,
            committed: false,
        }
    }

    pub fn spatial(&self) -> &S {
        &self.spatial
    }

    pub fn spatial_mut(&mut self) -> &mut S {
        &mut self.spatial
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Active(_))
    }

    /// Current hover decision, for driving the insertion indicator
    pub fn over_state(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Active(drag) => drag.over.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Begin a drag gesture for `dragged_id` at `point`.
    ///
    /// Captures the nearest drop container under the pointer as the source.
    /// Returns false (and changes nothing) when a drag is already active,
    /// no container encloses the point, or the enclosing container does not
    /// actually hold the dragged block (an overlapping sibling container
    /// can win the hit test near an edge).
    pub fn start(&mut self, dragged_id: &str, point: Point) -> bool {
        if self.is_dragging() {
            debug!(dragged_id, "drag start ignored: gesture already active");
            return false;
        }

        let Some(container_id) = self.spatial.container_at(point) else {
            debug!(dragged_id, "drag start ignored: no container under pointer");
            return false;
        };

        let Some(index) = self.spatial.index_of(&container_id, dragged_id) else {
            debug!(
                dragged_id,
                %container_id,
                "drag start ignored: container under pointer does not hold the block"
            );
            return false;
        };

        self.committed = false;
        self.state = DragState::Active(ActiveDrag {
            dragged_id: dragged_id.to_string(),
            source: DropTarget {
                container_id,
                index,
            },
            over: None,
        });

        true
    }

    /// Process a pointer move, updating the cached hover state.
    ///
    /// Returns the new hover decision so the host can position the
    /// insertion indicator. Containers inside the dragged block are
    /// skipped; the previous hover state is kept in that case.
    pub fn hover(&mut self, point: Point) -> Option<DropTarget> {
        let dragged_id = match &self.state {
            DragState::Active(drag) => drag.dragged_id.clone(),
            DragState::Idle => return None,
        };

        let target = self.target_under(point, &dragged_id);

        if let DragState::Active(drag) = &mut self.state {
            if let Some(target) = target {
                drag.over = Some(target);
            }
            drag.over.clone()
        } else {
            None
        }
    }

    /// Resolve a drop at `point`.
    ///
    /// `native` carries a destination supplied directly by the platform's
    /// own drop event, which outranks everything else. Emits exactly one
    /// result and marks the gesture committed.
    pub fn drop(&mut self, point: Point, native: Option<DropTarget>) -> Option<DragResult> {
        let drag = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Active(drag) => drag,
            DragState::Idle => return None,
        };

        let destination = native
            .filter(|t| !self.spatial.is_inside(&t.container_id, &drag.dragged_id))
            .or(drag.over)
            .or_else(|| {
                debug!(
                    dragged_id = %drag.dragged_id,
                    "no hover state at drop; recomputing under release point"
                );
                self.target_under(point, &drag.dragged_id)
            });

        if destination.is_none() {
            debug!(dragged_id = %drag.dragged_id, "drop resolved to cancellation");
        }

        self.committed = true;

        Some(DragResult {
            dragged_id: drag.dragged_id,
            source: drag.source,
            destination,
        })
    }

    /// Handle the gesture-end event.
    ///
    /// When a drop handler already committed this gesture, the trailing end
    /// event is suppressed. Otherwise the end acts as the drop: resolve
    /// from the cached hover state, or from `point` when provided, or
    /// cancel.
    pub fn end(&mut self, point: Option<Point>) -> Option<DragResult> {
        if self.committed {
            debug!("drag end suppressed: result already committed");
            self.state = DragState::Idle;
            return None;
        }

        let drag = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Active(drag) => drag,
            DragState::Idle => return None,
        };

        let destination = drag
            .over
            .or_else(|| point.and_then(|p| self.target_under(p, &drag.dragged_id)));

        self.committed = true;

        Some(DragResult {
            dragged_id: drag.dragged_id,
            source: drag.source,
            destination,
        })
    }

    /// Abandon the active gesture without emitting a result
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("drag cancelled");
        }
        self.state = DragState::Idle;
    }

    /// Hit-test `point` and compute the insertion index for the container
    /// found there. Containers inside the dragged block are rejected.
    fn target_under(&self, point: Point, dragged_id: &str) -> Option<DropTarget> {
        let container_id = self.spatial.container_at(point)?;

        if self.spatial.is_inside(&container_id, dragged_id) {
            debug!(
                %container_id,
                dragged_id, "container skipped: inside dragged block"
            );
            return None;
        }

        let rects = self.spatial.child_rects(&container_id)?;
        let orientation = self.spatial.orientation(&container_id);
        let index = insertion_index(point, &rects, orientation);

        Some(DropTarget {
            container_id,
            index,
        })
    }
}
