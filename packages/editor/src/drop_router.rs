//! # Drop routing
//!
//! Turns a resolved [`DragResult`] into the matching tree or column
//! operation. Drop container ids come in three shapes:
//!
//! - the canvas id (the root list)
//! - a plain container's block id
//! - a composite slot id, `"<containerId>:column:<index>"`
//!
//! The router parses both endpoints and dispatches; a cancelled result
//! (no destination) leaves the tree untouched.

use mosaic_drag::DragResult;
use mosaic_model::Block;
use tracing::debug;

use crate::columns::{
    self, assign_to_slot, move_between_slots, move_canvas_to_slot, move_slot_to_canvas,
    parse_composite_slot_id, SlotAddress,
};
use crate::tree::{self, Applied};

/// One endpoint of a drop, after id parsing
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    /// The root block list
    Canvas,
    /// A plain container's children
    Container(String),
    /// One slot of a column container
    Slot(SlotAddress),
}

fn endpoint(container_id: &str, canvas_id: &str) -> Endpoint {
    if container_id == canvas_id {
        return Endpoint::Canvas;
    }
    match parse_composite_slot_id(container_id) {
        Some(address) => Endpoint::Slot(address),
        None => Endpoint::Container(container_id.to_string()),
    }
}

/// Apply a drag gesture's outcome to the tree.
///
/// `canvas_id` is the container id the host assigns to the root canvas.
pub fn apply_drop(tree: &mut Vec<Block>, result: &DragResult, canvas_id: &str) -> Applied {
    let Some(destination) = &result.destination else {
        debug!(dragged_id = %result.dragged_id, "drop cancelled; tree unchanged");
        return Applied::Unchanged;
    };

    let source = endpoint(&result.source.container_id, canvas_id);
    let dest = endpoint(&destination.container_id, canvas_id);
    let source_index = result.source.index;
    let dest_index = destination.index as isize;

    // The source position must still hold the dragged block; a stale or
    // fabricated result must not relocate whatever sits there now
    if !source_holds(tree, &source, source_index, &result.dragged_id) {
        debug!(
            dragged_id = %result.dragged_id,
            source_index,
            "drop ignored: source position does not hold the dragged block"
        );
        return Applied::Unchanged;
    }

    match (source, dest) {
        // Plain container / canvas moves go straight to the tree
        (Endpoint::Canvas, Endpoint::Canvas) => {
            tree::move_block(tree, None, source_index, None, dest_index)
        }
        (Endpoint::Canvas, Endpoint::Container(dest_id)) => {
            tree::move_block(tree, None, source_index, Some(&dest_id), dest_index)
        }
        (Endpoint::Container(source_id), Endpoint::Canvas) => {
            tree::move_block(tree, Some(&source_id), source_index, None, dest_index)
        }
        (Endpoint::Container(source_id), Endpoint::Container(dest_id)) => {
            tree::move_block(tree, Some(&source_id), source_index, Some(&dest_id), dest_index)
        }

        // Into a slot
        (Endpoint::Canvas, Endpoint::Slot(slot)) => move_canvas_to_slot(
            tree,
            None,
            source_index,
            &slot.container_id,
            slot.column_index,
            dest_index,
        ),
        (Endpoint::Container(source_id), Endpoint::Slot(slot)) => move_canvas_to_slot(
            tree,
            Some(&source_id),
            source_index,
            &slot.container_id,
            slot.column_index,
            dest_index,
        ),

        // Out of a slot
        (Endpoint::Slot(slot), Endpoint::Canvas) => move_slot_to_canvas(
            tree,
            &slot.container_id,
            slot.column_index,
            source_index,
            None,
            dest_index,
        ),
        (Endpoint::Slot(slot), Endpoint::Container(dest_id)) => move_slot_to_canvas(
            tree,
            &slot.container_id,
            slot.column_index,
            source_index,
            Some(&dest_id),
            dest_index,
        ),

        (Endpoint::Slot(source_slot), Endpoint::Slot(dest_slot)) => {
            if source_slot.container_id == dest_slot.container_id {
                let Some(container) = tree::find_mut(tree, &source_slot.container_id) else {
                    return Applied::Unchanged;
                };
                move_between_slots(
                    container,
                    source_slot.column_index,
                    dest_slot.column_index,
                    source_index,
                    dest_index,
                )
            } else {
                move_between_column_containers(tree, &source_slot, source_index, &dest_slot, dest_index)
            }
        }
    }
}

/// True when the block at the source endpoint and index is `dragged_id`
fn source_holds(tree: &[Block], source: &Endpoint, index: usize, dragged_id: &str) -> bool {
    match source {
        Endpoint::Canvas => tree.get(index).map_or(false, |block| block.id == dragged_id),
        Endpoint::Container(id) => tree::find(tree, id)
            .and_then(|container| container.children.get(index))
            .map_or(false, |block| block.id == dragged_id),
        Endpoint::Slot(slot) => tree::find(tree, &slot.container_id)
            .and_then(|container| container.column_layout.as_ref())
            .and_then(|layout| layout.get(slot.column_index))
            .and_then(|slot| slot.block_ids.get(index))
            .map_or(false, |id| id == dragged_id),
    }
}

/// Slot-to-slot move across two different column containers: lift the block
/// out of the source slot into the destination container, then assign it to
/// the destination slot.
fn move_between_column_containers(
    tree: &mut Vec<Block>,
    source_slot: &SlotAddress,
    source_index: usize,
    dest_slot: &SlotAddress,
    dest_index: isize,
) -> Applied {
    let moved_id = match tree::find(tree, &source_slot.container_id) {
        Some(container) => container
            .column_layout
            .as_ref()
            .and_then(|layout| layout.get(source_slot.column_index))
            .and_then(|slot| slot.block_ids.get(source_index))
            .cloned(),
        None => None,
    };
    let Some(moved_id) = moved_id else {
        return Applied::Unchanged;
    };

    let lifted = move_slot_to_canvas(
        tree,
        &source_slot.container_id,
        source_slot.column_index,
        source_index,
        Some(&dest_slot.container_id),
        isize::MAX,
    );
    if !lifted.changed() {
        return Applied::Unchanged;
    }

    let Some(dest) = tree::find_mut(tree, &dest_slot.container_id) else {
        return Applied::Unchanged;
    };
    assign_to_slot(dest, dest_slot.column_index, &moved_id, dest_index);

    Applied::Changed
}

/// Composite slot id helper re-exported for hosts tagging drop containers
pub fn slot_container_id(container_id: &str, column_index: usize) -> String {
    columns::composite_slot_id(container_id, column_index)
}
