//! # Column layout adapter
//!
//! A column container owns its children in one flat list; `columnLayout`
//! partitions their ids into named, width-tagged visual slots. Slots are a
//! presentation-level view: `parent_id` always points at the owning
//! container, never at a slot, and slot order lives entirely in each slot's
//! `block_ids` (the flat `children` order is ownership order only).
//!
//! Slots are addressed as drop targets by a composite id,
//! `"<containerId>:column:<index>"`.

use mosaic_model::Block;
use tracing::debug;

use crate::tree::{self, Applied};

/// Parsed composite slot id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAddress {
    pub container_id: String,
    pub column_index: usize,
}

/// Parse `"<containerId>:column:<index>"`.
///
/// Anything malformed is `None` - callers treat that as "not a column drop
/// target", never as an error.
pub fn parse_composite_slot_id(id: &str) -> Option<SlotAddress> {
    let (container_id, index) = id.rsplit_once(":column:")?;
    if container_id.is_empty() {
        return None;
    }

    Some(SlotAddress {
        container_id: container_id.to_string(),
        column_index: index.parse().ok()?,
    })
}

/// Build the composite drop-target id for one slot
pub fn composite_slot_id(container_id: &str, column_index: usize) -> String {
    format!("{}:column:{}", container_id, column_index)
}

/// Reorder one block inside a single slot
pub fn reorder_within_slot(
    container: &mut Block,
    column_index: usize,
    source_index: usize,
    dest_index: isize,
) -> Applied {
    let Some(layout) = &mut container.column_layout else {
        return Applied::Unchanged;
    };
    let Some(slot) = layout.get_mut(column_index) else {
        debug!(column_index, "reorder skipped: no such column");
        return Applied::Unchanged;
    };

    splice_ids(&mut slot.block_ids, source_index, dest_index)
}

/// Move one block's id between two slots of the same container.
///
/// The block itself stays in `children`; its `parent_id` is untouched.
pub fn move_between_slots(
    container: &mut Block,
    source_column: usize,
    dest_column: usize,
    source_index: usize,
    dest_index: isize,
) -> Applied {
    if source_column == dest_column {
        return reorder_within_slot(container, source_column, source_index, dest_index);
    }

    let Some(layout) = &mut container.column_layout else {
        return Applied::Unchanged;
    };
    if source_column >= layout.len() || dest_column >= layout.len() {
        debug!(source_column, dest_column, "slot move skipped: column out of range");
        return Applied::Unchanged;
    }
    if source_index >= layout[source_column].block_ids.len() {
        return Applied::Unchanged;
    }

    let id = layout[source_column].block_ids.remove(source_index);
    let dest = &mut layout[dest_column].block_ids;
    let index = dest_index.clamp(0, dest.len() as isize) as usize;
    dest.insert(index, id);

    Applied::Changed
}

/// Move a block from the canvas (or any plain container) into a column slot.
///
/// The block becomes a child of the column container; its id joins the
/// slot's partition at the clamped index.
pub fn move_canvas_to_slot(
    tree: &mut Vec<Block>,
    source_parent: Option<&str>,
    source_index: usize,
    container_id: &str,
    column_index: usize,
    dest_index: isize,
) -> Applied {
    // Validate both endpoints before touching anything
    {
        let source = match source_parent {
            None => Some(&tree[..]),
            Some(id) => tree::find(tree, id).map(|b| &b.children[..]),
        };
        let Some(source) = source else {
            debug!(source_parent, "slot move skipped: source parent not found");
            return Applied::Unchanged;
        };
        let Some(moved) = source.get(source_index) else {
            return Applied::Unchanged;
        };
        if tree::subtree_contains(moved, container_id) {
            debug!(container_id, "slot move rejected: container inside moved subtree");
            return Applied::Unchanged;
        }

        match tree::find(tree, container_id) {
            Some(container) => {
                let columns = container
                    .column_layout
                    .as_ref()
                    .map(|layout| layout.len())
                    .unwrap_or(0);
                if column_index >= columns {
                    debug!(container_id, column_index, "slot move skipped: no such column");
                    return Applied::Unchanged;
                }
            }
            None => {
                debug!(container_id, "slot move skipped: container not found");
                return Applied::Unchanged;
            }
        }
    }

    let mut moved = match source_parent {
        None => tree.remove(source_index),
        Some(id) => match tree::find_mut(tree, id) {
            Some(parent) => parent.children.remove(source_index),
            None => return Applied::Unchanged,
        },
    };

    moved.parent_id = Some(container_id.to_string());
    let moved_id = moved.id.clone();

    // Checked above; the moved block cannot have owned the container
    let Some(container) = tree::find_mut(tree, container_id) else {
        return Applied::Unchanged;
    };
    container.children.push(moved);
    if let Some(layout) = &mut container.column_layout {
        if let Some(slot) = layout.get_mut(column_index) {
            let index = dest_index.clamp(0, slot.block_ids.len() as isize) as usize;
            slot.block_ids.insert(index, moved_id);
        }
    }

    Applied::Changed
}

/// Move a block out of a column slot onto the canvas or into another
/// container. The slot partition loses the id; the block is restamped to
/// the destination parent.
pub fn move_slot_to_canvas(
    tree: &mut Vec<Block>,
    container_id: &str,
    column_index: usize,
    source_index: usize,
    dest_parent: Option<&str>,
    dest_index: isize,
) -> Applied {
    // Resolve the moved id and validate the destination first
    let moved_id = {
        let Some(container) = tree::find(tree, container_id) else {
            debug!(container_id, "slot move skipped: container not found");
            return Applied::Unchanged;
        };
        let Some(id) = container
            .column_layout
            .as_ref()
            .and_then(|layout| layout.get(column_index))
            .and_then(|slot| slot.block_ids.get(source_index))
            .cloned()
        else {
            debug!(container_id, column_index, source_index, "slot move skipped: no block at slot index");
            return Applied::Unchanged;
        };

        if let Some(dest_id) = dest_parent {
            let Some(moved) = container.children.iter().find(|c| c.id == id) else {
                return Applied::Unchanged;
            };
            if tree::subtree_contains(moved, dest_id) {
                debug!(dest_id, "slot move rejected: destination inside moved subtree");
                return Applied::Unchanged;
            }
            match tree::find(tree, dest_id) {
                Some(block) if block.is_container() => {}
                _ => {
                    debug!(dest_id, "slot move skipped: destination parent not found");
                    return Applied::Unchanged;
                }
            }
        }

        id
    };

    // Detach: drop the id from the slot, then lift the block out
    let mut moved = {
        let Some(container) = tree::find_mut(tree, container_id) else {
            return Applied::Unchanged;
        };
        if let Some(layout) = &mut container.column_layout {
            for slot in layout.iter_mut() {
                slot.block_ids.retain(|id| id != &moved_id);
            }
        }
        let Some(position) = container.children.iter().position(|c| c.id == moved_id) else {
            return Applied::Unchanged;
        };
        container.children.remove(position)
    };

    moved.parent_id = dest_parent.map(String::from);

    match dest_parent {
        None => {
            let index = dest_index.clamp(0, tree.len() as isize) as usize;
            tree.insert(index, moved);
        }
        Some(dest_id) => {
            let Some(dest) = tree::find_mut(tree, dest_id) else {
                return Applied::Unchanged;
            };
            let index = dest_index.clamp(0, dest.children.len() as isize) as usize;
            dest.children.insert(index, moved);
        }
    }

    Applied::Changed
}

/// Put `block_id` into the given slot at `dest_index`, removing it from any
/// slot it currently occupies. The block must already be a child of the
/// container.
pub fn assign_to_slot(
    container: &mut Block,
    column_index: usize,
    block_id: &str,
    dest_index: isize,
) -> Applied {
    if !container.children.iter().any(|c| c.id == block_id) {
        return Applied::Unchanged;
    }
    let Some(layout) = &mut container.column_layout else {
        return Applied::Unchanged;
    };
    if column_index >= layout.len() {
        return Applied::Unchanged;
    }

    for slot in layout.iter_mut() {
        slot.block_ids.retain(|id| id != block_id);
    }

    let slot = &mut layout[column_index].block_ids;
    let index = dest_index.clamp(0, slot.len() as isize) as usize;
    slot.insert(index, block_id.to_string());

    Applied::Changed
}

/// Reconcile a container's slot partition with its actual children:
/// stale ids are dropped, orphaned children join the first slot.
pub fn repair_column_layout(container: &mut Block) -> Applied {
    let child_ids: Vec<String> = container.children.iter().map(|c| c.id.clone()).collect();
    let Some(layout) = &mut container.column_layout else {
        return Applied::Unchanged;
    };
    if layout.is_empty() {
        return Applied::Unchanged;
    }

    let mut changed = false;

    for slot in layout.iter_mut() {
        let before = slot.block_ids.len();
        slot.block_ids.retain(|id| child_ids.contains(id));
        changed |= slot.block_ids.len() != before;
    }

    for id in &child_ids {
        let assigned = layout.iter().any(|slot| slot.block_ids.contains(id));
        if !assigned {
            layout[0].block_ids.push(id.clone());
            changed = true;
        }
    }

    Applied::from_bool(changed)
}

/// Shared splice used for in-slot reorders: same no-op fast paths, removal
/// shift compensation, and index clamping as block-level moves.
fn splice_ids(ids: &mut Vec<String>, source_index: usize, dest_index: isize) -> Applied {
    if dest_index == source_index as isize || dest_index == source_index as isize + 1 {
        return Applied::Unchanged;
    }
    if source_index >= ids.len() {
        return Applied::Unchanged;
    }

    let id = ids.remove(source_index);

    let mut adjusted = dest_index;
    if dest_index > source_index as isize {
        adjusted -= 1;
    }
    let index = adjusted.clamp(0, ids.len() as isize) as usize;
    ids.insert(index, id);

    Applied::Changed
}
