//! # Block tree operations
//!
//! Structural operations over the block tree (an ordered `Vec<Block>` of
//! roots).
//!
//! ## Semantics
//!
//! 1. **No-op over error**: an unresolvable parent, an out-of-bounds source
//!    index, or a rejected self-containment all leave the tree untouched and
//!    report [`Applied::Unchanged`] (or `false` / `None`). Callers get a
//!    cheap "nothing changed" signal without comparing trees.
//! 2. **Atomic**: an operation either completes or leaves no trace; no
//!    partial state is observable between call and return.
//! 3. **Invariant-preserving**: every mutation keeps ids unique, keeps
//!    `parent_id` pointing at the actual owning container, and keeps the
//!    ownership graph acyclic.

use std::collections::HashMap;

use mosaic_model::{Block, BlockRegistry, IdGenerator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

/// Whether a mutation changed the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    Unchanged,
}

impl Applied {
    pub fn changed(self) -> bool {
        self == Applied::Changed
    }

    pub fn from_bool(changed: bool) -> Self {
        if changed {
            Applied::Changed
        } else {
            Applied::Unchanged
        }
    }
}

/// Partial update for a block's type and payload fields.
///
/// Nested JSON objects merge key-by-key; arrays and primitives replace
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

/// Depth-first search for a block by id
pub fn find<'a>(tree: &'a [Block], id: &str) -> Option<&'a Block> {
    for block in tree {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find(&block.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut<'a>(tree: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    for block in tree {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_mut(&mut block.children, id) {
            return Some(found);
        }
    }
    None
}

/// Path from root to the target as one sibling index per depth level
pub fn find_path(tree: &[Block], id: &str) -> Option<Vec<usize>> {
    for (index, block) in tree.iter().enumerate() {
        if block.id == id {
            return Some(vec![index]);
        }
        if let Some(mut rest) = find_path(&block.children, id) {
            let mut path = Vec::with_capacity(rest.len() + 1);
            path.push(index);
            path.append(&mut rest);
            return Some(path);
        }
    }
    None
}

/// True when `id` names the block itself or any of its descendants
pub fn subtree_contains(block: &Block, id: &str) -> bool {
    block.id == id || block.children.iter().any(|child| subtree_contains(child, id))
}

/// Recursively restamp `parent_id` back-references to match actual nesting
pub fn set_parent_ids(blocks: &mut [Block], parent_id: Option<&str>) {
    for block in blocks {
        block.parent_id = parent_id.map(String::from);
        let id = block.id.clone();
        set_parent_ids(&mut block.children, Some(&id));
    }
}

/// The mutable child list of `parent`; the root list when `parent` is None.
///
/// Returns `None` for an unknown parent id or a non-container parent.
fn container_children_mut<'a>(
    tree: &'a mut Vec<Block>,
    parent: Option<&str>,
) -> Option<&'a mut Vec<Block>> {
    match parent {
        None => Some(tree),
        Some(id) => {
            let block = find_mut(tree, id)?;
            block.is_container().then_some(&mut block.children)
        }
    }
}

fn container_len(tree: &[Block], parent: Option<&str>) -> Option<usize> {
    match parent {
        None => Some(tree.len()),
        Some(id) => {
            let block = find(tree, id)?;
            block.is_container().then_some(block.children.len())
        }
    }
}

/// Splice `block` into the parent's children (or the root list) at `index`,
/// stamping its back-reference. Overflowing indices append.
///
/// Returns false (tree untouched) when the parent cannot be resolved.
pub fn insert_block(
    tree: &mut Vec<Block>,
    parent_id: Option<&str>,
    index: usize,
    mut block: Block,
) -> bool {
    let Some(children) = container_children_mut(tree, parent_id) else {
        debug!(parent_id, "insert skipped: parent not found");
        return false;
    };

    block.parent_id = parent_id.map(String::from);
    let index = index.min(children.len());
    children.insert(index, block);
    true
}

/// Create a registry default for `block_type` and splice it in.
///
/// Returns the new block's id, or `None` when the parent cannot be resolved
/// (recoverable) or the registry has no such type (a defect, logged).
pub fn insert(
    tree: &mut Vec<Block>,
    parent_id: Option<&str>,
    index: usize,
    block_type: &str,
    registry: &dyn BlockRegistry,
    ids: &mut IdGenerator,
) -> Option<String> {
    if let Some(parent) = parent_id {
        if container_len(tree, Some(parent)).is_none() {
            debug!(parent, block_type, "insert skipped: parent not found");
            return None;
        }
    }

    let id = ids.new_id();
    let Some(block) = registry.default_block(block_type, &id) else {
        error!(block_type, "registry returned no default block");
        return None;
    };

    insert_block(tree, parent_id, index, block).then_some(id)
}

/// Relocate one block between (or within) containers.
///
/// `dest_index` is signed so out-of-range destinations clamp instead of
/// failing: negative clamps to the front, overflow appends.
pub fn move_block(
    tree: &mut Vec<Block>,
    source_parent: Option<&str>,
    source_index: usize,
    dest_parent: Option<&str>,
    dest_index: isize,
) -> Applied {
    let same_parent = source_parent == dest_parent;

    // Dropping on the block's own slot, or directly after it, changes nothing
    if same_parent
        && (dest_index == source_index as isize || dest_index == source_index as isize + 1)
    {
        return Applied::Unchanged;
    }

    {
        let Some(source_len) = container_len(tree, source_parent) else {
            debug!(source_parent, "move skipped: source parent not found");
            return Applied::Unchanged;
        };
        if source_index >= source_len {
            debug!(source_index, source_len, "move skipped: source index out of bounds");
            return Applied::Unchanged;
        }
    }

    // Self-containment guard: a block never moves into its own subtree
    if let Some(dest_id) = dest_parent {
        let moved = match source_parent {
            None => &tree[source_index],
            Some(src_id) => match find(tree, src_id) {
                Some(parent) => &parent.children[source_index],
                None => return Applied::Unchanged,
            },
        };
        if subtree_contains(moved, dest_id) {
            debug!(dest_id, "move rejected: destination inside moved subtree");
            return Applied::Unchanged;
        }

        // Destination must resolve to a container before anything is removed
        match find(tree, dest_id) {
            Some(block) if block.is_container() => {}
            _ => {
                debug!(dest_id, "move skipped: destination parent not found");
                return Applied::Unchanged;
            }
        }
    }

    let mut moved = match container_children_mut(tree, source_parent) {
        Some(children) => children.remove(source_index),
        None => return Applied::Unchanged,
    };

    // Removal shifted indices within the same container
    let mut adjusted = dest_index;
    if same_parent && dest_index > source_index as isize {
        adjusted -= 1;
    }

    // Destination is re-resolved after removal; the guard above ensures it
    // was not part of the removed subtree
    match container_children_mut(tree, dest_parent) {
        Some(children) => {
            let index = adjusted.clamp(0, children.len() as isize) as usize;
            if !same_parent {
                moved.parent_id = dest_parent.map(String::from);
            }
            children.insert(index, moved);
            Applied::Changed
        }
        None => {
            // Destination vanished between checks; put the block back
            if let Some(children) = container_children_mut(tree, source_parent) {
                let index = source_index.min(children.len());
                children.insert(index, moved);
            }
            Applied::Unchanged
        }
    }
}

/// Remove a block and its entire subtree.
///
/// When the owning container is a column container, the removed id is also
/// stripped from its slot partition.
pub fn delete(tree: &mut Vec<Block>, id: &str) -> bool {
    if let Some(position) = tree.iter().position(|block| block.id == id) {
        tree.remove(position);
        return true;
    }

    for block in tree.iter_mut() {
        if delete_in(block, id) {
            return true;
        }
    }

    false
}

fn delete_in(block: &mut Block, id: &str) -> bool {
    if let Some(position) = block.children.iter().position(|child| child.id == id) {
        block.children.remove(position);
        if let Some(layout) = &mut block.column_layout {
            for slot in layout {
                slot.block_ids.retain(|block_id| block_id != id);
            }
        }
        return true;
    }

    for child in &mut block.children {
        if delete_in(child, id) {
            return true;
        }
    }

    false
}

/// Deep-clone a subtree and splice the clone directly after the original.
///
/// Every id in the clone is regenerated - root and all descendants - and
/// any `columnLayout` inside the clone is remapped to the new ids. When the
/// original sits in a column slot, the clone joins the same slot right
/// after it.
pub fn duplicate_block_deep(
    tree: &mut Vec<Block>,
    id: &str,
    ids: &mut IdGenerator,
) -> Option<String> {
    duplicate_in(tree, id, ids)
}

fn duplicate_in(list: &mut Vec<Block>, id: &str, ids: &mut IdGenerator) -> Option<String> {
    if let Some(position) = list.iter().position(|block| block.id == id) {
        let mut clone = list[position].clone();
        let mut id_map = HashMap::new();
        regenerate_ids(&mut clone, ids, &mut id_map);
        remap_column_layouts(&mut clone, &id_map);

        let new_id = clone.id.clone();
        list.insert(position + 1, clone);
        return Some(new_id);
    }

    for block in list.iter_mut() {
        let original_is_direct_child = block.children.iter().any(|child| child.id == id);

        if let Some(new_id) = duplicate_in(&mut block.children, id, ids) {
            if original_is_direct_child {
                if let Some(layout) = &mut block.column_layout {
                    for slot in layout {
                        if let Some(i) = slot.block_ids.iter().position(|b| b == id) {
                            slot.block_ids.insert(i + 1, new_id.clone());
                            break;
                        }
                    }
                }
            }
            return Some(new_id);
        }
    }

    None
}

fn regenerate_ids(block: &mut Block, ids: &mut IdGenerator, id_map: &mut HashMap<String, String>) {
    let new_id = ids.new_id();
    id_map.insert(block.id.clone(), new_id.clone());
    block.id = new_id;

    for child in &mut block.children {
        child.parent_id = Some(block.id.clone());
        regenerate_ids(child, ids, id_map);
    }
}

fn remap_column_layouts(block: &mut Block, id_map: &HashMap<String, String>) {
    if let Some(layout) = &mut block.column_layout {
        for slot in layout {
            for block_id in &mut slot.block_ids {
                if let Some(new_id) = id_map.get(block_id) {
                    *block_id = new_id.clone();
                }
            }
        }
    }

    for child in &mut block.children {
        remap_column_layouts(child, id_map);
    }
}

/// Deep-merge a patch into the matching block
pub fn update_block_deep(tree: &mut Vec<Block>, id: &str, patch: &BlockPatch) -> bool {
    let Some(block) = find_mut(tree, id) else {
        debug!(id, "update skipped: block not found");
        return false;
    };

    if let Some(block_type) = &patch.block_type {
        block.block_type = block_type.clone();
    }
    if let Some(content) = &patch.content {
        merge_value(&mut block.content, content);
    }
    if let Some(styles) = &patch.styles {
        merge_value(&mut block.styles, styles);
    }
    if let Some(settings) = &patch.settings {
        merge_value(&mut block.settings, settings);
    }

    true
}

/// Recursive object merge; arrays and primitives replace wholesale
fn merge_value(dest: &mut Value, src: &Value) {
    match (dest, src) {
        (Value::Object(dest_map), Value::Object(src_map)) => {
            for (key, src_value) in src_map {
                match dest_map.get_mut(key) {
                    Some(dest_value) => merge_value(dest_value, src_value),
                    None => {
                        dest_map.insert(key.clone(), src_value.clone());
                    }
                }
            }
        }
        (dest, src) => *dest = src.clone(),
    }
}
