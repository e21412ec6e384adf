//! # Block mutations
//!
//! Intent-preserving, serializable operations over the block tree.
//!
//! ## Semantics
//!
//! - `apply` is no-op tolerant: unresolvable ids and rejected moves report
//!   `Applied::Unchanged` instead of failing, mirroring the tree layer
//! - `validate` explains *why* a mutation would not apply, for hosts that
//!   want to surface it; apply never depends on a prior validate
//! - Errors are reserved for genuine defects - a registry with no default
//!   for a type it was asked to build
//! - `Move` fails closed rather than creating orphans or cycles
//! - `Delete` cascades to the whole subtree; concurrent edits of deleted
//!   blocks become no-ops

use mosaic_model::{Block, BlockRegistry, IdGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::columns::repair_column_layout;
use crate::tree::{self, Applied, BlockPatch};

/// Semantic mutation over the block tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a registry default at the given position.
    ///
    /// The id is generated when the mutation is built (see
    /// [`Mutation::insert`]) so the operation is replayable and its inverse
    /// is known up front.
    InsertBlock {
        parent_id: Option<String>,
        index: usize,
        block_type: String,
        block_id: String,
    },

    /// Relocate a block between (or within) containers
    MoveBlock {
        source_parent: Option<String>,
        source_index: usize,
        dest_parent: Option<String>,
        dest_index: isize,
    },

    /// Remove a block and its entire subtree
    DeleteBlock { id: String },

    /// Deep-clone a block directly after itself, regenerating every id
    DuplicateBlock { id: String },

    /// Deep-merge a partial update into a block
    UpdateBlock { id: String, patch: BlockPatch },

    /// Replace payload fields wholesale (inverse of `UpdateBlock`)
    SetPayload { id: String, fields: BlockPatch },

    /// Re-attach a previously removed subtree (inverse of `DeleteBlock`)
    RestoreBlock {
        parent_id: Option<String>,
        index: usize,
        block: Block,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Not a container: {0}")]
    NotAContainer(String),

    #[error("Move would place a block inside its own subtree")]
    WouldCreateCycle,

    #[error("Source index {index} out of bounds for container {container:?}")]
    IndexOutOfBounds {
        container: Option<String>,
        index: usize,
    },

    #[error("Registry has no default block for type: {0}")]
    UnknownBlockType(String),
}

/// What applying a mutation did
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub applied: Applied,

    /// Id of a block the mutation created (insert, duplicate)
    pub created_id: Option<String>,
}

impl MutationOutcome {
    fn unchanged() -> Self {
        Self {
            applied: Applied::Unchanged,
            created_id: None,
        }
    }

    fn changed() -> Self {
        Self {
            applied: Applied::Changed,
            created_id: None,
        }
    }
}

impl Mutation {
    /// Build an insert mutation, generating the new block's id
    pub fn insert(
        parent_id: Option<String>,
        index: usize,
        block_type: impl Into<String>,
        ids: &mut IdGenerator,
    ) -> Self {
        Mutation::InsertBlock {
            parent_id,
            index,
            block_type: block_type.into(),
            block_id: ids.new_id(),
        }
    }

    /// Apply the mutation to the tree
    pub fn apply(
        &self,
        tree: &mut Vec<Block>,
        registry: &dyn BlockRegistry,
        ids: &mut IdGenerator,
    ) -> Result<MutationOutcome, MutationError> {
        match self {
            Mutation::InsertBlock {
                parent_id,
                index,
                block_type,
                block_id,
            } => {
                if let Some(parent) = parent_id {
                    if tree::find(tree, parent).is_none() {
                        return Ok(MutationOutcome::unchanged());
                    }
                }

                let Some(block) = registry.default_block(block_type, block_id) else {
                    error!(%block_type, "registry returned no default block");
                    return Err(MutationError::UnknownBlockType(block_type.clone()));
                };

                if tree::insert_block(tree, parent_id.as_deref(), *index, block) {
                    Ok(MutationOutcome {
                        applied: Applied::Changed,
                        created_id: Some(block_id.clone()),
                    })
                } else {
                    Ok(MutationOutcome::unchanged())
                }
            }

            Mutation::MoveBlock {
                source_parent,
                source_index,
                dest_parent,
                dest_index,
            } => {
                let applied = tree::move_block(
                    tree,
                    source_parent.as_deref(),
                    *source_index,
                    dest_parent.as_deref(),
                    *dest_index,
                );
                Ok(MutationOutcome {
                    applied,
                    created_id: None,
                })
            }

            Mutation::DeleteBlock { id } => {
                if tree::delete(tree, id) {
                    Ok(MutationOutcome::changed())
                } else {
                    Ok(MutationOutcome::unchanged())
                }
            }

            Mutation::DuplicateBlock { id } => {
                match tree::duplicate_block_deep(tree, id, ids) {
                    Some(new_id) => Ok(MutationOutcome {
                        applied: Applied::Changed,
                        created_id: Some(new_id),
                    }),
                    None => Ok(MutationOutcome::unchanged()),
                }
            }

            Mutation::UpdateBlock { id, patch } => {
                if tree::update_block_deep(tree, id, patch) {
                    Ok(MutationOutcome::changed())
                } else {
                    Ok(MutationOutcome::unchanged())
                }
            }

            Mutation::SetPayload { id, fields } => {
                let Some(block) = tree::find_mut(tree, id) else {
                    return Ok(MutationOutcome::unchanged());
                };
                let mut changed = false;
                if let Some(block_type) = &fields.block_type {
                    if block.block_type != *block_type {
                        block.block_type = block_type.clone();
                        changed = true;
                    }
                }
                if let Some(content) = &fields.content {
                    if block.content != *content {
                        block.content = content.clone();
                        changed = true;
                    }
                }
                if let Some(styles) = &fields.styles {
                    if block.styles != *styles {
                        block.styles = styles.clone();
                        changed = true;
                    }
                }
                if let Some(settings) = &fields.settings {
                    if block.settings != *settings {
                        block.settings = settings.clone();
                        changed = true;
                    }
                }
                if changed {
                    Ok(MutationOutcome::changed())
                } else {
                    Ok(MutationOutcome::unchanged())
                }
            }

            Mutation::RestoreBlock {
                parent_id,
                index,
                block,
            } => {
                if !tree::insert_block(tree, parent_id.as_deref(), *index, block.clone()) {
                    return Ok(MutationOutcome::unchanged());
                }
                // A restore into a column container re-enters the slot
                // partition through repair (first slot)
                if let Some(parent) = parent_id {
                    if let Some(container) = tree::find_mut(tree, parent) {
                        if container.is_column_container() {
                            repair_column_layout(container);
                        }
                    }
                }
                Ok(MutationOutcome::changed())
            }
        }
    }

    /// Explain why the mutation would not change the tree.
    ///
    /// `Ok(())` means it would apply cleanly. Apply itself never requires a
    /// prior validate; this exists for hosts that surface reasons.
    pub fn validate(&self, tree: &[Block]) -> Result<(), MutationError> {
        match self {
            Mutation::InsertBlock { parent_id, .. } => {
                if let Some(parent) = parent_id {
                    let block = tree::find(tree, parent)
                        .ok_or_else(|| MutationError::ParentNotFound(parent.clone()))?;
                    if !block.is_container() {
                        return Err(MutationError::NotAContainer(parent.clone()));
                    }
                }
                Ok(())
            }

            Mutation::MoveBlock {
                source_parent,
                source_index,
                dest_parent,
                ..
            } => {
                let moved = match source_parent {
                    None => tree.get(*source_index),
                    Some(parent) => {
                        let block = tree::find(tree, parent)
                            .ok_or_else(|| MutationError::ParentNotFound(parent.clone()))?;
                        block.children.get(*source_index)
                    }
                };
                let moved = moved.ok_or(MutationError::IndexOutOfBounds {
                    container: source_parent.clone(),
                    index: *source_index,
                })?;

                if let Some(dest) = dest_parent {
                    if tree::subtree_contains(moved, dest) {
                        return Err(MutationError::WouldCreateCycle);
                    }
                    let block = tree::find(tree, dest)
                        .ok_or_else(|| MutationError::ParentNotFound(dest.clone()))?;
                    if !block.is_container() {
                        return Err(MutationError::NotAContainer(dest.clone()));
                    }
                }
                Ok(())
            }

            Mutation::DeleteBlock { id }
            | Mutation::DuplicateBlock { id }
            | Mutation::UpdateBlock { id, .. }
            | Mutation::SetPayload { id, .. } => {
                tree::find(tree, id)
                    .map(|_| ())
                    .ok_or_else(|| MutationError::BlockNotFound(id.clone()))
            }

            Mutation::RestoreBlock { parent_id, .. } => {
                if let Some(parent) = parent_id {
                    tree::find(tree, parent)
                        .map(|_| ())
                        .ok_or_else(|| MutationError::ParentNotFound(parent.clone()))?;
                }
                Ok(())
            }
        }
    }

    /// Inverse mutation for undo, computed against the pre-apply tree.
    ///
    /// `None` when the inverse depends on ids generated during apply
    /// (duplicate); the undo stack derives those from the outcome instead.
    pub fn to_inverse(&self, tree: &[Block]) -> Option<Mutation> {
        match self {
            Mutation::InsertBlock { block_id, .. } => Some(Mutation::DeleteBlock {
                id: block_id.clone(),
            }),

            Mutation::MoveBlock {
                source_parent,
                source_index,
                dest_parent,
                dest_index,
            } => {
                let same_parent = source_parent == dest_parent;
                if same_parent
                    && (*dest_index == *source_index as isize
                        || *dest_index == *source_index as isize + 1)
                {
                    // Forward is a no-op; so is the inverse
                    return Some(self.clone());
                }

                // Where the block will actually land, after removal shift
                // and clamping
                let dest_len = match dest_parent {
                    None => tree.len(),
                    Some(id) => tree::find(tree, id)?.children.len(),
                };
                let upper = if same_parent {
                    dest_len.saturating_sub(1)
                } else {
                    dest_len
                };
                let mut adjusted = *dest_index;
                if same_parent && *dest_index > *source_index as isize {
                    adjusted -= 1;
                }
                let landing = adjusted.clamp(0, upper as isize) as usize;

                // Moving back re-applies the removal shift, so a backwards
                // destination past the landing point needs one extra slot
                let mut back_dest = *source_index as isize;
                if same_parent && back_dest > landing as isize {
                    back_dest += 1;
                }

                Some(Mutation::MoveBlock {
                    source_parent: dest_parent.clone(),
                    source_index: landing,
                    dest_parent: source_parent.clone(),
                    dest_index: back_dest,
                })
            }

            Mutation::DeleteBlock { id } => {
                let path = tree::find_path(tree, id)?;
                let index = *path.last()?;
                let block = tree::find(tree, id)?;
                Some(Mutation::RestoreBlock {
                    parent_id: block.parent_id.clone(),
                    index,
                    block: block.clone(),
                })
            }

            Mutation::DuplicateBlock { .. } => None,

            Mutation::UpdateBlock { id, patch } | Mutation::SetPayload { id, fields: patch } => {
                let block = tree::find(tree, id)?;
                Some(Mutation::SetPayload {
                    id: id.clone(),
                    fields: BlockPatch {
                        block_type: patch.block_type.is_some().then(|| block.block_type.clone()),
                        content: patch.content.is_some().then(|| block.content.clone()),
                        styles: patch.styles.is_some().then(|| block.styles.clone()),
                        settings: patch.settings.is_some().then(|| block.settings.clone()),
                    },
                })
            }

            Mutation::RestoreBlock { block, .. } => Some(Mutation::DeleteBlock {
                id: block.id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_model::BasicRegistry;
    use serde_json::json;

    fn ids() -> IdGenerator {
        IdGenerator::from_seed("test".to_string())
    }

    fn fixture() -> Vec<Block> {
        let mut group = Block::container("A", "core/group");
        for id in ["X", "Y", "Z"] {
            let mut child = Block::leaf(id, "core/paragraph");
            child.parent_id = Some("A".to_string());
            group.children.push(child);
        }
        vec![group]
    }

    #[test]
    fn test_mutation_serialization_roundtrip() {
        let mutation = Mutation::MoveBlock {
            source_parent: Some("A".to_string()),
            source_index: 0,
            dest_parent: None,
            dest_index: 2,
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_insert_apply_and_inverse() {
        let mut tree = fixture();
        let registry = BasicRegistry::with_core_blocks();
        let mut gen = ids();

        let mutation = Mutation::insert(Some("A".to_string()), 0, "core/heading", &mut gen);
        let inverse = mutation.to_inverse(&tree).unwrap();

        let outcome = mutation.apply(&mut tree, &registry, &mut gen).unwrap();
        assert!(outcome.applied.changed());
        assert_eq!(tree[0].children.len(), 4);

        inverse.apply(&mut tree, &registry, &mut gen).unwrap();
        assert_eq!(tree, fixture());
    }

    #[test]
    fn test_insert_unknown_type_is_an_error() {
        let mut tree = fixture();
        let registry = BasicRegistry::with_core_blocks();
        let mut gen = ids();

        let mutation = Mutation::insert(None, 0, "vendor/widget", &mut gen);
        let result = mutation.apply(&mut tree, &registry, &mut gen);

        assert_eq!(
            result,
            Err(MutationError::UnknownBlockType("vendor/widget".to_string()))
        );
        assert_eq!(tree, fixture());
    }

    #[test]
    fn test_move_inverse_restores_order() {
        let mut tree = fixture();
        let registry = BasicRegistry::with_core_blocks();
        let mut gen = ids();

        let mutation = Mutation::MoveBlock {
            source_parent: Some("A".to_string()),
            source_index: 0,
            dest_parent: Some("A".to_string()),
            dest_index: 3,
        };
        let inverse = mutation.to_inverse(&tree).unwrap();

        mutation.apply(&mut tree, &registry, &mut gen).unwrap();
        let order: Vec<_> = tree[0].children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, ["Y", "Z", "X"]);

        inverse.apply(&mut tree, &registry, &mut gen).unwrap();
        assert_eq!(tree, fixture());
    }

    #[test]
    fn test_move_inverse_across_containers() {
        let mut tree = fixture();
        tree.push(Block::container("B", "core/group"));
        let before = tree.clone();
        let registry = BasicRegistry::with_core_blocks();
        let mut gen = ids();

        let mutation = Mutation::MoveBlock {
            source_parent: Some("A".to_string()),
            source_index: 1,
            dest_parent: Some("B".to_string()),
            dest_index: 0,
        };
        let inverse = mutation.to_inverse(&tree).unwrap();

        mutation.apply(&mut tree, &registry, &mut gen).unwrap();
        inverse.apply(&mut tree, &registry, &mut gen).unwrap();

        assert_eq!(tree, before);
    }

    #[test]
    fn test_delete_inverse_restores_subtree() {
        let mut tree = fixture();
        let registry = BasicRegistry::with_core_blocks();
        let mut gen = ids();

        let mutation = Mutation::DeleteBlock { id: "Y".to_string() };
        let inverse = mutation.to_inverse(&tree).unwrap();

        mutation.apply(&mut tree, &registry, &mut gen).unwrap();
        assert!(tree::find(&tree, "Y").is_none());

        inverse.apply(&mut tree, &registry, &mut gen).unwrap();
        assert_eq!(tree, fixture());
    }

    #[test]
    fn test_update_inverse_restores_touched_fields() {
        let mut tree = fixture();
        let registry = BasicRegistry::with_core_blocks();
        let mut gen = ids();

        // Seed some styles first
        tree::update_block_deep(
            &mut tree,
            "X",
            &BlockPatch {
                styles: Some(json!({ "color": "red" })),
                ..Default::default()
            },
        );
        let before = tree.clone();

        let mutation = Mutation::UpdateBlock {
            id: "X".to_string(),
            patch: BlockPatch {
                styles: Some(json!({ "color": "blue", "padding": 8 })),
                ..Default::default()
            },
        };
        let inverse = mutation.to_inverse(&tree).unwrap();

        mutation.apply(&mut tree, &registry, &mut gen).unwrap();
        assert_eq!(
            tree::find(&tree, "X").unwrap().styles,
            json!({ "color": "blue", "padding": 8 })
        );

        inverse.apply(&mut tree, &registry, &mut gen).unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn test_identity_set_payload_is_a_noop() {
        let mut tree = fixture();
        let registry = BasicRegistry::with_core_blocks();
        let mut gen = ids();

        tree::update_block_deep(
            &mut tree,
            "X",
            &BlockPatch {
                styles: Some(json!({ "color": "red" })),
                ..Default::default()
            },
        );
        let before = tree.clone();

        // Re-setting the current values must not count as a change, so an
        // identity patch never burns an undo level
        let mutation = Mutation::SetPayload {
            id: "X".to_string(),
            fields: BlockPatch {
                block_type: Some("core/paragraph".to_string()),
                styles: Some(json!({ "color": "red" })),
                ..Default::default()
            },
        };

        let outcome = mutation.apply(&mut tree, &registry, &mut gen).unwrap();
        assert_eq!(outcome.applied, Applied::Unchanged);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_validate_reports_cycle() {
        let tree = fixture();
        let mutation = Mutation::MoveBlock {
            source_parent: None,
            source_index: 0,
            dest_parent: Some("A".to_string()),
            dest_index: 0,
        };

        assert_eq!(mutation.validate(&tree), Err(MutationError::WouldCreateCycle));
    }

    #[test]
    fn test_validate_reports_missing_parent() {
        let tree = fixture();
        let mutation = Mutation::MoveBlock {
            source_parent: Some("ghost".to_string()),
            source_index: 0,
            dest_parent: None,
            dest_index: 0,
        };

        assert_eq!(
            mutation.validate(&tree),
            Err(MutationError::ParentNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_validate_reports_non_container_parent() {
        let tree = fixture();
        let mutation = Mutation::InsertBlock {
            parent_id: Some("X".to_string()),
            index: 0,
            block_type: "core/heading".to_string(),
            block_id: "new-1".to_string(),
        };

        assert_eq!(
            mutation.validate(&tree),
            Err(MutationError::NotAContainer("X".to_string()))
        );
    }
}
