//! # Mosaic Editor
//!
//! Block tree mutation engine for Mosaic.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ drag: pointer events → DragResult           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: tree structure + mutations          │
//! │  - find / path / insert / move / delete     │
//! │  - duplicate (deep id regeneration)         │
//! │  - column slot partitions                   │
//! │  - drop routing, undo/redo                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: rendering + debounced persistence     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: `parent_id` back-references and
//!    column partitions are views that every mutation keeps consistent
//! 2. **No-op over error**: unresolvable ids and rejected moves leave the
//!    tree untouched and say so; errors mean a real defect
//! 3. **Atomic operations**: no partial tree state is ever observable
//! 4. **Injected collaborators**: the block type registry and the spatial
//!    index are parameters, never globals
//!
//! ## Usage
//!
//! ```rust
//! use mosaic_editor::{tree, Mutation, UndoStack};
//! use mosaic_model::{BasicRegistry, IdGenerator};
//!
//! let registry = BasicRegistry::with_core_blocks();
//! let mut ids = IdGenerator::new("/home.page");
//! let mut blocks = Vec::new();
//! let mut stack = UndoStack::new();
//!
//! let insert = Mutation::insert(None, 0, "core/paragraph", &mut ids);
//! stack.apply(&insert, &mut blocks, &registry, &mut ids).unwrap();
//! assert_eq!(blocks.len(), 1);
//!
//! stack.undo(&mut blocks, &registry, &mut ids).unwrap();
//! assert!(blocks.is_empty());
//! ```

pub mod columns;
pub mod drop_router;
mod errors;
mod mutations;
pub mod tree;
mod undo_stack;

pub use drop_router::apply_drop;
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationOutcome};
pub use tree::{Applied, BlockPatch};
pub use undo_stack::{MutationBatch, UndoStack};

// Re-export the model for convenience
pub use mosaic_model::{Block, BlockKind, BlockRegistry, ColumnSlot, IdGenerator};

/// Serialize the root block list for the persistence collaborator
pub fn to_persisted_json(tree: &[Block]) -> Result<String, EditorError> {
    Ok(serde_json::to_string(tree)?)
}

/// Load a root block list previously produced by [`to_persisted_json`]
pub fn from_persisted_json(json: &str) -> Result<Vec<Block>, EditorError> {
    Ok(serde_json::from_str(json)?)
}
