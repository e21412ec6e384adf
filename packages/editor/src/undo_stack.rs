//! # Undo/Redo Stack
//!
//! Tracks mutation history over a block tree.
//!
//! ## Design
//!
//! - Each mutation records its inverse before being applied; mutations that
//!   create ids during apply (duplicate) derive the inverse from the
//!   outcome afterwards
//! - Mutations that did not change the tree are not recorded - a rejected
//!   move or an unresolvable id never burns an undo level
//! - Undo applies the inverse and moves the batch to the redo stack
//! - New mutations clear the redo stack
//! - Batches group multiple mutations into one undo step (e.g. a drop that
//!   both moves a block and repairs a column partition)

use mosaic_model::{Block, BlockRegistry, IdGenerator};
use tracing::debug;

use crate::mutations::{Mutation, MutationError, MutationOutcome};
use crate::tree::Applied;

/// A group of mutations undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// Applied mutations, in application order
    pub mutations: Vec<Mutation>,

    /// Inverse mutations, in undo order (reverse of application)
    pub inverses: Vec<Mutation>,

    pub description: Option<String>,
}

impl MutationBatch {
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
            inverses: vec![inverse],
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for block tree editing
#[derive(Debug, Default)]
pub struct UndoStack {
    undo_stack: Vec<MutationBatch>,
    redo_stack: Vec<MutationBatch>,

    /// 0 = unlimited
    max_levels: usize,

    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Default maximum of 100 undo levels
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo.
    ///
    /// No-op applications are passed through without recording.
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        tree: &mut Vec<Block>,
        registry: &dyn BlockRegistry,
        ids: &mut IdGenerator,
    ) -> Result<MutationOutcome, MutationError> {
        let inverse_before = mutation.to_inverse(tree);

        let outcome = mutation.apply(tree, registry, ids)?;
        if outcome.applied == Applied::Unchanged {
            debug!("mutation was a no-op; not recorded");
            return Ok(outcome);
        }

        let inverse = match inverse_before {
            Some(inverse) => Some(inverse),
            // Duplicate: the clone's id only exists after apply
            None => outcome
                .created_id
                .clone()
                .map(|id| Mutation::DeleteBlock { id }),
        };
        let Some(inverse) = inverse else {
            debug!("no inverse available; mutation not recorded");
            return Ok(outcome);
        };

        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(mutation.clone());
            batch.inverses.insert(0, inverse);
        } else {
            self.push_batch(MutationBatch::single(mutation.clone(), inverse));
        }

        Ok(outcome)
    }

    /// Start grouping mutations into one undo step
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(MutationBatch {
            mutations: Vec::new(),
            inverses: Vec::new(),
            description: None,
        });
    }

    /// Close the current batch and push it to the undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new action invalidates the redo future
        self.redo_stack.clear();
    }

    /// Undo the most recent batch. Returns false when there is nothing to
    /// undo.
    pub fn undo(
        &mut self,
        tree: &mut Vec<Block>,
        registry: &dyn BlockRegistry,
        ids: &mut IdGenerator,
    ) -> Result<bool, MutationError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        for inverse in &batch.inverses {
            inverse.apply(tree, registry, ids)?;
        }

        self.redo_stack.push(batch);
        Ok(true)
    }

    /// Redo the most recently undone batch
    pub fn redo(
        &mut self,
        tree: &mut Vec<Block>,
        registry: &dyn BlockRegistry,
        ids: &mut IdGenerator,
    ) -> Result<bool, MutationError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        for mutation in &batch.mutations {
            mutation.apply(tree, registry, ids)?;
        }

        self.undo_stack.push(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}
