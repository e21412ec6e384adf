//! Block type registry
//!
//! The registry is an injected collaborator, not a global: every call site
//! that creates blocks takes `&dyn BlockRegistry`, so tests can supply their
//! own and hosts can swap block catalogs per document.

use crate::block::{Block, BlockKind, ColumnSlot};

/// Supplies default block instances for known type identifiers
pub trait BlockRegistry {
    /// Build the default instance for `block_type`, tagged with `id`.
    ///
    /// Returns `None` when the type is unknown. Callers treat that as a
    /// defect in whoever asked for the type, not as a recoverable state.
    fn default_block(&self, block_type: &str, id: &str) -> Option<Block>;
}

/// Map-backed registry over block factory functions
pub struct BasicRegistry {
    factories: Vec<(String, BlockFactory)>,
}

type BlockFactory = Box<dyn Fn(&str) -> Block + Send + Sync>;

impl BasicRegistry {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Registry preloaded with the core block set
    pub fn with_core_blocks() -> Self {
        let mut registry = Self::new();

        for leaf in ["core/heading", "core/paragraph", "core/image", "core/button"] {
            registry.register(leaf, move |id| Block::leaf(id, leaf));
        }

        registry.register("core/group", |id| Block::container(id, "core/group"));

        registry.register("core/columns", |id| {
            let mut block = Block::container(id, "core/columns");
            block.column_layout = Some(vec![
                ColumnSlot {
                    column_id: format!("{}-col-0", id),
                    width: "50%".to_string(),
                    block_ids: Vec::new(),
                },
                ColumnSlot {
                    column_id: format!("{}-col-1", id),
                    width: "50%".to_string(),
                    block_ids: Vec::new(),
                },
            ]);
            block
        });

        registry
    }

    pub fn register(
        &mut self,
        block_type: impl Into<String>,
        factory: impl Fn(&str) -> Block + Send + Sync + 'static,
    ) {
        self.factories.push((block_type.into(), Box::new(factory)));
    }
}

impl Default for BasicRegistry {
    fn default() -> Self {
        Self::with_core_blocks()
    }
}

impl BlockRegistry for BasicRegistry {
    fn default_block(&self, block_type: &str, id: &str) -> Option<Block> {
        self.factories
            .iter()
            .find(|(ty, _)| ty == block_type)
            .map(|(_, factory)| factory(id))
    }
}
