//! # Mosaic Model
//!
//! Shared data model for the Mosaic block engine: the `Block` tree node,
//! column slot types, the injectable block type registry, and id generation.

mod block;
mod id_generator;
mod registry;

pub use block::{Block, BlockKind, ColumnSlot};
pub use id_generator::{get_document_id, IdGenerator};
pub use registry::{BasicRegistry, BlockRegistry};
