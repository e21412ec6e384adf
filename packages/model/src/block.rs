//! Block tree data model
//!
//! The tree is an ordered list of root blocks. Containers exclusively own
//! their children; `parent_id` is a lookup-only back-reference, never an
//! ownership edge. Payload fields (`content`, `styles`, `settings`) are
//! opaque JSON - the engine only ever merges them structurally.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Leaf vs container discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "block")]
    Leaf,
    #[serde(rename = "container")]
    Container,
}

/// One visual slot of a column container
///
/// `block_ids` is a view over the owning container's `children` - it selects
/// which children render in this slot and in what order. Ownership always
/// stays with `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSlot {
    pub column_id: String,

    /// Relative width, e.g. "50%" or "1fr" - opaque to the engine
    pub width: String,

    pub block_ids: Vec<String>,
}

/// A node in the content tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique across the whole tree, at every depth
    pub id: String,

    pub kind: BlockKind,

    /// Behavioral variant, e.g. "core/heading" or "core/columns"
    #[serde(rename = "type")]
    pub block_type: String,

    /// Owning container's id; `None` for root blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub styles: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub settings: Value,

    /// Meaningful only for containers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,

    /// Present only on column containers; partitions `children` into slots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_layout: Option<Vec<ColumnSlot>>,
}

impl Block {
    /// Create a leaf block with empty payloads
    pub fn leaf(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::Leaf,
            block_type: block_type.into(),
            parent_id: None,
            content: Value::Null,
            styles: Value::Null,
            settings: Value::Null,
            children: Vec::new(),
            column_layout: None,
        }
    }

    /// Create an empty container block
    pub fn container(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Container,
            ..Self::leaf(id, block_type)
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind == BlockKind::Container
    }

    pub fn is_column_container(&self) -> bool {
        self.column_layout.is_some()
    }
}
