//! Error types for tree reordering operations.

use crate::id::ItemId;

/// Errors reported by the tree engine.
///
/// Ordinary gestures never produce these. They signal invalid references or malformed
/// input handed to the engine by its caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// The id does not name any item in the working tree.
    #[error("unknown item id: {0}")]
    UnknownId(ItemId),

    /// The same id was used for more than one item.
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),

    /// A flattened record references a parent that does not precede it on its ancestor path.
    #[error("record {id} is not preceded by its parent {parent_id}")]
    OrphanedRecord { id: ItemId, parent_id: ItemId },

    /// A flattened record's depth disagrees with its ancestry.
    #[error("record {id} has depth {found}, expected {expected}")]
    DepthMismatch {
        id: ItemId,
        expected: usize,
        found: usize,
    },

    /// Following parent ids from this item never reaches the root level.
    #[error("item {0} is its own ancestor")]
    Cycle(ItemId),

    /// A drag was started while another one is still in progress.
    #[error("a drag is already in progress for {0}")]
    DragInProgress(ItemId),

    /// Indentation width must be a positive, finite number.
    #[error("invalid indent width: {0} (must be positive and finite)")]
    InvalidIndentWidth(f32),
}

/// Result alias for tree operations.
pub type Result<T, E = TreeError> = std::result::Result<T, E>;
