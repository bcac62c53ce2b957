//! Tree reordering engine for drag-and-drop sortable trees.
//!
//! A nested tree is flattened into depth-annotated rows, filtered down to the rows whose
//! parents are expanded, and re-nested after a drop. While a drag is in progress the
//! [`DragSession`] projects where the dragged row would land (its depth and parent) from the
//! row under the pointer and the horizontal pointer offset.

mod error;
mod flatten;
mod id;
mod node;
mod projection;
mod rebuild;
mod session;
mod visibility;

pub use crate::error::{Result, TreeError};
pub use crate::flatten::{FlatRecord, flatten, validate_flattened};
pub use crate::id::ItemId;
pub use crate::node::{
    TreeNode, ancestor_ids, check_unique_ids, descendant_ids, find_node, node_count,
};
pub use crate::projection::{Projection, move_item, project};
pub use crate::rebuild::build_tree;
pub use crate::session::{
    DEFAULT_INDENT_WIDTH, DragEvent, DragSession, DragState, DropOutcome, SessionConfig,
};
pub use crate::visibility::visible_records;
