mod tree;

pub use sortable_tree_core::{DragSession, DropOutcome, FlatRecord, ItemId, Projection, TreeNode};
pub use tree::{SortableTree, SortableTreeRowState, SortableTreeState, sortable_tree};
