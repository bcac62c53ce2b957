use std::collections::HashSet;

use crate::flatten::FlatRecord;
use crate::id::ItemId;

/// Keep root-level records and records whose immediate parent is expanded.
///
/// Only the immediate parent is checked, not the whole ancestor chain: a record whose
/// parent is expanded stays visible even when a higher ancestor is collapsed.
pub fn visible_records(records: &[FlatRecord], expanded: &HashSet<ItemId>) -> Vec<FlatRecord> {
    records
        .iter()
        .filter(|record| {
            record
                .parent_id
                .as_ref()
                .is_none_or(|parent_id| expanded.contains(parent_id))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::node::TreeNode;

    fn ids(records: &[FlatRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    fn expanded(ids: &[&str]) -> HashSet<ItemId> {
        ids.iter().copied().map(ItemId::from).collect()
    }

    fn sample() -> Vec<FlatRecord> {
        flatten(&[
            TreeNode::new("A").child(TreeNode::new("A1").child(TreeNode::new("A1a"))),
            TreeNode::new("B").child(TreeNode::new("B1")),
        ])
    }

    #[test]
    fn collapsed_tree_shows_roots_only() {
        assert_eq!(ids(&visible_records(&sample(), &expanded(&[]))), ["A", "B"]);
    }

    #[test]
    fn expanding_reveals_direct_children_in_order() {
        assert_eq!(
            ids(&visible_records(&sample(), &expanded(&["A", "B"]))),
            ["A", "A1", "B", "B1"]
        );
    }

    #[test]
    fn only_the_immediate_parent_is_checked() {
        // A is collapsed but A1 is still marked expanded.
        assert_eq!(
            ids(&visible_records(&sample(), &expanded(&["A1"]))),
            ["A", "A1a", "B"]
        );
    }
}
