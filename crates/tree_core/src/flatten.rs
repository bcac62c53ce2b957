use std::collections::HashSet;

use crate::error::{Result, TreeError};
use crate::id::ItemId;
use crate::node::TreeNode;

/// A flat representation of a tree item with its parent and depth.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRecord {
    pub id: ItemId,
    pub label: Option<String>,
    /// Number of direct children the node had when flattened.
    pub child_count: usize,
    /// `None` for root-level items.
    pub parent_id: Option<ItemId>,
    pub depth: usize,
}

impl FlatRecord {
    #[inline]
    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }

    #[inline]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Flatten a tree into preorder records: every node is followed by its whole subtree.
pub fn flatten(items: &[TreeNode]) -> Vec<FlatRecord> {
    let mut out = Vec::new();
    for item in items {
        add_record(item, 0, None, &mut out);
    }
    out
}

fn add_record(item: &TreeNode, depth: usize, parent_id: Option<&ItemId>, out: &mut Vec<FlatRecord>) {
    out.push(FlatRecord {
        id: item.id.clone(),
        label: item.label.clone(),
        child_count: item.children.len(),
        parent_id: parent_id.cloned(),
        depth,
    });

    for child in &item.children {
        add_record(child, depth + 1, Some(&item.id), out);
    }
}

/// Check that `records` is a valid preorder flattening of some tree.
///
/// Each record's parent must be the nearest open ancestor on the current path, its depth
/// must be one more than the parent's, and ids must be unique.
pub fn validate_flattened(records: &[FlatRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut path: Vec<&ItemId> = Vec::new();

    for record in records {
        if !seen.insert(&record.id) {
            return Err(TreeError::DuplicateId(record.id.clone()));
        }

        match record.parent_id.as_ref() {
            None => path.clear(),
            Some(parent_id) => {
                let Some(parent_depth) = path.iter().rposition(|id| *id == parent_id) else {
                    return Err(TreeError::OrphanedRecord {
                        id: record.id.clone(),
                        parent_id: parent_id.clone(),
                    });
                };
                path.truncate(parent_depth + 1);
            }
        }

        if record.depth != path.len() {
            return Err(TreeError::DepthMismatch {
                id: record.id.clone(),
                expected: path.len(),
                found: record.depth,
            });
        }
        path.push(&record.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &'static str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode::new(id).children(children)
    }

    fn record(id: &str, parent_id: Option<&str>, depth: usize) -> FlatRecord {
        FlatRecord {
            id: id.into(),
            label: None,
            child_count: 0,
            parent_id: parent_id.map(ItemId::from),
            depth,
        }
    }

    fn dump(records: &[FlatRecord]) -> String {
        let mut s = String::new();
        for r in records {
            s.push_str(&"  ".repeat(r.depth));
            s.push_str(r.id.as_str());
            if let Some(parent_id) = &r.parent_id {
                s.push_str(&format!(" <{parent_id}>"));
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn preorder_with_parent_and_depth() {
        let items = vec![
            item("A", vec![item("B", vec![item("C", vec![])]), item("D", vec![])]),
            item("E", vec![]),
        ];
        let records = flatten(&items);
        assert_eq!(
            dump(&records).trim_end(),
            r#"A
  B <A>
    C <B>
  D <A>
E"#
        );
        assert_eq!(records[0].child_count, 2);
        assert!(!records[4].has_children());
        assert!(validate_flattened(&records).is_ok());
    }

    #[test]
    fn empty_tree_flattens_to_nothing() {
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn label_falls_back_to_id() {
        let records = flatten(&[TreeNode::new("x"), TreeNode::new("y").label("Why")]);
        assert_eq!(records[0].display_label(), "x");
        assert_eq!(records[1].display_label(), "Why");
    }

    #[test]
    fn rejects_interleaved_subtrees() {
        // C claims A as parent after A's subtree was closed by the root-level B.
        let records = vec![
            record("A", None, 0),
            record("B", None, 0),
            record("C", Some("A"), 1),
        ];
        assert_eq!(
            validate_flattened(&records),
            Err(TreeError::OrphanedRecord {
                id: "C".into(),
                parent_id: "A".into(),
            })
        );
    }

    #[test]
    fn rejects_depth_gap() {
        let records = vec![record("A", None, 0), record("B", Some("A"), 2)];
        assert_eq!(
            validate_flattened(&records),
            Err(TreeError::DepthMismatch {
                id: "B".into(),
                expected: 1,
                found: 2,
            })
        );
    }

    #[test]
    fn rejects_duplicates() {
        let records = vec![record("A", None, 0), record("A", None, 0)];
        assert_eq!(
            validate_flattened(&records),
            Err(TreeError::DuplicateId("A".into()))
        );
    }

    #[test]
    fn root_record_with_nonzero_depth_is_a_mismatch() {
        let records = vec![record("A", None, 1)];
        assert!(matches!(
            validate_flattened(&records),
            Err(TreeError::DepthMismatch { expected: 0, .. })
        ));
    }
}
