use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::id::ItemId;

/// A tree item with an optional label and ordered children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            label: None,
            children: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The label, or the id when the node has none.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }
}

pub fn find_node<'a>(items: &'a [TreeNode], target_id: &ItemId) -> Option<&'a TreeNode> {
    for node in items {
        if node.id == *target_id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, target_id) {
            return Some(found);
        }
    }
    None
}

/// Ids of every descendant of `target_id`, in preorder. Empty when the id is unknown.
pub fn descendant_ids(items: &[TreeNode], target_id: &ItemId) -> Vec<ItemId> {
    fn collect(items: &[TreeNode], out: &mut Vec<ItemId>) {
        for node in items {
            out.push(node.id.clone());
            collect(&node.children, out);
        }
    }

    let mut out = Vec::new();
    if let Some(node) = find_node(items, target_id) {
        collect(&node.children, &mut out);
    }
    out
}

/// Ids of the ancestors of `target_id`, nearest parent first.
pub fn ancestor_ids(items: &[TreeNode], target_id: &ItemId) -> Vec<ItemId> {
    fn walk(items: &[TreeNode], target_id: &ItemId, path: &mut Vec<ItemId>) -> bool {
        for node in items {
            if node.id == *target_id {
                return true;
            }
            path.push(node.id.clone());
            if walk(&node.children, target_id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    if !walk(items, target_id, &mut path) {
        return Vec::new();
    }
    path.reverse();
    path
}

pub fn node_count(items: &[TreeNode]) -> usize {
    items
        .iter()
        .map(|node| 1 + node_count(&node.children))
        .sum()
}

pub fn check_unique_ids(items: &[TreeNode]) -> Result<()> {
    fn walk<'a>(items: &'a [TreeNode], seen: &mut HashSet<&'a ItemId>) -> Result<()> {
        for node in items {
            if !seen.insert(&node.id) {
                return Err(TreeError::DuplicateId(node.id.clone()));
            }
            walk(&node.children, seen)?;
        }
        Ok(())
    }

    walk(items, &mut HashSet::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &'static str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode::new(id).children(children)
    }

    fn sample() -> Vec<TreeNode> {
        vec![
            item("A", vec![item("B", vec![item("C", vec![])]), item("D", vec![])]),
            item("E", vec![]),
        ]
    }

    #[test]
    fn descendants_in_preorder() {
        let items = sample();
        assert_eq!(descendant_ids(&items, &"A".into()), ["B", "C", "D"]);
        assert!(descendant_ids(&items, &"E".into()).is_empty());
        assert!(descendant_ids(&items, &"missing".into()).is_empty());
    }

    #[test]
    fn ancestors_nearest_first() {
        let items = sample();
        assert_eq!(ancestor_ids(&items, &"C".into()), ["B", "A"]);
        assert!(ancestor_ids(&items, &"A".into()).is_empty());
        assert!(ancestor_ids(&items, &"missing".into()).is_empty());
    }

    #[test]
    fn counts_every_node() {
        assert_eq!(node_count(&sample()), 5);
        assert_eq!(node_count(&[]), 0);
    }

    #[test]
    fn duplicate_ids_are_reported() {
        assert!(check_unique_ids(&sample()).is_ok());
        let items = vec![item("A", vec![item("B", vec![])]), item("B", vec![])];
        assert_eq!(
            check_unique_ids(&items),
            Err(TreeError::DuplicateId("B".into()))
        );
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let items: Vec<TreeNode> =
            serde_json::from_str(r#"[{"id":"A","children":[{"id":"B","label":"Bee"}]}]"#)
                .unwrap();
        assert_eq!(items[0].label, None);
        assert_eq!(items[0].children[0].display_label(), "Bee");
        assert!(items[0].children[0].children.is_empty());
    }
}
