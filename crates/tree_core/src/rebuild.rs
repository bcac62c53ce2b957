use std::collections::HashMap;

use crate::error::{Result, TreeError};
use crate::flatten::FlatRecord;
use crate::id::ItemId;
use crate::node::TreeNode;

/// Rebuild nested nodes from flat records.
///
/// Structure comes from each record's `parent_id`; siblings keep the order in which they
/// appear in `records`. A parent may appear after its children. A record whose parent id
/// is not among `records` is attached at the root level.
pub fn build_tree(records: &[FlatRecord]) -> Result<Vec<TreeNode>> {
    let mut index_of: HashMap<&ItemId, usize> = HashMap::with_capacity(records.len());
    for (ix, record) in records.iter().enumerate() {
        if index_of.insert(&record.id, ix).is_some() {
            return Err(TreeError::DuplicateId(record.id.clone()));
        }
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for (ix, record) in records.iter().enumerate() {
        let Some(parent_id) = record.parent_id.as_ref() else {
            roots.push(ix);
            continue;
        };
        match index_of.get(parent_id) {
            Some(&parent_ix) => children[parent_ix].push(ix),
            None => {
                tracing::warn!(
                    id = %record.id,
                    parent_id = %parent_id,
                    "parent not found, attaching at root level"
                );
                roots.push(ix);
            }
        }
    }

    let mut reachable = vec![false; records.len()];
    let nodes: Vec<TreeNode> = roots
        .iter()
        .map(|&ix| build_node(ix, records, &children, &mut reachable))
        .collect();

    // Records never reached from the root level sit on a parent cycle.
    if let Some(ix) = reachable.iter().position(|seen| !seen) {
        return Err(TreeError::Cycle(records[ix].id.clone()));
    }

    Ok(nodes)
}

fn build_node(
    ix: usize,
    records: &[FlatRecord],
    children: &[Vec<usize>],
    reachable: &mut [bool],
) -> TreeNode {
    reachable[ix] = true;
    let record = &records[ix];
    TreeNode {
        id: record.id.clone(),
        label: record.label.clone(),
        children: children[ix]
            .iter()
            .map(|&child_ix| build_node(child_ix, records, children, reachable))
            .collect(),
    }
}
