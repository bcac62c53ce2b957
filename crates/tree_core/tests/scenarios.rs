use std::collections::HashSet;

use sortable_tree_core::{
    DragSession, FlatRecord, ItemId, Projection, TreeError, TreeNode, build_tree, flatten, project,
    visible_records,
};

fn record(id: &str, parent_id: Option<&str>, depth: usize) -> FlatRecord {
    FlatRecord {
        id: id.into(),
        label: None,
        child_count: 0,
        parent_id: parent_id.map(ItemId::from),
        depth,
    }
}

fn summary(records: &[FlatRecord]) -> Vec<(&str, Option<&str>, usize)> {
    records
        .iter()
        .map(|r| (r.id.as_str(), r.parent_id.as_ref().map(ItemId::as_str), r.depth))
        .collect()
}

fn expanded(ids: &[&str]) -> HashSet<ItemId> {
    ids.iter().copied().map(ItemId::from).collect()
}

#[test]
fn flat_roots_flatten_to_depth_zero() {
    let items = vec![TreeNode::new("A"), TreeNode::new("B")];
    assert_eq!(
        summary(&flatten(&items)),
        [("A", None, 0), ("B", None, 0)]
    );
}

#[test]
fn collapsed_parent_hides_children() {
    let items = vec![TreeNode::new("A").child(TreeNode::new("A1"))];
    let visible = visible_records(&flatten(&items), &expanded(&[]));
    assert_eq!(summary(&visible), [("A", None, 0)]);
}

#[test]
fn expanded_parent_shows_children() {
    let items = vec![TreeNode::new("A").child(TreeNode::new("A1"))];
    let visible = visible_records(&flatten(&items), &expanded(&["A"]));
    assert_eq!(summary(&visible), [("A", None, 0), ("A1", Some("A"), 1)]);
}

#[test]
fn projection_is_clamped_one_level_below_previous() {
    let visible = vec![
        record("A", None, 0),
        record("B", None, 0),
        record("C", None, 0),
    ];
    // Dropping A on B leaves B directly above it.
    let projected = project(&visible, &"A".into(), &"B".into(), 20., 20.).unwrap();
    assert_eq!(
        projected,
        Projection {
            depth: 1,
            parent_id: Some("B".into()),
        }
    );

    // Far to the right still only nests one level below the previous row.
    let projected = project(&visible, &"A".into(), &"C".into(), 400., 20.).unwrap();
    assert_eq!(
        projected,
        Projection {
            depth: 1,
            parent_id: Some("C".into()),
        }
    );
}

#[test]
fn cancel_restores_pre_drag_state() {
    let items = vec![
        TreeNode::new("A").child(TreeNode::new("A1")),
        TreeNode::new("B"),
    ];
    let mut session = DragSession::new(items.clone()).unwrap().with_expanded_ids(["B"]);
    let before = session.expanded_ids().clone();

    session.drag_start("A").unwrap();
    session.drag_move(60.);
    session.drag_over(Some("B".into()));
    assert!(session.projection().is_some());
    session.drag_cancel();

    assert_eq!(session.items(), items.as_slice());
    assert_eq!(session.expanded_ids(), &before);
    assert_eq!(session.active_id(), None);
    assert_eq!(session.over_id(), None);
    assert_eq!(session.offset_x(), 0.);
    assert!(session.projection().is_none());
}

#[test]
fn expanded_id_outlives_its_children_being_dragged_away() {
    let items = vec![
        TreeNode::new("A").child(TreeNode::new("A1")),
        TreeNode::new("B"),
    ];
    let mut session = DragSession::new(items).unwrap();
    session.toggle_expand("A");
    assert!(session.is_expanded(&"A".into()));

    // Drag A1 below B at the root level; A is left without children.
    session.drag_start("A1").unwrap();
    session.drag_over(Some("B".into()));
    session.drag_move(-40.);
    let outcome = session.drag_end().unwrap().unwrap();
    assert_eq!(outcome.parent_id, None);
    assert!(session.items()[0].children.is_empty());

    assert!(session.is_expanded(&"A".into()));
}

#[test]
fn drop_into_collapsed_parent_expands_it() {
    let items = vec![
        TreeNode::new("A").child(TreeNode::new("A1")),
        TreeNode::new("B"),
    ];
    let mut session = DragSession::new(items).unwrap();
    assert_eq!(session.visible().len(), 2);

    // B right below A and one indent in: becomes A's child next to the hidden A1.
    session.drag_start("B").unwrap();
    session.drag_move(20.);
    let outcome = session.drag_end().unwrap().unwrap();
    assert_eq!(outcome.parent_id, Some("A".into()));

    let children: Vec<&str> = session.items()[0]
        .children
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(children, ["A1", "B"]);
    assert!(session.is_expanded(&"A".into()));
    assert_eq!(session.visible().len(), 3);
}

#[test]
fn outdent_past_several_levels_in_one_gesture() {
    let items = vec![
        TreeNode::new("A").child(
            TreeNode::new("A1").child(TreeNode::new("A1a").child(TreeNode::new("A1a1"))),
        ),
        TreeNode::new("B"),
    ];
    let mut session = DragSession::new(items)
        .unwrap()
        .with_expanded_ids(["A", "A1", "A1a"]);

    session.drag_start("A1a1").unwrap();
    session.drag_move(-40.);
    assert_eq!(
        session.projection(),
        Some(&Projection {
            depth: 1,
            parent_id: Some("A".into()),
        })
    );
    session.drag_end().unwrap();

    let a: Vec<&str> = session.items()[0]
        .children
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(a, ["A1", "A1a1"]);
}

#[test]
fn rebuild_reports_malformed_records() {
    let duplicated = vec![record("A", None, 0), record("A", None, 0)];
    assert_eq!(
        build_tree(&duplicated),
        Err(TreeError::DuplicateId("A".into()))
    );

    let orphan = vec![record("A", None, 0), record("B", Some("gone"), 1)];
    let rebuilt = build_tree(&orphan).unwrap();
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt[1].id, "B");
}

#[test]
fn session_accepts_json_trees() {
    let items: Vec<TreeNode> = serde_json::from_str(
        r#"[
            {"id": "docs", "label": "Docs", "children": [{"id": "intro", "label": "Intro"}]},
            {"id": "notes"}
        ]"#,
    )
    .unwrap();
    let session = DragSession::new(items).unwrap().with_expanded_ids(["docs"]);
    let labels: Vec<&str> = session.visible().iter().map(|r| r.display_label()).collect();
    assert_eq!(labels, ["Docs", "Intro", "notes"]);
}
