pub mod sortable_tree;
