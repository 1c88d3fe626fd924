//! Tests for automatic level assignment

use treemethod::domain::{assign_levels, Node, NodeId, NodeType, TreeModel};

fn level(tree: &TreeModel, id: u32) -> i32 {
    tree.get(NodeId(id)).unwrap().level
}

/// Root(And) -> { A(Or) -> { B(And) -> C }, D }
fn deep() -> TreeModel {
    TreeModel::from_nodes([
        Node::new(0, "Root", NodeType::And).with_children([1u32, 4]),
        Node::new(1, "A", NodeType::Or).with_children([2u32]),
        Node::new(2, "B", NodeType::And).with_children([3u32]),
        Node::new(3, "C", NodeType::Leaf),
        Node::new(4, "D", NodeType::Leaf),
    ])
    .unwrap()
}

#[test]
fn given_tree_when_assigning_then_level_is_depth_from_root() {
    // Arrange
    let mut tree = deep();

    // Act
    assign_levels(&mut tree);

    // Assert
    let levels: Vec<i32> = (0..=4).map(|id| level(&tree, id)).collect();
    assert_eq!(levels, vec![0, 1, 2, 3, 1]);
}

#[test]
fn given_stale_levels_when_reassigning_then_overwritten() {
    let mut tree = deep();
    tree.set_level(NodeId(3), 17, false).unwrap();

    assign_levels(&mut tree);

    assert_eq!(level(&tree, 3), 3);
}

#[test]
fn given_manual_level_when_assigning_then_kept_and_subtree_follows() {
    // Arrange
    let mut tree = deep();
    tree.set_level(NodeId(1), 0, true).unwrap();

    // Act
    assign_levels(&mut tree);

    // Assert
    assert_eq!(level(&tree, 1), 0);
    assert_eq!(level(&tree, 2), 1);
    assert_eq!(level(&tree, 3), 2);
    assert_eq!(level(&tree, 4), 1);
}

#[test]
fn given_unreachable_node_when_assigning_then_untouched() {
    let mut tree = deep();
    tree.insert_node(Node::new(9, "Loose", NodeType::Leaf)).unwrap();
    tree.set_level(NodeId(9), 7, false).unwrap();

    assign_levels(&mut tree);

    assert_eq!(level(&tree, 9), 7);
}

#[test]
fn given_empty_tree_when_assigning_then_nothing_happens() {
    let mut tree = TreeModel::new();

    assign_levels(&mut tree);

    assert!(tree.is_empty());
}
