//! Tests for tree editing and matrix editing on TreeModel

use rstest::rstest;

use treemethod::domain::{DomainError, Node, NodeId, NodeType, TreeModel};

/// System(And) -> { Drive(Or) -> {Electric, Diesel}, Frame }
fn vehicle() -> TreeModel {
    let mut tree = TreeModel::new_project();
    let drive = tree.add_node(NodeId(0), "Drive", NodeType::Or).unwrap();
    tree.add_node(drive, "Electric", NodeType::Leaf).unwrap();
    tree.add_node(drive, "Diesel", NodeType::Leaf).unwrap();
    tree.add_node(NodeId(0), "Frame", NodeType::Leaf).unwrap();
    tree
}

fn names(tree: &TreeModel) -> Vec<String> {
    tree.nodes().map(|n| n.name.clone()).collect()
}

#[test]
fn given_new_project_then_single_and_root_named_system() {
    let tree = TreeModel::new_project();

    let root = tree.root().unwrap();

    assert_eq!(tree.len(), 1);
    assert_eq!(root.id, NodeId(0));
    assert_eq!(root.name, "System");
    assert_eq!(root.node_type, NodeType::And);
}

#[test]
fn given_nodes_when_adding_then_ids_are_max_plus_one_and_appended_to_parent() {
    // Arrange
    let mut tree = vehicle();

    // Act
    let id = tree.add_node(NodeId(1), "Hybrid", NodeType::Leaf).unwrap();

    // Assert
    assert_eq!(id, NodeId(5));
    assert_eq!(
        tree.get(NodeId(1)).unwrap().children,
        vec![NodeId(2), NodeId(3), NodeId(5)]
    );
    assert_eq!(tree.parent_of(id), Some(NodeId(1)));
}

#[test]
fn given_max_node_id_when_adding_then_ids_exhausted_instead_of_wrapping() {
    // Arrange
    let mut tree = TreeModel::from_nodes([Node::new(u32::MAX, "Root", NodeType::And)]).unwrap();

    // Act
    let result = tree.add_node(NodeId(u32::MAX), "Next", NodeType::Leaf);

    // Assert
    assert_eq!(result, Err(DomainError::IdsExhausted(NodeId(u32::MAX))));
    assert_eq!(tree.len(), 1);
    assert!(tree.root().unwrap().children.is_empty());
}

#[rstest]
#[case::leaf_parent(NodeId(4), "X", DomainError::LeafWithChildren(NodeId(4)))]
#[case::unknown_parent(NodeId(42), "X", DomainError::NodeNotFound(NodeId(42)))]
#[case::blank_name(NodeId(0), "  ", DomainError::InvalidName("  ".to_string()))]
fn given_invalid_input_when_adding_then_rejected(
    #[case] parent: NodeId,
    #[case] name: &str,
    #[case] expected: DomainError,
) {
    let mut tree = vehicle();

    let result = tree.add_node(parent, name, NodeType::Leaf);

    assert_eq!(result, Err(expected));
    assert_eq!(tree.len(), 5);
}

#[test]
fn given_subtree_when_removing_then_descendants_and_references_are_gone() {
    // Arrange
    let mut tree = vehicle();

    // Act
    let removed = tree.remove_node(NodeId(1)).unwrap();

    // Assert
    assert_eq!(removed.len(), 3);
    assert_eq!(names(&tree), vec!["System", "Frame"]);
    assert_eq!(tree.root().unwrap().children, vec![NodeId(4)]);
}

#[test]
fn given_root_when_removing_then_rejected() {
    let mut tree = vehicle();

    assert_eq!(
        tree.remove_node(NodeId(0)),
        Err(DomainError::CannotRemoveRoot(NodeId(0)))
    );
}

#[test]
fn given_ep_rows_when_adding_and_removing_nodes_then_rows_follow_their_nodes() {
    // Arrange: one EP row per non-root node, marked by its id
    let mut tree = vehicle();
    tree.resize_matrices(1, 1);
    for id in 1..=4 {
        tree.ep.as_mut().unwrap().set(id as usize - 1, 0, id).unwrap();
    }

    // Act
    let new_id = tree.add_node(NodeId(0), "Cabin", NodeType::Leaf).unwrap();
    tree.remove_node(NodeId(2)).unwrap();

    // Assert: rows of Drive, Diesel, Frame keep their values, Cabin starts at 0
    let ep = tree.ep.as_ref().unwrap();
    assert_eq!(new_id, NodeId(5));
    assert_eq!(ep.to_rows(), vec![vec![1], vec![3], vec![4], vec![0]]);
    assert_eq!(ep.rows(), tree.len() - 1);
}

#[test]
fn given_node_with_children_when_retyping_to_leaf_then_rejected() {
    let mut tree = vehicle();

    assert_eq!(
        tree.set_node_type(NodeId(1), NodeType::Leaf),
        Err(DomainError::LeafWithChildren(NodeId(1)))
    );
    tree.set_node_type(NodeId(1), NodeType::And).unwrap();
    assert_eq!(tree.get(NodeId(1)).unwrap().node_type, NodeType::And);
}

#[test]
fn given_rename_when_trimmed_name_then_stored_trimmed() {
    let mut tree = vehicle();

    tree.rename_node(NodeId(4), "  Chassis ").unwrap();

    assert_eq!(tree.get(NodeId(4)).unwrap().name, "Chassis");
}

#[test]
fn given_edges_when_linking_then_cycles_and_second_parents_rejected() {
    // Arrange
    let mut tree = vehicle();

    // Act / Assert
    assert!(matches!(
        tree.add_edge(NodeId(0), NodeId(2)),
        Err(DomainError::MultipleParents { .. })
    ));
    assert_eq!(
        tree.add_edge(NodeId(1), NodeId(0)),
        Err(DomainError::CycleDetected(NodeId(0)))
    );

    tree.remove_edge(NodeId(1), NodeId(3)).unwrap();
    tree.add_edge(NodeId(0), NodeId(3)).unwrap();
    assert_eq!(tree.parent_of(NodeId(3)), Some(NodeId(0)));
    assert_eq!(
        tree.remove_edge(NodeId(1), NodeId(3)),
        Err(DomainError::NotAChild {
            parent: NodeId(1),
            child: NodeId(3)
        })
    );
}

#[test]
fn given_manual_level_when_clearing_then_flag_resets() {
    let mut tree = vehicle();

    tree.set_level(NodeId(1), 4, true).unwrap();
    assert!(tree.get(NodeId(1)).unwrap().is_level_manual);
    tree.clear_manual_level(NodeId(1)).unwrap();

    let node = tree.get(NodeId(1)).unwrap();
    assert!(!node.is_level_manual);
    assert_eq!(node.level, 4);
}

#[test]
fn given_resize_when_growing_and_shrinking_then_defaults_fill_in() {
    // Arrange
    let mut tree = vehicle();

    // Act
    tree.resize_matrices(3, 2);

    // Assert
    assert_eq!(tree.ep.as_ref().map(|m| (m.rows(), m.cols())), Some((4, 3)));
    assert_eq!(tree.ap.as_ref().map(|m| (m.rows(), m.cols())), Some((2, 3)));
    assert_eq!(tree.goal_weights, Some(vec![1, 1]));
    assert_eq!(tree.feature_names, vec!["P1", "P2", "P3"]);
    assert_eq!(tree.goal_names, vec!["A1", "A2"]);

    tree.set_goal_weight(1, 5).unwrap();
    tree.resize_matrices(1, 1);
    assert_eq!(tree.goal_weights, Some(vec![1]));
    assert_eq!(tree.feature_names, vec!["P1"]);
}

#[rstest]
#[case(-1)]
#[case(0)]
#[case(1)]
fn given_value_in_range_when_setting_cells_then_stored(#[case] value: i32) {
    let mut tree = vehicle();
    tree.resize_matrices(2, 1);

    tree.set_ep_value(NodeId(4), 1, value).unwrap();
    tree.set_ap_value(0, 0, value).unwrap();

    assert_eq!(tree.ep.as_ref().unwrap().get(3, 1), Some(value));
    assert_eq!(tree.ap.as_ref().unwrap().get(0, 0), Some(value));
}

#[test]
fn given_invalid_cell_edits_then_rejected() {
    let mut tree = vehicle();

    assert_eq!(
        tree.set_ap_value(0, 0, 1),
        Err(DomainError::MissingMatrix("AP"))
    );
    tree.resize_matrices(2, 1);
    assert_eq!(
        tree.set_ep_value(NodeId(1), 0, 2),
        Err(DomainError::ValueOutOfRange {
            value: 2,
            min: -1,
            max: 1
        })
    );
    assert_eq!(
        tree.set_ep_value(NodeId(0), 0, 1),
        Err(DomainError::NoElementRow(NodeId(0)))
    );
    assert!(matches!(
        tree.set_ap_value(0, 5, 1),
        Err(DomainError::CellOutOfBounds { matrix: "AP", .. })
    ));
    assert_eq!(
        tree.set_goal_weight(3, 2),
        Err(DomainError::IndexOutOfRange { index: 3, len: 1 })
    );
}

#[test]
fn given_labels_when_renaming_then_updated() {
    let mut tree = vehicle();
    tree.resize_matrices(2, 1);

    tree.rename_feature(1, "Cost").unwrap();
    tree.rename_goal(0, "Cheap").unwrap();

    assert_eq!(tree.feature_names, vec!["P1", "Cost"]);
    assert_eq!(tree.goal_names, vec!["Cheap"]);
    assert!(tree.rename_goal(1, "Fast").is_err());
}

#[test]
fn given_tree_when_iterating_then_preorder_with_depth() {
    let tree = vehicle();

    let walk: Vec<(usize, String)> = tree.iter().map(|(d, n)| (d, n.name.clone())).collect();

    assert_eq!(
        walk,
        vec![
            (0, "System".to_string()),
            (1, "Drive".to_string()),
            (2, "Electric".to_string()),
            (2, "Diesel".to_string()),
            (1, "Frame".to_string()),
        ]
    );
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.leaf_count(), 3);
}
