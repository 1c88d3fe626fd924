//! Tests for the analysis service pre-checks and report

use std::sync::Arc;

use treemethod::application::services::AnalysisService;
use treemethod::application::ApplicationError;
use treemethod::config::Settings;
use treemethod::domain::{Matrix, NodeId, NodeType, ScoringMode, TreeModel};
use treemethod::util::testing;

fn service(mode: ScoringMode) -> AnalysisService {
    AnalysisService::new(Arc::new(Settings {
        scoring_mode: mode,
        ..Default::default()
    }))
}

/// System(And) -> { Drive(Or) -> {Electric, Diesel}, Frame } with 1 feature, 1 goal.
fn scored_vehicle() -> TreeModel {
    let mut tree = TreeModel::new_project();
    let drive = tree.add_node(NodeId(0), "Drive", NodeType::Or).unwrap();
    let electric = tree.add_node(drive, "Electric", NodeType::Leaf).unwrap();
    let diesel = tree.add_node(drive, "Diesel", NodeType::Leaf).unwrap();
    let frame = tree.add_node(NodeId(0), "Frame", NodeType::Leaf).unwrap();
    tree.resize_matrices(1, 1);
    tree.set_ep_value(electric, 0, 1).unwrap();
    tree.set_ep_value(diesel, 0, -1).unwrap();
    tree.set_ep_value(frame, 0, 1).unwrap();
    tree.set_ap_value(0, 0, 1).unwrap();
    tree
}

#[test]
fn given_empty_tree_when_running_then_empty_tree_error() {
    testing::init_test_setup();

    let result = service(ScoringMode::Unweighted).run(&TreeModel::new(), None);

    assert!(matches!(result, Err(ApplicationError::EmptyTree)));
    assert!(matches!(
        service(ScoringMode::Unweighted).count(&TreeModel::new()),
        Err(ApplicationError::EmptyTree)
    ));
}

#[test]
fn given_missing_matrices_when_running_then_missing_matrices_error() {
    let tree = TreeModel::new_project();

    let result = service(ScoringMode::Unweighted).run(&tree, None);

    assert!(matches!(result, Err(ApplicationError::MissingMatrices)));
}

#[test]
fn given_scored_tree_when_running_unweighted_then_ranked_report() {
    // Act
    let report = service(ScoringMode::Unweighted)
        .run(&scored_vehicle(), None)
        .unwrap();

    // Assert
    assert_eq!(report.mode, ScoringMode::Unweighted);
    assert_eq!(report.theoretical_count, 2);
    assert!(!report.goal_weights_reset);
    assert_eq!(report.solutions[0].elements, vec!["Electric", "Frame"]);
    assert_eq!(report.solutions[0].score, 2);
    assert_eq!(report.solutions[1].score, 0);
}

#[test]
fn given_explicit_mode_when_running_then_overrides_settings() {
    // Electric (L2, 1/3) + Frame (L1, 1/2) -> round(5/6) = 1
    let report = service(ScoringMode::Unweighted)
        .run(&scored_vehicle(), Some(ScoringMode::DepthWeighted))
        .unwrap();

    assert_eq!(report.mode, ScoringMode::DepthWeighted);
    assert_eq!(report.solutions[0].score, 1);
}

#[test]
fn given_wrong_goal_weights_when_running_then_reset_to_ones_on_copy() {
    // Arrange
    let mut tree = scored_vehicle();
    tree.goal_weights = Some(vec![5, 5, 5]);

    // Act
    let report = service(ScoringMode::Unweighted).run(&tree, None).unwrap();

    // Assert
    assert!(report.goal_weights_reset);
    assert_eq!(report.solutions[0].score, 2);
    assert_eq!(tree.goal_weights, Some(vec![5, 5, 5]));
}

#[test]
fn given_depth_weighted_run_then_input_levels_are_untouched() {
    let tree = scored_vehicle();

    service(ScoringMode::DepthWeighted).run(&tree, None).unwrap();

    assert!(tree.nodes().all(|n| n.level == 0));
}

#[test]
fn given_tree_when_counting_then_theoretical_count() {
    let mut tree = scored_vehicle();
    tree.ep = Some(Matrix::default());

    let count = service(ScoringMode::Unweighted).count(&tree).unwrap();

    assert_eq!(count, 2);
}
