//! Tests for project.json persistence

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use treemethod::application::services::ProjectService;
use treemethod::application::ApplicationError;
use treemethod::domain::{DomainError, NodeId, NodeType, TreeModel};
use treemethod::infrastructure::traits::{MemoryFileSystem, RealFileSystem};

const SAMPLE: &str = r#"{
  "Nodes": [
    { "Id": 0, "Name": "System", "Type": 0, "Children": [1, 4] },
    { "Id": 1, "Name": "Drive", "Type": 1, "Children": [2, 3] },
    { "Id": 2, "Name": "Electric", "Type": 2, "Children": [] },
    { "Id": 3, "Name": "Diesel", "Type": 2, "Children": [] },
    { "Id": 4, "Name": "Frame", "Type": 2, "Children": [], "Level": 3, "IsLevelManual": true }
  ],
  "EP": [[1, 0], [1], [0, 1], [1, 1]],
  "AP": [[1, -1]],
  "GoalWeights": [2],
  "FeatureNames": ["Cost", "Range"],
  "GoalNames": ["Cheap"]
}"#;

fn real_service() -> ProjectService {
    ProjectService::new(Arc::new(RealFileSystem))
}

#[test]
fn given_project_json_when_parsing_then_types_matrices_and_levels_are_read() {
    // Act
    let tree = ProjectService::parse(SAMPLE).unwrap();

    // Assert
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.root_id(), Some(NodeId(0)));
    assert_eq!(tree.get(NodeId(0)).unwrap().node_type, NodeType::And);
    assert_eq!(tree.get(NodeId(1)).unwrap().node_type, NodeType::Or);
    assert_eq!(tree.get(NodeId(2)).unwrap().node_type, NodeType::Leaf);
    let frame = tree.get(NodeId(4)).unwrap();
    assert_eq!((frame.level, frame.is_level_manual), (3, true));

    // ragged row [1] is zero padded
    let ep = tree.ep.as_ref().unwrap();
    assert_eq!(ep.to_rows()[1], vec![1, 0]);
    assert_eq!(tree.goal_weights, Some(vec![2]));
    assert_eq!(tree.feature_names, vec!["Cost", "Range"]);
}

#[test]
fn given_project_when_saving_and_loading_then_model_survives() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/project.json");
    let service = real_service();
    let original = ProjectService::parse(SAMPLE).unwrap();

    // Act
    service.save(&original, &path).unwrap();
    let loaded = service.load(&path).unwrap();

    // Assert
    assert_eq!(
        ProjectService::to_json(&loaded).unwrap(),
        ProjectService::to_json(&original).unwrap()
    );
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"GoalWeights\""));
    assert!(raw.contains("\"IsLevelManual\": true"));
}

#[test]
fn given_minimal_nodes_when_parsing_then_matrices_are_absent() {
    let json = r#"{ "Nodes": [ { "Id": 0, "Name": "Root", "Type": 2 } ], "EP": [], "AP": [] }"#;

    let tree = ProjectService::parse(json).unwrap();

    assert!(tree.ep.is_none());
    assert!(tree.ap.is_none());
    assert!(tree.goal_weights.is_none());
}

#[test]
fn given_absent_matrices_when_serializing_then_written_as_empty_arrays() {
    let json = ProjectService::to_json(&TreeModel::new_project()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["EP"], serde_json::json!([]));
    assert_eq!(value["AP"], serde_json::json!([]));
    assert_eq!(value["Nodes"][0]["Type"], serde_json::json!(0));
}

#[test]
fn given_unknown_type_code_when_parsing_then_reads_as_leaf() {
    let json = r#"{ "Nodes": [ { "Id": 3, "Name": "Odd", "Type": 9 } ] }"#;

    let tree = ProjectService::parse(json).unwrap();

    assert_eq!(tree.get(NodeId(3)).unwrap().node_type, NodeType::Leaf);
}

#[test]
fn given_node_with_two_parents_when_parsing_then_rejected() {
    let json = r#"{ "Nodes": [
        { "Id": 0, "Name": "Root", "Type": 0, "Children": [1, 2] },
        { "Id": 1, "Name": "A", "Type": 1, "Children": [2] },
        { "Id": 2, "Name": "B", "Type": 2 }
    ] }"#;

    let result = ProjectService::parse(json);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::MultipleParents { .. }))
    ));
}

#[test]
fn given_duplicate_ids_when_parsing_then_rejected() {
    let json = r#"{ "Nodes": [
        { "Id": 0, "Name": "Root", "Type": 0 },
        { "Id": 0, "Name": "Again", "Type": 2 }
    ] }"#;

    assert!(matches!(
        ProjectService::parse(json),
        Err(ApplicationError::Domain(DomainError::DuplicateNode(NodeId(0))))
    ));
}

#[test]
fn given_malformed_json_when_loading_then_format_error_names_file() {
    // Arrange
    let path = Path::new("/projects/broken.json");
    let fs = MemoryFileSystem::new().with_file(path, "{ not json");
    let service = ProjectService::new(Arc::new(fs));

    // Act
    let result = service.load(path);

    // Assert
    match result {
        Err(ApplicationError::ProjectFormat { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected format error, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn given_missing_file_when_loading_then_not_found_and_load_or_new_starts_fresh() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");
    let service = real_service();

    assert!(matches!(
        service.load(&path),
        Err(ApplicationError::ProjectNotFound(_))
    ));
    let fresh = service.load_or_new(&path).unwrap();
    assert_eq!(fresh.root().map(|n| n.name.as_str()), Some("System"));
}
