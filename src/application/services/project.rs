//! Project persistence service
//!
//! Reads and writes `project.json`, the file layout used by the tree editor:
//! PascalCase keys, matrices as arrays of rows and node types encoded as
//! 0 = And, 1 = Or, 2 = Leaf.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, PathContextExt};
use crate::domain::{ensure_tree_structure, Matrix, Node, NodeId, NodeType, TreeModel};
use crate::infrastructure::traits::FileSystem;

/// Serialized form of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectNode {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// 0 = And, 1 = Or, 2 = Leaf
    #[serde(rename = "Type", default)]
    pub node_type: i32,
    #[serde(default)]
    pub children: Vec<u32>,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub is_level_manual: bool,
}

impl From<&Node> for ProjectNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.0,
            name: node.name.clone(),
            node_type: node.node_type.code(),
            children: node.children.iter().map(|c| c.0).collect(),
            level: node.level,
            is_level_manual: node.is_level_manual,
        }
    }
}

impl From<ProjectNode> for Node {
    fn from(p: ProjectNode) -> Self {
        Node {
            id: NodeId(p.id),
            name: p.name,
            node_type: NodeType::from_code(p.node_type),
            children: p.children.into_iter().map(NodeId).collect(),
            level: p.level,
            is_level_manual: p.is_level_manual,
        }
    }
}

/// Serialized form of a whole project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectFile {
    #[serde(default)]
    pub nodes: Vec<ProjectNode>,
    #[serde(rename = "EP", default)]
    pub ep: Vec<Vec<i32>>,
    #[serde(rename = "AP", default)]
    pub ap: Vec<Vec<i32>>,
    #[serde(default)]
    pub goal_weights: Vec<i32>,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub goal_names: Vec<String>,
}

impl From<&TreeModel> for ProjectFile {
    fn from(tree: &TreeModel) -> Self {
        Self {
            nodes: tree.nodes().map(ProjectNode::from).collect(),
            ep: tree.ep.as_ref().map(Matrix::to_rows).unwrap_or_default(),
            ap: tree.ap.as_ref().map(Matrix::to_rows).unwrap_or_default(),
            goal_weights: tree.goal_weights.clone().unwrap_or_default(),
            feature_names: tree.feature_names.clone(),
            goal_names: tree.goal_names.clone(),
        }
    }
}

impl ProjectFile {
    /// Convert into a model; empty matrices and weights become "not defined".
    pub fn into_model(self) -> ApplicationResult<TreeModel> {
        let mut tree = TreeModel::from_nodes(self.nodes.into_iter().map(Node::from))?;
        tree.ep = (!self.ep.is_empty()).then(|| Matrix::from_rows(&self.ep));
        tree.ap = (!self.ap.is_empty()).then(|| Matrix::from_rows(&self.ap));
        tree.goal_weights = (!self.goal_weights.is_empty()).then_some(self.goal_weights);
        tree.feature_names = self.feature_names;
        tree.goal_names = self.goal_names;
        ensure_tree_structure(&tree)?;
        Ok(tree)
    }
}

/// Service for loading and saving projects.
pub struct ProjectService {
    fs: Arc<dyn FileSystem>,
}

impl ProjectService {
    /// Create a new project service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a project and check its tree structure.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<TreeModel> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::ProjectNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read project", path)?;
        let tree = Self::parse(&content).map_err(|e| match e {
            ApplicationError::ProjectFormat { message, .. } => ApplicationError::ProjectFormat {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        debug!("loaded {} nodes from {}", tree.len(), path.display());
        Ok(tree)
    }

    /// Write the project as pretty-printed JSON, creating parent directories.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, tree: &TreeModel, path: &Path) -> ApplicationResult<()> {
        let json = Self::to_json(tree)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &json)
            .with_path_context("write project", path)?;
        debug!("saved {} nodes to {}", tree.len(), path.display());
        Ok(())
    }

    /// Load the project or start a fresh one when the file does not exist.
    pub fn load_or_new(&self, path: &Path) -> ApplicationResult<TreeModel> {
        match self.load(path) {
            Err(ApplicationError::ProjectNotFound(_)) => Ok(TreeModel::new_project()),
            other => other,
        }
    }

    pub fn parse(content: &str) -> ApplicationResult<TreeModel> {
        let file: ProjectFile =
            serde_json::from_str(content).map_err(|e| ApplicationError::ProjectFormat {
                path: Default::default(),
                message: e.to_string(),
            })?;
        file.into_model()
    }

    pub fn to_json(tree: &TreeModel) -> ApplicationResult<String> {
        serde_json::to_string_pretty(&ProjectFile::from(tree)).map_err(|e| {
            ApplicationError::OperationFailed {
                context: "serialize project".to_string(),
                source: Box::new(e),
            }
        })
    }
}
