//! Consistency checks a caller runs before analysis.
//!
//! The generator and scorer never require these checks; they degrade
//! gracefully on inconsistent input. The report exists so that editors and
//! loaders can tell the user what is off.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{NodeId, NodeType};
use crate::domain::tree::TreeModel;

/// A single finding of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Every node is somebody's child
    NoRoot,
    /// Nodes other than the root that have no parent
    DetachedNodes(Vec<NodeId>),
    MultipleParents { child: NodeId, parents: Vec<NodeId> },
    /// Nodes whose ancestor chain never ends
    Cycle(Vec<NodeId>),
    LeafWithChildren(NodeId),
    DanglingChild { parent: NodeId, child: NodeId },
    EmptyName(NodeId),
    /// AND/OR node without children, contributes no combinations
    EmptyInternalNode(NodeId),
    MissingMatrix(&'static str),
    FeatureCountMismatch { ep: usize, ap: usize },
    GoalWeightsMismatch { weights: usize, goals: usize },
    ElementRowMismatch { rows: usize, elements: usize },
}

impl ValidationIssue {
    /// Structural violations that make the model unusable as a tree.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ValidationIssue::NoRoot
                | ValidationIssue::MultipleParents { .. }
                | ValidationIssue::Cycle(_)
                | ValidationIssue::LeafWithChildren(_)
        )
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NoRoot => write!(f, "no root: every node is a child of another node"),
            ValidationIssue::DetachedNodes(ids) => {
                write!(f, "nodes not attached to the root: {}", join(ids))
            }
            ValidationIssue::MultipleParents { child, parents } => {
                write!(f, "node {} has several parents: {}", child, join(parents))
            }
            ValidationIssue::Cycle(ids) => write!(f, "cycle through nodes: {}", join(ids)),
            ValidationIssue::LeafWithChildren(id) => write!(f, "leaf node {} has children", id),
            ValidationIssue::DanglingChild { parent, child } => {
                write!(f, "node {} references missing child {}", parent, child)
            }
            ValidationIssue::EmptyName(id) => write!(f, "node {} has an empty name", id),
            ValidationIssue::EmptyInternalNode(id) => {
                write!(f, "AND/OR node {} has no children", id)
            }
            ValidationIssue::MissingMatrix(name) => write!(f, "{} matrix is not defined", name),
            ValidationIssue::FeatureCountMismatch { ep, ap } => {
                write!(f, "EP has {} features but AP has {}", ep, ap)
            }
            ValidationIssue::GoalWeightsMismatch { weights, goals } => {
                write!(f, "{} goal weights for {} goals", weights, goals)
            }
            ValidationIssue::ElementRowMismatch { rows, elements } => {
                write!(f, "EP has {} rows for {} non-root nodes", rows, elements)
            }
        }
    }
}

fn join(ids: &[NodeId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Collect every inconsistency of the tree and its matrices.
pub fn validate(tree: &TreeModel) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if tree.is_empty() {
        return issues;
    }

    let mut parents: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for node in tree.nodes() {
        for &child in &node.children {
            parents.entry(child).or_default().push(node.id);
            if !tree.contains(child) {
                issues.push(ValidationIssue::DanglingChild {
                    parent: node.id,
                    child,
                });
            }
        }
    }

    let orphans: Vec<NodeId> = tree
        .nodes()
        .filter(|n| !parents.contains_key(&n.id))
        .map(|n| n.id)
        .collect();
    match orphans.split_first() {
        None => issues.push(ValidationIssue::NoRoot),
        Some((_, rest)) if !rest.is_empty() => {
            issues.push(ValidationIssue::DetachedNodes(rest.to_vec()))
        }
        Some(_) => {}
    }

    for (&child, ps) in &parents {
        if ps.len() > 1 && tree.contains(child) {
            issues.push(ValidationIssue::MultipleParents {
                child,
                parents: ps.clone(),
            });
        }
    }

    let cyclic: Vec<NodeId> = tree
        .nodes()
        .filter(|n| tree.ancestors(n.id).is_err())
        .map(|n| n.id)
        .collect();
    if !cyclic.is_empty() {
        issues.push(ValidationIssue::Cycle(cyclic));
    }

    for node in tree.nodes() {
        if node.name.trim().is_empty() {
            issues.push(ValidationIssue::EmptyName(node.id));
        }
        match node.node_type {
            NodeType::Leaf if !node.children.is_empty() => {
                issues.push(ValidationIssue::LeafWithChildren(node.id))
            }
            NodeType::And | NodeType::Or if node.children.is_empty() => {
                issues.push(ValidationIssue::EmptyInternalNode(node.id))
            }
            _ => {}
        }
    }

    validate_matrices(tree, &mut issues);
    issues
}

fn validate_matrices(tree: &TreeModel, issues: &mut Vec<ValidationIssue>) {
    match (&tree.ep, &tree.ap) {
        (None, _) => issues.push(ValidationIssue::MissingMatrix("EP")),
        (_, None) => issues.push(ValidationIssue::MissingMatrix("AP")),
        (Some(ep), Some(ap)) => {
            if ep.cols() != ap.cols() {
                issues.push(ValidationIssue::FeatureCountMismatch {
                    ep: ep.cols(),
                    ap: ap.cols(),
                });
            }
            let elements = tree.len() - 1;
            if ep.rows() != elements {
                issues.push(ValidationIssue::ElementRowMismatch {
                    rows: ep.rows(),
                    elements,
                });
            }
            let weights = tree.goal_weights.as_ref().map(Vec::len).unwrap_or(0);
            if weights != ap.rows() {
                issues.push(ValidationIssue::GoalWeightsMismatch {
                    weights,
                    goals: ap.rows(),
                });
            }
        }
    }
}

/// Fail on the first structural violation (see [`ValidationIssue::is_error`]).
pub fn ensure_tree_structure(tree: &TreeModel) -> DomainResult<()> {
    for issue in validate(tree) {
        let err = match issue {
            ValidationIssue::NoRoot => DomainError::NoRoot,
            ValidationIssue::MultipleParents { child, parents } => DomainError::MultipleParents {
                child,
                parent: parents[0],
            },
            ValidationIssue::Cycle(ids) => DomainError::CycleDetected(ids[0]),
            ValidationIssue::LeafWithChildren(id) => DomainError::LeafWithChildren(id),
            _ => continue,
        };
        return Err(err);
    }
    Ok(())
}
