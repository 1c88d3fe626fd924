//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the tree model's structural rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("cycle detected in hierarchy at node {0}")]
    CycleDetected(NodeId),

    #[error("node {child} already has parent {parent}")]
    MultipleParents { child: NodeId, parent: NodeId },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("leaf node {0} cannot have children")]
    LeafWithChildren(NodeId),

    #[error("the root node {0} cannot be removed")]
    CannotRemoveRoot(NodeId),

    #[error("no node id left after {0}")]
    IdsExhausted(NodeId),

    #[error("node {0} is the root and has no EP row")]
    NoElementRow(NodeId),

    #[error("tree has no root node")]
    NoRoot,

    #[error("invalid node name: {0:?}")]
    InvalidName(String),

    #[error("value {value} out of range {min}..={max}")]
    ValueOutOfRange { value: i32, min: i32, max: i32 },

    #[error("{matrix} index ({row}, {col}) out of bounds ({rows}x{cols})")]
    CellOutOfBounds {
        matrix: &'static str,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("{0} matrix is not defined")]
    MissingMatrix(&'static str),

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
