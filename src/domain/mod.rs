//! Domain layer: tree model, enumeration and scoring
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod combinations;
pub mod entities;
pub mod error;
pub mod levels;
pub mod matrix;
pub mod node;
pub mod scoring;
pub mod tree;
pub mod validate;

pub use combinations::{generate_combinations, theoretical_count, Combination};
pub use entities::RationalSolution;
pub use error::{DomainError, DomainResult};
pub use levels::assign_levels;
pub use matrix::Matrix;
pub use node::{Node, NodeId, NodeType};
pub use scoring::{closure, find_solutions, find_solutions_with, rank_solutions, ScoringMode};
pub use tree::{TreeIterator, TreeModel};
pub use validate::{ensure_tree_structure, validate, ValidationIssue};
