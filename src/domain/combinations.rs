//! Enumeration of the theoretical solution set of an AND/OR tree.
//!
//! Each combination is the list of leaf ids that realizes the root. The
//! enumeration is bottom-up: a leaf realizes itself, an OR node is realized by
//! any one realization of any child, an AND node by one realization of every
//! child (Cartesian product).

use std::collections::HashSet;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{NodeId, NodeType};
use crate::domain::tree::TreeModel;

/// One way to realize the root: leaf ids in enumeration order.
pub type Combination = Vec<NodeId>;

/// Enumerate every combination of leaves that realizes the root.
///
/// Order follows the children lists and is stable across calls. Children
/// missing from the model, and subtrees that produce nothing, are skipped.
#[instrument(level = "debug", skip(tree))]
pub fn generate_combinations(tree: &TreeModel) -> DomainResult<Vec<Combination>> {
    let Some(root) = tree.root_id() else {
        return Ok(Vec::new());
    };
    let mut path = HashSet::new();
    let combos = combos_from(tree, root, &mut path)?;
    debug!("generated {} combinations from root {}", combos.len(), root);
    Ok(combos)
}

/// |RT|: the size of the theoretical solution set.
pub fn theoretical_count(tree: &TreeModel) -> DomainResult<usize> {
    generate_combinations(tree).map(|combos| combos.len())
}

fn combos_from(
    tree: &TreeModel,
    id: NodeId,
    path: &mut HashSet<NodeId>,
) -> DomainResult<Vec<Combination>> {
    let Some(node) = tree.get(id) else {
        return Ok(Vec::new());
    };
    if !path.insert(id) {
        return Err(DomainError::CycleDetected(id));
    }

    let combos = match node.node_type {
        NodeType::Leaf => vec![vec![id]],
        NodeType::And | NodeType::Or => {
            let mut child_sets = Vec::with_capacity(node.children.len());
            for &child in &node.children {
                let set = combos_from(tree, child, path)?;
                if !set.is_empty() {
                    child_sets.push(set);
                }
            }
            if node.node_type == NodeType::And {
                cartesian(&child_sets)
            } else {
                child_sets.into_iter().flatten().collect()
            }
        }
    };

    path.remove(&id);
    Ok(combos)
}

/// One pick per child set, concatenated; the last set varies fastest.
fn cartesian(child_sets: &[Vec<Combination>]) -> Vec<Combination> {
    if child_sets.is_empty() {
        return Vec::new();
    }
    child_sets
        .iter()
        .map(|set| set.iter())
        .multi_cartesian_product()
        .map(|picks| picks.into_iter().flatten().copied().collect())
        .collect()
}
