use std::collections::HashSet;

use tracing::{instrument, trace};

use crate::domain::tree::TreeModel;

/// Recompute `level` for every node reachable from the root (root = 0).
///
/// Nodes with `is_level_manual` keep their stored level, and their children
/// are placed one below it. Unreachable nodes are left as they are.
#[instrument(level = "debug", skip(tree))]
pub fn assign_levels(tree: &mut TreeModel) {
    let Some(root) = tree.root_id() else {
        return;
    };

    let mut visited = HashSet::new();
    let mut stack = vec![(root, 0)];
    while let Some((id, proposed)) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = tree.get_mut(id) else {
            continue;
        };
        if !node.is_level_manual {
            node.level = proposed;
        }
        trace!("level {} -> {}", node.name, node.level);
        let base = node.level;
        for &child in node.children.iter().rev() {
            stack.push((child, base + 1));
        }
    }
}
