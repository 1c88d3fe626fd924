//! Tree and matrix rendering for the terminal

use std::collections::HashSet;

use termtree::Tree;

use crate::domain::{Matrix, NodeId, TreeModel};

pub trait TreeRender {
    fn to_termtree(&self) -> Tree<String>;
}

impl TreeRender for TreeModel {
    /// Nodes are labelled `name [TYPE #id L<level>]`; manual levels carry a `*`.
    fn to_termtree(&self) -> Tree<String> {
        let Some(root) = self.root_id() else {
            return Tree::new("Empty tree".to_string());
        };

        fn build(tree: &TreeModel, id: NodeId, visited: &mut HashSet<NodeId>) -> Tree<String> {
            let Some(node) = tree.get(id) else {
                return Tree::new(format!("<missing #{id}>"));
            };
            if !visited.insert(id) {
                return Tree::new(format!("{} <cycle #{id}>", node.name));
            }
            let manual = if node.is_level_manual { "*" } else { "" };
            let label = format!(
                "{} [{} #{} L{}{}]",
                node.name, node.node_type, node.id, node.level, manual
            );
            let leaves: Vec<_> = node
                .children
                .iter()
                .map(|&child| build(tree, child, visited))
                .collect();
            Tree::new(label).with_leaves(leaves)
        }

        let mut visited = HashSet::new();
        build(self, root, &mut visited)
    }
}

/// Render a matrix as aligned rows with labelled rows and columns.
pub fn render_matrix(matrix: &Matrix, row_labels: &[String], col_labels: &[String]) -> String {
    let label_width = row_labels.iter().map(String::len).max().unwrap_or(0).max(1);
    let mut out = format!("{:label_width$}", "");
    for col in 0..matrix.cols() {
        let label = col_labels.get(col).map(String::as_str).unwrap_or("?");
        out.push_str(&format!(" {label:>4}"));
    }
    out.push('\n');
    for (row, values) in matrix.to_rows().iter().enumerate() {
        let label = row_labels.get(row).map(String::as_str).unwrap_or("?");
        out.push_str(&format!("{label:label_width$}"));
        for value in values {
            out.push_str(&format!(" {value:>4}"));
        }
        out.push('\n');
    }
    out
}
