//! Arena-backed AND/OR tree plus the scoring matrices.

use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::matrix::Matrix;
use crate::domain::node::{Node, NodeId, NodeType};

/// Name given to the root of a fresh project.
pub const DEFAULT_ROOT_NAME: &str = "System";

/// Smallest value accepted by the matrix cell editors.
pub const MATRIX_VALUE_MIN: i32 = -1;
/// Largest value accepted by the matrix cell editors.
pub const MATRIX_VALUE_MAX: i32 = 1;

/// Decomposition tree with its EP/AP matrices and goal weights.
///
/// Nodes live in a generational arena and are addressed by their stable
/// [`NodeId`]. Insertion order is kept separately because the EP row of a
/// node is its position among the non-root nodes.
///
/// Parents are never stored: the parent of a node is the first node (in
/// insertion order) whose `children` contains it.
#[derive(Debug, Clone)]
pub struct TreeModel {
    arena: Arena<Node>,
    order: Vec<Index>,
    index_by_id: HashMap<NodeId, Index>,
    /// Element x feature matrix, one row per non-root node
    pub ep: Option<Matrix>,
    /// Goal x feature matrix
    pub ap: Option<Matrix>,
    /// One weight per AP row
    pub goal_weights: Option<Vec<i32>>,
    pub feature_names: Vec<String>,
    pub goal_names: Vec<String>,
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeModel {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            order: Vec::new(),
            index_by_id: HashMap::new(),
            ep: None,
            ap: None,
            goal_weights: None,
            feature_names: Vec::new(),
            goal_names: Vec::new(),
        }
    }

    /// Fresh project: a single AND root named "System" with id 0.
    pub fn new_project() -> Self {
        let mut tree = Self::new();
        tree.arena_insert(Node::new(0, DEFAULT_ROOT_NAME, NodeType::And));
        tree
    }

    /// Build a model from a flat node list; children are taken as given.
    pub fn from_nodes<I: IntoIterator<Item = Node>>(nodes: I) -> DomainResult<Self> {
        let mut tree = Self::new();
        for node in nodes {
            tree.insert_node(node)?;
        }
        Ok(tree)
    }

    /// Raw insertion used by loaders. Does not touch any other node.
    #[instrument(level = "trace", skip(self, node), fields(id = %node.id))]
    pub fn insert_node(&mut self, node: Node) -> DomainResult<()> {
        if self.index_by_id.contains_key(&node.id) {
            return Err(DomainError::DuplicateNode(node.id));
        }
        self.arena_insert(node);
        Ok(())
    }

    fn arena_insert(&mut self, node: Node) {
        let id = node.id;
        let idx = self.arena.insert(node);
        self.order.push(idx);
        self.index_by_id.insert(id, idx);
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index_by_id.get(&id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index_by_id.get(&id).and_then(|&idx| self.arena.get_mut(idx))
    }

    fn node(&self, id: NodeId) -> DomainResult<&Node> {
        self.get(id).ok_or(DomainError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut Node> {
        self.get_mut(id).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(move |&idx| self.arena.get(idx))
    }

    /// The first node that is nobody's child; falls back to the first node.
    pub fn root_id(&self) -> Option<NodeId> {
        let children: HashSet<NodeId> = self
            .nodes()
            .flat_map(|n| n.children.iter().copied())
            .collect();
        self.nodes()
            .find(|n| !children.contains(&n.id))
            .or_else(|| self.nodes().next())
            .map(|n| n.id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.root_id().and_then(|id| self.get(id))
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes().find(|n| n.children.contains(&id)).map(|n| n.id)
    }

    /// Ancestors of `id`, nearest first, up to and including the root.
    ///
    /// The walk is bounded by the node count, so a cyclic parent chain is
    /// reported instead of looping.
    pub fn ancestors(&self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            if result.len() >= self.len() {
                return Err(DomainError::CycleDetected(id));
            }
            result.push(parent);
            current = parent;
        }
        Ok(result)
    }

    /// Map from non-root node id to its EP row, following insertion order.
    pub fn ep_row_index(&self) -> HashMap<NodeId, usize> {
        let root = self.root_id();
        self.nodes()
            .filter(|n| Some(n.id) != root)
            .enumerate()
            .map(|(row, n)| (n.id, row))
            .collect()
    }

    /// Non-root nodes in EP row order.
    pub fn non_root_nodes(&self) -> Vec<&Node> {
        let root = self.root_id();
        self.nodes().filter(|n| Some(n.id) != root).collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes().filter(|n| n.is_leaf()).count()
    }

    /// Pre-order iteration from the root as `(depth, node)`.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Number of levels reachable from the root (0 for an empty tree).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    /// `id` and every node below it, each visited once.
    fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current);
            if let Some(node) = self.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        result
    }

    /// Max id + 1, or 0 for an empty tree.
    fn next_id(&self) -> DomainResult<NodeId> {
        match self.index_by_id.keys().max() {
            None => Ok(NodeId(0)),
            Some(max) => max
                .0
                .checked_add(1)
                .map(NodeId)
                .ok_or(DomainError::IdsExhausted(*max)),
        }
    }

    // ------------------------------------------------------------
    // Structural editing
    // ------------------------------------------------------------

    /// Append a new child under `parent` and return its id (max id + 1).
    ///
    /// A zero EP row is inserted for the new node so existing rows keep
    /// pointing at the same nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: &str,
        node_type: NodeType,
    ) -> DomainResult<NodeId> {
        validate_name(name)?;
        if self.node(parent)?.is_leaf() {
            return Err(DomainError::LeafWithChildren(parent));
        }
        let id = self.next_id()?;
        self.arena_insert(Node::new(id, name.trim(), node_type));
        self.node_mut(parent)?.children.push(id);

        let row = self.ep_row_index().get(&id).copied();
        if let (Some(ep), Some(row)) = (self.ep.as_mut(), row) {
            ep.insert_row(row);
        }
        debug!("added node {} under {}", id, parent);
        Ok(id)
    }

    /// Remove `id` with all its descendants and every reference to them.
    ///
    /// Returns the removed ids. EP rows of removed nodes are dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        self.node(id)?;
        if self.root_id() == Some(id) {
            return Err(DomainError::CannotRemoveRoot(id));
        }

        let doomed = self.subtree_ids(id);
        let doomed_set: HashSet<NodeId> = doomed.iter().copied().collect();

        let rows = self.ep_row_index();
        let mut doomed_rows: Vec<usize> =
            doomed.iter().filter_map(|d| rows.get(d).copied()).collect();
        doomed_rows.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(ep) = self.ep.as_mut() {
            for row in doomed_rows {
                ep.remove_row(row);
            }
        }

        for &idx in &self.order {
            if let Some(node) = self.arena.get_mut(idx) {
                node.children.retain(|c| !doomed_set.contains(c));
            }
        }
        for d in &doomed {
            if let Some(idx) = self.index_by_id.remove(d) {
                self.arena.remove(idx);
            }
        }
        self.order.retain(|&idx| self.arena.contains(idx));

        debug!("removed {} nodes", doomed.len());
        Ok(doomed)
    }

    pub fn rename_node(&mut self, id: NodeId, name: &str) -> DomainResult<()> {
        validate_name(name)?;
        self.node_mut(id)?.name = name.trim().to_string();
        Ok(())
    }

    pub fn set_node_type(&mut self, id: NodeId, node_type: NodeType) -> DomainResult<()> {
        let node = self.node_mut(id)?;
        if node_type == NodeType::Leaf && !node.children.is_empty() {
            return Err(DomainError::LeafWithChildren(id));
        }
        node.node_type = node_type;
        Ok(())
    }

    /// Attach an existing node as the last child of `parent`.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.node(child)?;
        if self.node(parent)?.is_leaf() {
            return Err(DomainError::LeafWithChildren(parent));
        }
        if let Some(existing) = self.parent_of(child) {
            return Err(DomainError::MultipleParents {
                child,
                parent: existing,
            });
        }
        if parent == child || self.ancestors(parent)?.contains(&child) {
            return Err(DomainError::CycleDetected(child));
        }
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach `child` from `parent`; the child stays in the model.
    pub fn remove_edge(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        let node = self.node_mut(parent)?;
        let before = node.children.len();
        node.children.retain(|&c| c != child);
        if node.children.len() == before {
            return Err(DomainError::NotAChild { parent, child });
        }
        Ok(())
    }

    pub fn set_level(&mut self, id: NodeId, level: i32, manual: bool) -> DomainResult<()> {
        let node = self.node_mut(id)?;
        node.level = level;
        node.is_level_manual = manual;
        Ok(())
    }

    /// Return a node to automatic level assignment.
    pub fn clear_manual_level(&mut self, id: NodeId) -> DomainResult<()> {
        self.node_mut(id)?.is_level_manual = false;
        Ok(())
    }

    // ------------------------------------------------------------
    // Matrix editing
    // ------------------------------------------------------------

    /// Size EP to (non-root nodes x features) and AP to (goals x features).
    ///
    /// Existing cells are kept, weights default to 1 and names to `P{n}`/`A{n}`.
    pub fn resize_matrices(&mut self, features: usize, goals: usize) {
        let elements = self.len().saturating_sub(1);
        self.ep
            .get_or_insert_with(Matrix::default)
            .resize(elements, features);
        self.ap
            .get_or_insert_with(Matrix::default)
            .resize(goals, features);
        self.goal_weights
            .get_or_insert_with(Vec::new)
            .resize(goals, 1);
        resize_names(&mut self.feature_names, features, "P");
        resize_names(&mut self.goal_names, goals, "A");
    }

    /// Set the EP cell of `node` for `feature`.
    pub fn set_ep_value(&mut self, node: NodeId, feature: usize, value: i32) -> DomainResult<()> {
        check_range(value)?;
        self.node(node)?;
        let row = *self
            .ep_row_index()
            .get(&node)
            .ok_or(DomainError::NoElementRow(node))?;
        let ep = self.ep.as_mut().ok_or(DomainError::MissingMatrix("EP"))?;
        set_cell(ep, "EP", row, feature, value)
    }

    pub fn set_ap_value(&mut self, goal: usize, feature: usize, value: i32) -> DomainResult<()> {
        check_range(value)?;
        let ap = self.ap.as_mut().ok_or(DomainError::MissingMatrix("AP"))?;
        set_cell(ap, "AP", goal, feature, value)
    }

    pub fn set_goal_weight(&mut self, goal: usize, weight: i32) -> DomainResult<()> {
        let goals = self
            .ap
            .as_ref()
            .map(Matrix::rows)
            .ok_or(DomainError::MissingMatrix("AP"))?;
        let weights = self.goal_weights.get_or_insert_with(|| vec![1; goals]);
        let len = weights.len();
        let slot = weights
            .get_mut(goal)
            .ok_or(DomainError::IndexOutOfRange { index: goal, len })?;
        *slot = weight;
        Ok(())
    }

    pub fn rename_feature(&mut self, index: usize, name: &str) -> DomainResult<()> {
        rename_label(&mut self.feature_names, index, name)
    }

    pub fn rename_goal(&mut self, index: usize, name: &str) -> DomainResult<()> {
        rename_label(&mut self.goal_names, index, name)
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn check_range(value: i32) -> DomainResult<()> {
    if !(MATRIX_VALUE_MIN..=MATRIX_VALUE_MAX).contains(&value) {
        return Err(DomainError::ValueOutOfRange {
            value,
            min: MATRIX_VALUE_MIN,
            max: MATRIX_VALUE_MAX,
        });
    }
    Ok(())
}

fn set_cell(
    m: &mut Matrix,
    name: &'static str,
    row: usize,
    col: usize,
    value: i32,
) -> DomainResult<()> {
    m.set(row, col, value).map_err(|_| DomainError::CellOutOfBounds {
        matrix: name,
        row,
        col,
        rows: m.rows(),
        cols: m.cols(),
    })
}

fn resize_names(names: &mut Vec<String>, len: usize, prefix: &str) {
    names.truncate(len);
    while names.len() < len {
        names.push(format!("{}{}", prefix, names.len() + 1));
    }
}

fn rename_label(names: &mut [String], index: usize, name: &str) -> DomainResult<()> {
    validate_name(name)?;
    let len = names.len();
    let slot = names
        .get_mut(index)
        .ok_or(DomainError::IndexOutOfRange { index, len })?;
    *slot = name.trim().to_string();
    Ok(())
}

/// Pre-order walk from the root that never revisits a node.
pub struct TreeIterator<'a> {
    tree: &'a TreeModel,
    stack: Vec<(usize, NodeId)>,
    visited: HashSet<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TreeModel) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root_id() {
            stack.push((0, root));
        }
        Self {
            tree,
            stack,
            visited: HashSet::new(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, id)) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            if let Some(node) = self.tree.get(id) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((depth + 1, child));
                }
                return Some((depth, node));
            }
        }
        None
    }
}
