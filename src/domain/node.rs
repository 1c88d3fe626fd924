use std::fmt;

/// Stable identity of a node for the lifetime of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Logical type of a node in the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Elementary element, never has children
    Leaf,
    /// All children are required
    And,
    /// Any one child suffices
    Or,
}

impl NodeType {
    /// Decode the type code used in project files (0 = And, 1 = Or, 2 = Leaf).
    ///
    /// Unknown codes decode as `Leaf`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => NodeType::And,
            1 => NodeType::Or,
            _ => NodeType::Leaf,
        }
    }

    /// Encode into the project file type code.
    pub fn code(self) -> i32 {
        match self {
            NodeType::And => 0,
            NodeType::Or => 1,
            NodeType::Leaf => 2,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Leaf => write!(f, "LEAF"),
            NodeType::And => write!(f, "AND"),
            NodeType::Or => write!(f, "OR"),
        }
    }
}

/// A node of the AND/OR decomposition tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// Display label
    pub name: String,
    pub node_type: NodeType,
    /// Ordered child ids; order drives enumeration order
    pub children: Vec<NodeId>,
    /// Depth from the root (root = 0)
    pub level: i32,
    /// When set, automatic level assignment leaves `level` alone
    pub is_level_manual: bool,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            children: Vec::new(),
            level: 0,
            is_level_manual: false,
        }
    }

    /// Builder-style helper to attach children at construction time.
    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.node_type == NodeType::Leaf
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.node_type)
    }
}
