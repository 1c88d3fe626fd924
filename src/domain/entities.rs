//! Domain entities: analysis results

use std::fmt;

/// A scored realization of the root, presented as a candidate solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalSolution {
    /// Names of the leaves realizing the root, in enumeration order
    pub elements: Vec<String>,
    pub score: i64,
}

impl fmt::Display for RationalSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  →  score: {}", self.elements.join(", "), self.score)
    }
}
