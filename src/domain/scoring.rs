//! Scoring and ranking of the generated combinations.
//!
//! For each combination the active set is the leaves plus all their
//! ancestors below the root. Active nodes contribute their EP rows to a
//! per-feature sum, which is then weighted by every AP goal row and the goal
//! weights.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::combinations::generate_combinations;
use crate::domain::entities::RationalSolution;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::NodeId;
use crate::domain::tree::TreeModel;

/// How an active node's EP row is weighted before goal aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    /// Every active node counts fully; all arithmetic stays integral
    Unweighted,
    /// A node at level `l` counts `1 / (1 + l)`; run `assign_levels` first
    #[default]
    #[serde(alias = "weighted")]
    DepthWeighted,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Unweighted => write!(f, "unweighted"),
            ScoringMode::DepthWeighted => write!(f, "depth-weighted"),
        }
    }
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unweighted" | "plain" => Ok(ScoringMode::Unweighted),
            "depth-weighted" | "weighted" | "depth" => Ok(ScoringMode::DepthWeighted),
            other => Err(format!(
                "unknown scoring mode '{other}' (expected 'unweighted' or 'depth-weighted')"
            )),
        }
    }
}

/// Rank all combinations with the default (depth-weighted) mode.
pub fn find_solutions(tree: &TreeModel) -> DomainResult<Vec<RationalSolution>> {
    find_solutions_with(tree, ScoringMode::default())
}

/// Score every combination and return them best first.
///
/// Missing EP, AP or goal weights give every solution a score of 0.
#[instrument(level = "debug", skip(tree))]
pub fn find_solutions_with(
    tree: &TreeModel,
    mode: ScoringMode,
) -> DomainResult<Vec<RationalSolution>> {
    let combos = generate_combinations(tree)?;
    let Some(scorer) = Scorer::new(tree, mode) else {
        return Ok(Vec::new());
    };

    let mut solutions = Vec::with_capacity(combos.len());
    for combo in &combos {
        let active = scorer.closure(combo)?;
        let score = scorer.evaluate(&active);
        let elements = combo
            .iter()
            .filter_map(|&id| tree.get(id))
            .map(|n| n.name.clone())
            .collect();
        solutions.push(RationalSolution { elements, score });
    }

    rank_solutions(&mut solutions);
    debug!("scored {} solutions in {} mode", solutions.len(), mode);
    Ok(solutions)
}

/// Sort descending by score; equal scores keep their enumeration order.
pub fn rank_solutions(solutions: &mut [RationalSolution]) {
    solutions.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Active set of a combination: its leaves plus every ancestor except the root.
pub fn closure(tree: &TreeModel, combination: &[NodeId]) -> DomainResult<BTreeSet<NodeId>> {
    match Scorer::new(tree, ScoringMode::Unweighted) {
        Some(scorer) => scorer.closure(combination),
        None => Ok(BTreeSet::new()),
    }
}

/// Per-run lookup tables shared by all combinations.
struct Scorer<'a> {
    tree: &'a TreeModel,
    mode: ScoringMode,
    root: NodeId,
    rows: HashMap<NodeId, usize>,
    parents: HashMap<NodeId, NodeId>,
}

impl<'a> Scorer<'a> {
    fn new(tree: &'a TreeModel, mode: ScoringMode) -> Option<Self> {
        let root = tree.root_id()?;
        let mut parents = HashMap::new();
        for node in tree.nodes() {
            for &child in &node.children {
                parents.entry(child).or_insert(node.id);
            }
        }
        Some(Self {
            tree,
            mode,
            root,
            rows: tree.ep_row_index(),
            parents,
        })
    }

    fn closure(&self, combination: &[NodeId]) -> DomainResult<BTreeSet<NodeId>> {
        let limit = self.tree.len();
        let mut active: BTreeSet<NodeId> = combination.iter().copied().collect();
        for &leaf in combination {
            let mut current = leaf;
            let mut steps = 0;
            while let Some(&parent) = self.parents.get(&current) {
                if parent == self.root {
                    break;
                }
                steps += 1;
                if steps > limit {
                    return Err(DomainError::CycleDetected(leaf));
                }
                active.insert(parent);
                current = parent;
            }
        }
        Ok(active)
    }

    fn weight(&self, id: NodeId) -> f64 {
        match self.mode {
            ScoringMode::Unweighted => 1.0,
            ScoringMode::DepthWeighted => {
                let level = self.tree.get(id).map(|n| n.level.max(0)).unwrap_or(0);
                1.0 / (1.0 + f64::from(level))
            }
        }
    }

    fn evaluate(&self, active: &BTreeSet<NodeId>) -> i64 {
        let (Some(ep), Some(ap), Some(weights)) = (
            self.tree.ep.as_ref(),
            self.tree.ap.as_ref(),
            self.tree.goal_weights.as_ref(),
        ) else {
            return 0;
        };

        let features = ep.cols().min(ap.cols());
        let goals = ap.rows().min(weights.len());
        let active_rows = active
            .iter()
            .filter_map(|id| self.rows.get(id).map(|&row| (*id, row)))
            .filter(|&(_, row)| row < ep.rows());

        match self.mode {
            ScoringMode::Unweighted => {
                let mut sums = vec![0i64; features];
                for (_, row) in active_rows {
                    for (f, sum) in sums.iter_mut().enumerate() {
                        *sum += i64::from(ep.at(row, f));
                    }
                }
                (0..goals)
                    .map(|g| {
                        let goal_score: i64 = sums
                            .iter()
                            .enumerate()
                            .map(|(f, sum)| sum * i64::from(ap.at(g, f)))
                            .sum();
                        goal_score * i64::from(weights[g])
                    })
                    .sum()
            }
            ScoringMode::DepthWeighted => {
                let mut sums = vec![0f64; features];
                for (id, row) in active_rows {
                    let w = self.weight(id);
                    for (f, sum) in sums.iter_mut().enumerate() {
                        *sum += w * f64::from(ep.at(row, f));
                    }
                }
                (0..goals)
                    .map(|g| {
                        let goal_score: f64 = sums
                            .iter()
                            .enumerate()
                            .map(|(f, sum)| sum * f64::from(ap.at(g, f)))
                            .sum();
                        // f64::round rounds half away from zero
                        (goal_score.round() as i64) * i64::from(weights[g])
                    })
                    .sum()
            }
        }
    }
}
