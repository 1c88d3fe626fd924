//! Analysis service
//!
//! Runs the pre-checks a calculation needs, then enumerates and ranks the
//! solutions on a working copy of the tree.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    assign_levels, find_solutions_with, theoretical_count, RationalSolution, ScoringMode,
    TreeModel,
};

/// Outcome of a full analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// |RT|, the number of structurally valid realizations
    pub theoretical_count: usize,
    /// Scored solutions, best first
    pub solutions: Vec<RationalSolution>,
    pub mode: ScoringMode,
    /// Goal weights were missing or mis-sized and were reset to all 1s
    pub goal_weights_reset: bool,
}

/// Service for computing |RT| and ranking rational solutions.
pub struct AnalysisService {
    settings: Arc<Settings>,
}

impl AnalysisService {
    /// Create a new analysis service.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// |RT| of the tree. Only requires a non-empty tree.
    pub fn count(&self, tree: &TreeModel) -> ApplicationResult<usize> {
        if tree.is_empty() {
            return Err(ApplicationError::EmptyTree);
        }
        self.warn_if_large(tree);
        Ok(theoretical_count(tree)?)
    }

    /// Score and rank all solutions with `mode` (or the configured default).
    ///
    /// The tree itself is not modified: goal weights are fitted and levels
    /// reassigned on a copy.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn run(
        &self,
        tree: &TreeModel,
        mode: Option<ScoringMode>,
    ) -> ApplicationResult<AnalysisReport> {
        let mode = mode.unwrap_or(self.settings.scoring_mode);
        if tree.is_empty() {
            return Err(ApplicationError::EmptyTree);
        }
        let (Some(ep), Some(ap)) = (tree.ep.as_ref(), tree.ap.as_ref()) else {
            return Err(ApplicationError::MissingMatrices);
        };
        if ep.cols() != ap.cols() {
            warn!(
                "EP has {} features but AP has {}; scoring uses the first {}",
                ep.cols(),
                ap.cols(),
                ep.cols().min(ap.cols())
            );
        }
        self.warn_if_large(tree);

        let mut work = tree.clone();
        let goals = ap.rows();
        let goal_weights_reset = work.goal_weights.as_ref().map(Vec::len) != Some(goals);
        if goal_weights_reset {
            info!("goal weights reset to 1 for {} goals", goals);
            work.goal_weights = Some(vec![1; goals]);
        }
        if mode == ScoringMode::DepthWeighted {
            assign_levels(&mut work);
        }

        let solutions = find_solutions_with(&work, mode)?;
        debug!("analysis produced {} solutions", solutions.len());
        Ok(AnalysisReport {
            theoretical_count: solutions.len(),
            solutions,
            mode,
            goal_weights_reset,
        })
    }

    fn warn_if_large(&self, tree: &TreeModel) {
        let leaves = tree.leaf_count();
        if leaves > self.settings.leaf_warning_threshold {
            warn!(
                "tree has {} leaves (threshold {}); enumeration may take long",
                leaves, self.settings.leaf_warning_threshold
            );
        }
    }
}
