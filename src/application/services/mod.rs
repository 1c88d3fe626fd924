//! Application services

pub mod analysis;
pub mod project;

pub use analysis::{AnalysisReport, AnalysisService};
pub use project::{ProjectFile, ProjectNode, ProjectService};
