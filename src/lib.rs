//! treemethod: AND/OR decomposition trees, realization enumeration and
//! rational-solution ranking.
//!
//! Layers, innermost first:
//! - [`domain`]: tree model, combination generator, scorer, levels, validation
//! - [`application`]: project persistence and analysis services
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: command line interface

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
