//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::{NodeType, ScoringMode};

/// Tree method analysis: AND/OR decomposition, realization enumeration and ranking
#[derive(Parser, Debug)]
#[command(name = "treemethod")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project file (default: settings.project_file)
    #[arg(short, long, global = true, env = "TREEMETHOD_PROJECT", value_hint = ValueHint::FilePath)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project with an AND root "System"
    Init {
        /// Overwrite an existing project
        #[arg(short, long)]
        force: bool,
    },

    /// Show the tree with types, ids and levels
    Show,

    /// Edit nodes
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Assign levels by depth (manual levels are kept)
    Levels,

    /// Edit the EP/AP matrices, goal weights and labels
    Matrix {
        #[command(subcommand)]
        command: MatrixCommands,
    },

    /// Report structural and matrix inconsistencies
    Check,

    /// Print the number of realizations |RT|
    Count,

    /// Rank all realizations by score
    Solve {
        /// Scoring mode: depth-weighted | unweighted
        #[arg(short, long)]
        mode: Option<ScoringMode>,
        /// Show only the best N solutions
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Add a child node
    Add {
        /// Parent node id
        parent: u32,
        /// Node name
        name: String,
        /// Node type
        #[arg(short = 't', long = "type", value_enum, default_value_t = NodeTypeArg::Leaf)]
        node_type: NodeTypeArg,
    },

    /// Remove a node with its whole subtree
    Remove {
        /// Node id
        id: u32,
    },

    /// Rename a node
    Rename {
        /// Node id
        id: u32,
        /// New name
        name: String,
    },

    /// Change the type of a node
    Retype {
        /// Node id
        id: u32,
        /// New type
        #[arg(value_enum)]
        node_type: NodeTypeArg,
    },

    /// Pin a node's level (or release it with --clear)
    Level {
        /// Node id
        id: u32,
        /// Manual level
        #[arg(required_unless_present = "clear", allow_negative_numbers = true)]
        level: Option<i32>,
        /// Return to automatic level assignment
        #[arg(long, conflicts_with = "level")]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum MatrixCommands {
    /// Set the number of features (columns) and goals (AP rows)
    Resize {
        /// Number of features
        features: usize,
        /// Number of goals
        goals: usize,
    },

    /// Set an EP cell for a node
    SetEp {
        /// Node id
        node: u32,
        /// Feature index
        feature: usize,
        /// Value in -1..=1
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },

    /// Set an AP cell
    SetAp {
        /// Goal index
        goal: usize,
        /// Feature index
        feature: usize,
        /// Value in -1..=1
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },

    /// Set a goal weight
    Weight {
        /// Goal index
        goal: usize,
        #[arg(allow_negative_numbers = true)]
        weight: i32,
    },

    /// Rename a feature
    Feature {
        /// Feature index
        index: usize,
        name: String,
    },

    /// Rename a goal
    Goal {
        /// Goal index
        index: usize,
        name: String,
    },

    /// Print the matrices
    Show,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

/// Node type as given on the command line.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeTypeArg {
    And,
    Or,
    Leaf,
}

impl From<NodeTypeArg> for NodeType {
    fn from(arg: NodeTypeArg) -> Self {
        match arg {
            NodeTypeArg::And => NodeType::And,
            NodeTypeArg::Or => NodeType::Or,
            NodeTypeArg::Leaf => NodeType::Leaf,
        }
    }
}
