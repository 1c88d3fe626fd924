//! Command dispatch: loads the project, calls the services, prints results.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, MatrixCommands, NodeCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{render_matrix, TreeRender};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    assign_levels, ensure_tree_structure, validate, NodeId, ScoringMode, TreeModel,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Load settings from the working directory and run the selected command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("get current dir", e))?;
    let settings = Settings::load(Some(&cwd))?;
    let container = ServiceContainer::new(settings);
    run(cli, &container)
}

/// Run the selected command against an already wired container.
pub fn run(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let project = project_path(cli, container);
    debug!("project file: {}", project.display());

    match &cli.command {
        Some(Commands::Init { force }) => cmd_init(container, &project, *force),
        Some(Commands::Show) => cmd_show(container, &project),
        Some(Commands::Node { command }) => cmd_node(container, &project, command),
        Some(Commands::Levels) => cmd_levels(container, &project),
        Some(Commands::Matrix { command }) => cmd_matrix(container, &project, command),
        Some(Commands::Check) => cmd_check(container, &project),
        Some(Commands::Count) => cmd_count(container, &project),
        Some(Commands::Solve { mode, top }) => cmd_solve(container, &project, *mode, *top),
        Some(Commands::Config { command }) => cmd_config(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn project_path(cli: &Cli, container: &ServiceContainer) -> PathBuf {
    cli.project
        .clone()
        .unwrap_or_else(|| container.settings.project_file.clone())
}

#[instrument(level = "debug", skip(container))]
fn cmd_init(container: &ServiceContainer, project: &Path, force: bool) -> CliResult<()> {
    if container.fs.exists(project) && !force {
        return Err(CliError::Usage(format!(
            "{} already exists (use --force to overwrite)",
            project.display()
        )));
    }
    container
        .project
        .save(&TreeModel::new_project(), project)?;
    output::success(&format!("Created {}", project.display()));
    Ok(())
}

fn cmd_show(container: &ServiceContainer, project: &Path) -> CliResult<()> {
    let tree = container.project.load(project)?;
    output::info(&tree.to_termtree());
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_node(container: &ServiceContainer, project: &Path, command: &NodeCommands) -> CliResult<()> {
    let mut tree = container.project.load(project)?;
    match command {
        NodeCommands::Add {
            parent,
            name,
            node_type,
        } => {
            let id = tree.add_node(NodeId(*parent), name, (*node_type).into())?;
            output::action("Added", &format!("{} (#{}) under #{}", name.trim(), id, parent));
        }
        NodeCommands::Remove { id } => {
            let removed = tree.remove_node(NodeId(*id))?;
            output::action("Removed", &format!("{} node(s)", removed.len()));
        }
        NodeCommands::Rename { id, name } => {
            tree.rename_node(NodeId(*id), name)?;
            output::action("Renamed", &format!("#{} to {}", id, name.trim()));
        }
        NodeCommands::Retype { id, node_type } => {
            tree.set_node_type(NodeId(*id), (*node_type).into())?;
            output::action("Retyped", &format!("#{} to {:?}", id, node_type));
        }
        NodeCommands::Level { id, level, clear } => {
            if *clear {
                tree.clear_manual_level(NodeId(*id))?;
                output::action("Level", &format!("#{} back to automatic", id));
            } else {
                let level = level.ok_or_else(|| {
                    CliError::InvalidArgs("a level or --clear is required".to_string())
                })?;
                tree.set_level(NodeId(*id), level, true)?;
                output::action("Level", &format!("#{} pinned to {}", id, level));
            }
        }
    }
    container.project.save(&tree, project)?;
    Ok(())
}

fn cmd_levels(container: &ServiceContainer, project: &Path) -> CliResult<()> {
    let mut tree = container.project.load(project)?;
    assign_levels(&mut tree);
    container.project.save(&tree, project)?;
    output::info(&tree.to_termtree());
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_matrix(
    container: &ServiceContainer,
    project: &Path,
    command: &MatrixCommands,
) -> CliResult<()> {
    let mut tree = container.project.load(project)?;
    match command {
        MatrixCommands::Resize { features, goals } => {
            tree.resize_matrices(*features, *goals);
            output::action(
                "Resized",
                &format!("{} features, {} goals", features, goals),
            );
        }
        MatrixCommands::SetEp {
            node,
            feature,
            value,
        } => tree.set_ep_value(NodeId(*node), *feature, *value)?,
        MatrixCommands::SetAp {
            goal,
            feature,
            value,
        } => tree.set_ap_value(*goal, *feature, *value)?,
        MatrixCommands::Weight { goal, weight } => tree.set_goal_weight(*goal, *weight)?,
        MatrixCommands::Feature { index, name } => tree.rename_feature(*index, name)?,
        MatrixCommands::Goal { index, name } => tree.rename_goal(*index, name)?,
        MatrixCommands::Show => {
            print_matrices(&tree);
            return Ok(());
        }
    }
    container.project.save(&tree, project)?;
    Ok(())
}

fn print_matrices(tree: &TreeModel) {
    match &tree.ep {
        Some(ep) => {
            let rows: Vec<String> = tree.non_root_nodes().iter().map(|n| n.name.clone()).collect();
            output::header("EP");
            output::info(&render_matrix(ep, &rows, &tree.feature_names));
        }
        None => output::warning("EP matrix is not defined"),
    }
    match &tree.ap {
        Some(ap) => {
            output::header("AP");
            output::info(&render_matrix(ap, &tree.goal_names, &tree.feature_names));
        }
        None => output::warning("AP matrix is not defined"),
    }
    if let Some(weights) = &tree.goal_weights {
        output::header("Goal weights");
        for (i, weight) in weights.iter().enumerate() {
            let name = tree.goal_names.get(i).map(String::as_str).unwrap_or("?");
            output::detail(&format!("{name}: {weight}"));
        }
    }
}

fn cmd_check(container: &ServiceContainer, project: &Path) -> CliResult<()> {
    let tree = container.project.load(project)?;
    let issues = validate(&tree);
    if issues.is_empty() {
        output::success("No issues found");
        return Ok(());
    }
    for issue in &issues {
        output::failure(issue);
    }
    ensure_tree_structure(&tree)?;
    output::warning(&format!("{} issue(s)", issues.len()));
    Ok(())
}

fn cmd_count(container: &ServiceContainer, project: &Path) -> CliResult<()> {
    let tree = container.project.load(project)?;
    let count = container.analysis.count(&tree)?;
    output::info(&count);
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_solve(
    container: &ServiceContainer,
    project: &Path,
    mode: Option<ScoringMode>,
    top: Option<usize>,
) -> CliResult<()> {
    let tree = container.project.load(project)?;
    let report = container.analysis.run(&tree, mode)?;
    if report.goal_weights_reset {
        output::warning("goal weights did not match the goals and were reset to 1");
    }

    output::header(&format!(
        "|RT| = {}  ({} scoring)",
        report.theoretical_count, report.mode
    ));
    let limit = top
        .or(container.settings.top)
        .unwrap_or(report.solutions.len());
    for (rank, solution) in report.solutions.iter().take(limit).enumerate() {
        output::solution(rank + 1, &solution.elements, solution.score);
    }
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory available"),
            }
            let cwd = std::env::current_dir().map_err(|e| InfraError::io("get current dir", e))?;
            output::action("local", &local_config_path(&cwd).display());
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("no global config directory available".to_string())
                })?
            } else {
                let cwd =
                    std::env::current_dir().map_err(|e| InfraError::io("get current dir", e))?;
                local_config_path(&cwd)
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "{} already exists",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create {}", path.display()), e))?;
            container
                .fs
                .write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(())
}
