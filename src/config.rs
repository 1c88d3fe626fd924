//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treemethod/treemethod.toml`
//! 3. Local config: `<dir>/.treemethod.toml`
//! 4. Environment variables: `TREEMETHOD_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::ScoringMode;

/// Default file name of a project.
pub const DEFAULT_PROJECT_FILE: &str = "project.json";

/// Leaf count above which an analysis logs a warning.
pub const DEFAULT_LEAF_WARNING_THRESHOLD: usize = 20;

/// Unified configuration for treemethod.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Project file used when `--project` is not given
    pub project_file: PathBuf,
    /// Scoring mode used when `--mode` is not given
    pub scoring_mode: ScoringMode,
    /// Warn before enumerating trees with more leaves than this
    pub leaf_warning_threshold: usize,
    /// Show only the best N solutions (all when unset)
    pub top: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_file: PathBuf::from(DEFAULT_PROJECT_FILE),
            scoring_mode: ScoringMode::default(),
            leaf_warning_threshold: DEFAULT_LEAF_WARNING_THRESHOLD,
            top: None,
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub project_file: Option<PathBuf>,
    pub scoring_mode: Option<ScoringMode>,
    pub leaf_warning_threshold: Option<usize>,
    pub top: Option<usize>,
}

/// Get the XDG config directory for treemethod.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treemethod").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treemethod.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treemethod.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path; unexpandable input is kept as is.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.project_file = expand_path(&self.project_file);
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            project_file: overlay
                .project_file
                .clone()
                .unwrap_or_else(|| self.project_file.clone()),
            scoring_mode: overlay.scoring_mode.unwrap_or(self.scoring_mode),
            leaf_warning_threshold: overlay
                .leaf_warning_threshold
                .unwrap_or(self.leaf_warning_threshold),
            top: overlay.top.or(self.top),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.treemethod.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply TREEMETHOD_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TREEMETHOD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("project_file") {
            settings.project_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("scoring_mode") {
            settings.scoring_mode = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_int("leaf_warning_threshold") {
            settings.leaf_warning_threshold =
                usize::try_from(val).map_err(|e| ApplicationError::Config {
                    message: format!("leaf_warning_threshold: {e}"),
                })?;
        }
        if let Ok(val) = config.get_int("top") {
            settings.top = usize::try_from(val).ok();
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treemethod configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treemethod/treemethod.toml
#   Local:  ./.treemethod.toml
#   Env:    TREEMETHOD_* environment variables

# Project file used when --project is not given
# project_file = "project.json"

# Scoring mode: "depth-weighted" (nodes at level l count 1/(1+l)) or "unweighted"
# scoring_mode = "depth-weighted"

# Warn before enumerating trees with more leaves than this
# leaf_warning_threshold = 20

# Only print the best N solutions
# top = 10
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
