//! Linter configuration
//!
//! Settings come from an optional `.tfcheck.yml` file and from the command
//! line. Flags that take a single value override the file; repeatable flags
//! extend it.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde_derive::Deserialize;
use tfcheck_core::OverridePrecedence;

use super::error::LinterError;
use super::formatter::Format;
use crate::cli::LintCommand;

pub const DEFAULT_CONFIG_FILE: &str = ".tfcheck.yml";

/// Configuration file structure (.tfcheck.yml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub deep_check: bool,
    /// Detector ids to skip
    pub ignore_rules: Vec<String>,
    /// Variable files, relative to the configuration file
    pub var_files: Vec<PathBuf>,
    /// Cloud state snapshot, relative to the configuration file
    pub cloud_state: Option<PathBuf>,
    pub override_precedence: Option<OverridePrecedence>,
    pub format: Option<Format>,
}

impl ConfigFile {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, LinterError> {
        let content = fs::read_to_string(path)
            .map_err(|source| LinterError::ReadFile { path: path.to_path_buf(), source })?;

        let mut config: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yml::from_str(&content).map_err(|e| LinterError::InvalidConfig {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.var_files = config.var_files.iter().map(|p| base.join(p)).collect();
        config.cloud_state = config.cloud_state.map(|p| base.join(p));
        Ok(config)
    }

    /// Load the file given explicitly, or `.tfcheck.yml` in `dir` if present
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Option<Self>, LinterError> {
        if let Some(path) = explicit {
            return Self::from_file(path).map(Some);
        }

        let default = dir.join(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            debug!("using configuration file {}", default.display());
            return Self::from_file(&default).map(Some);
        }
        Ok(None)
    }
}

/// Effective settings of a lint run
#[derive(Clone, Debug, PartialEq)]
pub struct LinterConfig {
    pub dir: PathBuf,
    pub deep_check: bool,
    pub ignore_rules: Vec<String>,
    pub var_files: Vec<PathBuf>,
    pub cli_vars: Vec<(String, String)>,
    pub cloud_state: Option<PathBuf>,
    pub override_precedence: OverridePrecedence,
    pub format: Format,
    pub error_with_issues: bool,
}

impl LinterConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            deep_check: false,
            ignore_rules: Vec::new(),
            var_files: Vec::new(),
            cli_vars: Vec::new(),
            cloud_state: None,
            override_precedence: OverridePrecedence::default(),
            format: Format::Stylish,
            error_with_issues: false,
        }
    }

    /// Merge the configuration file (if any) with command line arguments
    pub fn from_command(cmd: &LintCommand) -> Result<Self, LinterError> {
        let file = ConfigFile::load(cmd.config.as_deref(), &cmd.dir)?.unwrap_or_default();
        Ok(Self::merge(file, cmd))
    }

    fn merge(file: ConfigFile, cmd: &LintCommand) -> Self {
        let mut config = Self::new(&cmd.dir);

        config.deep_check = file.deep_check || cmd.deep;
        config.ignore_rules = file.ignore_rules;
        config.ignore_rules.extend(cmd.ignore_rules.iter().cloned());
        config.var_files = file.var_files;
        config.var_files.extend(cmd.var_files.iter().cloned());
        config.cli_vars = cmd.vars.clone();
        config.cloud_state = cmd.cloud_state.clone().or(file.cloud_state);
        config.override_precedence = file.override_precedence.unwrap_or_default();
        config.format = cmd.format.or(file.format).unwrap_or(Format::Stylish);
        config.error_with_issues = cmd.error_with_issues;
        config
    }
}
