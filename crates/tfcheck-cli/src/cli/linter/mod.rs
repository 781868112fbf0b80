//! Linter for Terraform configurations
//!
//! # C4 Architecture Annotations
//! @c4-component Linter Engine
//! @c4-container tfcheck-cli
//! @c4-description Loads sources, variables and cloud state, then runs the detectors
//! @c4-technology Rust
//! @c4-uses WorkspaceLoader "Reads .tf files"
//! @c4-uses Formatter "Formats results"
//! @c4-tags validation,linter

pub mod config;
pub mod error;
pub mod formatter;
pub mod workspace;

pub use config::LinterConfig;
pub use error::LinterError;
pub use formatter::Format;

use std::io::{self, Write};

use log::{error, warn};
use tfcheck_core::cloud::SnapshotClient;
use tfcheck_core::eval::Evaluator;
use tfcheck_core::schema;
use tfcheck_core::{BuildOptions, DetectorContext, DetectorId, DetectorRegistry, RunOptions, RunReport};

use crate::cli::LintCommand;

/// Exit status when issues were found and `--error-with-issues` is set
pub const EXIT_ISSUES_FOUND: i32 = 2;

pub struct Linter {
    config: LinterConfig,
}

impl Linter {
    pub fn new(config: &LinterConfig) -> Self {
        Self { config: config.clone() }
    }

    pub fn lint(&self) -> Result<RunReport, LinterError> {
        let config = &self.config;

        let files = workspace::load_sources(&config.dir)?;
        let options = BuildOptions { override_precedence: config.override_precedence };
        let mut configuration = schema::load(&files, &options)?;

        for path in &config.var_files {
            let content = workspace::read_file(path)?;
            configuration
                .variables
                .load_var_file(&workspace::display_name(&config.dir, path), &content)?;
        }
        for (name, value) in &config.cli_vars {
            configuration.variables.assign(name.as_str(), value);
        }

        let cloud = match &config.cloud_state {
            Some(path) => match SnapshotClient::from_file(path) {
                Ok(client) => Some(client),
                Err(e) => {
                    error!("{}", e);
                    None
                }
            },
            None => None,
        };

        let mut context = DetectorContext::new(Evaluator::new(&configuration.variables));
        if let Some(client) = &cloud {
            context = context.with_cloud(client);
        }

        let mut registry = DetectorRegistry::with_defaults();
        let run_options = RunOptions {
            deep_check: config.deep_check,
            ignored: config.ignore_rules.iter().map(|rule| ignored_id(&registry, rule)).collect(),
        };

        Ok(registry.run(&configuration.templates, &context, &run_options))
    }
}

fn ignored_id(registry: &DetectorRegistry, rule: &str) -> DetectorId {
    let id = DetectorId::parse(rule);
    if !registry.detectors().any(|detector| detector.id() == id) {
        warn!("ignored rule '{}' does not match any detector", rule);
    }
    id
}

/// Run `tfcheck lint` and return the process exit status
pub fn run_lint(cmd: &LintCommand) -> Result<i32, LinterError> {
    let config = LinterConfig::from_command(cmd)?;
    let linter = Linter::new(&config);
    let report = linter.lint()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    formatter::get_formatter(config.format).format(&report, &mut out)?;
    out.flush()?;

    if config.error_with_issues && !report.issues.is_empty() {
        return Ok(EXIT_ISSUES_FOUND);
    }
    Ok(0)
}

/// Print the built-in detectors
pub fn print_rules() {
    let registry = DetectorRegistry::with_defaults();
    for detector in registry.detectors() {
        let id = detector.id();
        let description = match &id {
            DetectorId::Builtin(builtin) => builtin.description(),
            DetectorId::Custom(_) => "",
        };
        println!(
            "{:<44} {:<30} {:<8} {:<5} {}",
            id.to_string(),
            detector.target_resource_type(),
            detector.severity().to_string(),
            if detector.requires_deep_check() { "deep" } else { "" },
            description
        );
    }
}
