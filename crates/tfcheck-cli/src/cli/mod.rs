use clap::{Parser, Subcommand};
use log::{error, LevelFilter};
use std::path::PathBuf;
use std::process;

pub mod linter;

use linter::{Format, LinterError};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Check the Terraform configuration of a directory
    #[clap(name = "lint", bin_name = "lint")]
    Lint(LintCommand),
    /// List the available detectors
    #[clap(name = "rules", bin_name = "rules")]
    Rules,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct LintCommand {
    /// Directory holding the configuration files
    #[arg(default_value = ".")]
    pub dir: PathBuf,
    /// Run detectors that query live cloud state
    #[arg(long = "deep")]
    pub deep: bool,
    /// Output format
    #[arg(long = "format", short = 'f', value_enum)]
    pub format: Option<Format>,
    /// Variable definitions file (repeatable, later files win)
    #[arg(long = "var-file")]
    pub var_files: Vec<PathBuf>,
    /// Set a variable (NAME=VALUE), overriding variable files
    #[arg(long = "var", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,
    /// JSON snapshot of the account state used by deep checks
    #[arg(long = "cloud-state")]
    pub cloud_state: Option<PathBuf>,
    /// Detector to skip (repeatable)
    #[arg(long = "ignore-rule")]
    pub ignore_rules: Vec<String>,
    /// Configuration file (defaults to .tfcheck.yml in DIR)
    #[arg(long = "config", short = 'c')]
    pub config: Option<PathBuf>,
    /// Exit with status 2 when issues are found
    #[arg(long = "error-with-issues")]
    pub error_with_issues: bool,
    /// Enable debug logging
    #[arg(long = "debug")]
    pub debug: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid variable assignment '{}', expected NAME=VALUE", s)),
    }
}

fn setup_logger(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.format_timestamp(None).try_init();
}

pub fn main() {
    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => e.exit(),
    };

    let debug = matches!(&opts.command, Command::Lint(cmd) if cmd.debug);
    setup_logger(debug);

    match handle_command(opts) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn handle_command(opts: Opts) -> Result<i32, LinterError> {
    match opts.command {
        Command::Lint(cmd) => linter::run_lint(&cmd),
        Command::Rules => {
            linter::print_rules();
            Ok(0)
        }
    }
}
