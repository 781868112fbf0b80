//! Output formatting for lint reports

use std::collections::BTreeMap;
use std::io::{self, Write};

use clap::ValueEnum;
use colored::Colorize;
use serde_derive::Deserialize;
use tfcheck_core::{Issue, IssueType, RunReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Stylish,
    Compact,
    Json,
}

pub trait OutputFormatter {
    fn format(&self, report: &RunReport, out: &mut dyn Write) -> io::Result<()>;
}

pub fn get_formatter(format: Format) -> Box<dyn OutputFormatter> {
    match format {
        Format::Stylish => Box::new(StylishFormatter),
        Format::Compact => Box::new(CompactFormatter),
        Format::Json => Box::new(JsonFormatter),
    }
}

fn label(issue_type: IssueType) -> &'static str {
    match issue_type {
        IssueType::Error => "error",
        IssueType::Warning => "warning",
        IssueType::Notice => "notice",
    }
}

fn location_file(issue: &Issue) -> &str {
    if issue.file.is_empty() {
        "<unknown>"
    } else {
        &issue.file
    }
}

struct StylishFormatter;

impl OutputFormatter for StylishFormatter {
    fn format(&self, report: &RunReport, out: &mut dyn Write) -> io::Result<()> {
        if report.issues.is_empty() {
            return writeln!(out, "{}", "✓ No issues found!".green());
        }

        let mut by_file: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
        for issue in &report.issues {
            by_file.entry(location_file(issue)).or_default().push(issue);
        }

        for (file, issues) in by_file {
            writeln!(out, "{}", file.underline())?;
            for issue in issues {
                let severity = match issue.issue_type {
                    IssueType::Error => label(issue.issue_type).red().bold(),
                    IssueType::Warning => label(issue.issue_type).yellow().bold(),
                    IssueType::Notice => label(issue.issue_type).blue().bold(),
                };
                writeln!(
                    out,
                    "  {}  {}  {}  {}",
                    format!("{}:{}", issue.line, issue.column).dimmed(),
                    severity,
                    issue.message,
                    issue.detector.as_str().dimmed()
                )?;
            }
            writeln!(out)?;
        }

        let count = |t: IssueType| report.issues.iter().filter(|i| i.issue_type == t).count();
        writeln!(
            out,
            "{}",
            format!(
                "Found {} issue(s): {} error(s), {} warning(s), {} notice(s)",
                report.issues.len(),
                count(IssueType::Error),
                count(IssueType::Warning),
                count(IssueType::Notice)
            )
            .red()
            .bold()
        )
    }
}

struct CompactFormatter;

impl OutputFormatter for CompactFormatter {
    fn format(&self, report: &RunReport, out: &mut dyn Write) -> io::Result<()> {
        for issue in &report.issues {
            writeln!(
                out,
                "{}:{}:{}: {}: {} ({})",
                location_file(issue),
                issue.line,
                issue.column,
                label(issue.issue_type),
                issue.message,
                issue.detector
            )?;
        }
        Ok(())
    }
}

struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, out: &mut dyn Write) -> io::Result<()> {
        let output = serde_json::json!({
            "issues": report.issues,
            "detectors": report.states.iter().map(|(id, state)| {
                serde_json::json!({
                    "id": id,
                    "state": state,
                })
            }).collect::<Vec<_>>(),
        });

        let json = serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string());
        writeln!(out, "{}", json)
    }
}
