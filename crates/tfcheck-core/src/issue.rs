//! Issues reported by detectors

use serde_derive::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::detector::DetectorId;
use crate::schema::Pos;

/// Severity of an issue
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum IssueType {
    Error,
    Warning,
    Notice,
}

/// One finding, located at a file and line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub detector: DetectorId,
}

impl Issue {
    pub fn is_error(&self) -> bool {
        self.issue_type == IssueType::Error
    }
}

/// Append-only collector handed to a detector.
///
/// Stamps the running detector's id and severity on every issue it emits.
pub struct IssueSink<'a> {
    issues: &'a mut Vec<Issue>,
    detector: &'a DetectorId,
    severity: IssueType,
}

impl<'a> IssueSink<'a> {
    pub fn new(issues: &'a mut Vec<Issue>, detector: &'a DetectorId, severity: IssueType) -> Self {
        Self { issues, detector, severity }
    }

    pub fn emit(&mut self, pos: &Pos, message: impl Into<String>) {
        self.issues.push(Issue {
            issue_type: self.severity,
            message: message.into(),
            file: pos.filename.clone(),
            line: pos.line,
            column: pos.column,
            detector: self.detector.clone(),
        });
    }
}
