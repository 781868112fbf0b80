//! Static checks for Terraform configurations.
//!
//! The pipeline is: [`schema::load`] builds merged resource templates and a
//! variable table from a set of source files, an [`eval::Evaluator`] resolves
//! attribute values through that table, and a [`detector::DetectorRegistry`]
//! runs every registered [`detector::Detector`] against the templates.

pub mod cloud;
pub mod detector;
pub mod errors;
pub mod eval;
pub mod issue;
pub mod schema;

#[cfg(test)]
mod tests;

pub use detector::{Detector, DetectorContext, DetectorId, DetectorRegistry, DetectorState, RunOptions, RunReport};
pub use errors::{ExternalStateError, ParseError, UnresolvableReference};
pub use issue::{Issue, IssueType};
pub use schema::{BuildOptions, Configuration, OverridePrecedence, SourceFiles};
