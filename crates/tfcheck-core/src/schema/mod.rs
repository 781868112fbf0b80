//! Configuration model builder
//!
//! Turns a set of source files into [`Template`]s: one per base file, each
//! holding the resources it declares after every override file has been
//! folded in.
//!
//! # Override files
//!
//! `override.tf` and any `<base>_override.tf` are override files. Each
//! resource they declare replaces, attribute by attribute, the resource with
//! the same `(type, id)` declared in a base file. Attributes the override
//! leaves out are kept. Resources without a base counterpart are added to the
//! template of `<base>.tf`, or to a template of their own when there is no
//! such base file.
//!
//! # C4 Architecture Annotations
//! @c4-component Model Builder
//! @c4-container tfcheck Core
//! @c4-description Builds merged resource templates from source files
//! @c4-technology Rust (hcl-edit)
//! @c4-responsibility Parse every file and abort on the first syntax error
//! @c4-responsibility Merge override files into base templates
//! @c4-relationship "Provides model to" "Detector Framework"

pub(crate) mod loader;
pub mod resource;
pub mod token;
pub mod value;

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use serde_derive::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::eval::variables::VariableTable;
use loader::{parse_file, ParsedFile};

pub use resource::{Resource, Template};
pub use token::{Pos, SourceMapper, Token, TokenKind};
pub use value::{Attribute, Occurrence, Value};

/// Source files keyed by file name. Iteration order is lexical.
pub type SourceFiles = BTreeMap<String, String>;

const OVERRIDE_FILE: &str = "override.tf";
const OVERRIDE_SUFFIX: &str = "_override.tf";

/// Order in which override files are applied. Later files win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePrecedence {
    /// Plain lexical order of the file names
    #[default]
    Lexical,
    /// `override.tf` first, then `<base>_override.tf` files in lexical order
    SpecificLast,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub override_precedence: OverridePrecedence,
}

/// Everything the detectors need: merged templates and the variables
/// declared alongside them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub templates: Vec<Template>,
    pub variables: VariableTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FileRole {
    Base,
    /// Override file, with the base file it is tied to by name
    Override { base: Option<String> },
}

fn file_role(name: &str) -> FileRole {
    let file_name = Path::new(name).file_name().and_then(|n| n.to_str()).unwrap_or(name);

    if file_name == OVERRIDE_FILE {
        return FileRole::Override { base: None };
    }
    match name.strip_suffix(OVERRIDE_SUFFIX) {
        Some(stem) if !stem.is_empty() && !stem.ends_with('/') => {
            FileRole::Override { base: Some(format!("{}.tf", stem)) }
        }
        _ => FileRole::Base,
    }
}

/// Returns true if `name` follows the override file naming convention
pub fn is_override_file(name: &str) -> bool {
    matches!(file_role(name), FileRole::Override { .. })
}

/// Build the merged templates of a set of files.
pub fn make(files: &SourceFiles) -> Result<Vec<Template>, ParseError> {
    load(files, &BuildOptions::default()).map(|configuration| configuration.templates)
}

/// Build the merged templates and the variable table of a set of files.
pub fn load(files: &SourceFiles, options: &BuildOptions) -> Result<Configuration, ParseError> {
    let mut bases = Vec::new();
    let mut overrides = Vec::new();

    for (name, source) in files {
        let parsed = parse_file(name, source)?;
        match file_role(name) {
            FileRole::Base => bases.push(parsed),
            FileRole::Override { base } => overrides.push((base, parsed)),
        }
    }

    if options.override_precedence == OverridePrecedence::SpecificLast {
        // stable: lexical order is kept within each group
        overrides.sort_by_key(|(base, _)| base.is_some());
    }

    let mut variables = VariableTable::new();
    let mut templates: Vec<Template> = Vec::with_capacity(bases.len());
    for ParsedFile { name, resources, variables: declared } in bases {
        declared.into_iter().for_each(|v| variables.declare(v));
        templates.push(Template { file: name, resources });
    }

    for (base, ParsedFile { name, resources, variables: declared }) in overrides {
        declared.into_iter().for_each(|v| variables.declare(v));
        for resource in resources {
            apply_override(&mut templates, &name, base.as_deref(), resource);
        }
    }

    Ok(Configuration { templates, variables })
}

fn apply_override(
    templates: &mut Vec<Template>,
    override_file: &str,
    base: Option<&str>,
    resource: Resource,
) {
    let (resource_type, id) = (resource.resource_type.clone(), resource.id.clone());

    if let Some(target) = templates
        .iter_mut()
        .find_map(|template| template.find_mut(&resource_type, &id))
    {
        debug!("{}: overriding {}.{}", override_file, resource_type, id);
        target.override_with(resource);
        return;
    }

    let home = base
        .filter(|base| templates.iter().any(|t| t.file == *base))
        .unwrap_or(override_file);

    debug!("{}: adding {}.{} to {}", override_file, resource_type, id, home);
    match templates.iter_mut().find(|template| template.file == home) {
        Some(template) => template.resources.push(resource),
        None => {
            let mut template = Template::new(home);
            template.resources.push(resource);
            templates.push(template);
        }
    }
}

#[cfg(test)]
mod tests;
