//! Source discovery
//!
//! # C4 Architecture Annotations
//! @c4-component WorkspaceLoader
//! @c4-container Lint Command
//! @c4-description Collects the `.tf` files of a directory
//! @c4-technology Rust
//! @c4-relationship "Provides sources to" "Linter Engine"

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use tfcheck_core::SourceFiles;

use super::error::LinterError;

const SOURCE_EXTENSION: &str = "tf";

/// Read every `*.tf` file directly inside `dir`, keyed by file name.
///
/// Subdirectories are modules of their own and are not descended into.
pub fn load_sources(dir: &Path) -> Result<SourceFiles, LinterError> {
    let entries = fs::read_dir(dir)
        .map_err(|source| LinterError::ReadDir { path: dir.to_path_buf(), source })?;

    let mut files = SourceFiles::new();
    for entry in entries {
        let entry = entry.map_err(|source| LinterError::ReadDir { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };

        debug!("loading {}", path.display());
        files.insert(name, read_file(&path)?);
    }
    Ok(files)
}

pub fn read_file(path: &Path) -> Result<String, LinterError> {
    fs::read_to_string(path).map_err(|source| LinterError::ReadFile { path: path.to_path_buf(), source })
}

/// Display name of a file relative to the linted directory when possible
pub fn display_name(dir: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(dir).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf());
    relative.to_string_lossy().into_owned()
}
