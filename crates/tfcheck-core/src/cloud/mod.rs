//! Access to live cloud-provider state
//!
//! Deep-check detectors compare configuration values against what actually
//! exists in the account. The [`CloudStateClient`] trait is the only seam
//! between the linter and the provider; [`SnapshotClient`] serves a state
//! snapshot exported to a JSON file.
//!
//! # C4 Architecture Annotations
//! @c4-component Cloud State Client
//! @c4-container tfcheck Core
//! @c4-description Lists existing subnets and security groups
//! @c4-technology Rust (serde_json)

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde_derive::Deserialize;

use crate::errors::ExternalStateError;

pub trait CloudStateClient {
    /// Ids of every security group in the account
    fn describe_security_groups(&self) -> Result<Vec<String>, ExternalStateError>;

    /// Ids of every subnet in the account
    fn describe_subnets(&self) -> Result<Vec<String>, ExternalStateError>;
}

/// Account state as exported to disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub security_groups: Vec<String>,
    pub subnets: Vec<String>,
}

/// Serves state from a JSON document:
///
/// ```json
/// { "security_groups": ["sg-1234abcd"], "subnets": ["subnet-1234abcd"] }
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    path: PathBuf,
    snapshot: Snapshot,
}

impl SnapshotClient {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExternalStateError> {
        let path = path.as_ref().to_path_buf();
        debug!("reading cloud state snapshot from {}", path.display());

        let content = fs::read_to_string(&path)
            .map_err(|source| ExternalStateError::Io { path: path.clone(), source })?;
        let snapshot = serde_json::from_str(&content)
            .map_err(|source| ExternalStateError::Decode { path: path.clone(), source })?;

        Ok(Self { path, snapshot })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { path: PathBuf::new(), snapshot }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CloudStateClient for SnapshotClient {
    fn describe_security_groups(&self) -> Result<Vec<String>, ExternalStateError> {
        Ok(self.snapshot.security_groups.clone())
    }

    fn describe_subnets(&self) -> Result<Vec<String>, ExternalStateError> {
        Ok(self.snapshot.subnets.clone())
    }
}
