//! Detector framework
//!
//! A [`Detector`] targets one resource type. The [`DetectorRegistry`] runs
//! every registered detector against the merged templates, in registration
//! order, and records what happened to each one in a [`RunReport`].
//!
//! A detector whose pre-processing fails is disabled for the rest of the
//! run: it reports nothing, and the other detectors are unaffected.
//!
//! # C4 Architecture Annotations
//! @c4-component Detector Framework
//! @c4-container tfcheck Core
//! @c4-description Dispatches resources to the detectors that target them
//! @c4-technology Rust
//! @c4-uses Expression Evaluator "Resolves attribute values"
//! @c4-uses Cloud State Client "Deep checks"
//! @c4-responsibility Skip ignored and deep-only detectors
//! @c4-responsibility Disable detectors whose pre-processing fails

pub mod rule_id;
pub mod rules;

use std::collections::HashSet;

use log::{debug, error};
use serde_derive::Serialize;

use crate::cloud::CloudStateClient;
use crate::errors::ExternalStateError;
use crate::eval::Evaluator;
use crate::issue::{Issue, IssueSink, IssueType};
use crate::schema::{Resource, Template};

pub use rule_id::{BuiltinDetector, DetectorId};

/// Everything a detector may consult besides the resource itself
pub struct DetectorContext<'a> {
    pub evaluator: Evaluator<'a>,
    pub cloud: Option<&'a dyn CloudStateClient>,
}

impl<'a> DetectorContext<'a> {
    pub fn new(evaluator: Evaluator<'a>) -> Self {
        Self { evaluator, cloud: None }
    }

    pub fn with_cloud(mut self, cloud: &'a dyn CloudStateClient) -> Self {
        self.cloud = Some(cloud);
        self
    }

    /// The cloud client, or [`ExternalStateError::Unavailable`]
    pub fn cloud(&self) -> Result<&'a dyn CloudStateClient, ExternalStateError> {
        self.cloud.ok_or(ExternalStateError::Unavailable)
    }
}

pub trait Detector {
    fn id(&self) -> DetectorId;

    /// Resource type this detector inspects
    fn target_resource_type(&self) -> &str;

    fn severity(&self) -> IssueType;

    /// Whether the detector needs live cloud state
    fn requires_deep_check(&self) -> bool {
        false
    }

    /// Runs once before any resource is visited.
    fn pre_process(&mut self, _context: &DetectorContext) -> Result<(), ExternalStateError> {
        Ok(())
    }

    fn detect(&self, resource: &Resource, context: &DetectorContext, issues: &mut IssueSink);
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub deep_check: bool,
    pub ignored: HashSet<DetectorId>,
}

impl RunOptions {
    pub fn deep(mut self, deep_check: bool) -> Self {
        self.deep_check = deep_check;
        self
    }

    pub fn ignore(mut self, id: impl Into<DetectorId>) -> Self {
        self.ignored.insert(id.into());
        self
    }
}

/// Lifecycle of a detector during one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum DetectorState {
    Unstarted,
    Skipped(String),
    PreProcessed,
    PreProcessFailed(String),
    Done,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub issues: Vec<Issue>,
    /// Final state of each registered detector, in registration order
    pub states: Vec<(DetectorId, DetectorState)>,
}

impl RunReport {
    pub fn state_of(&self, id: &DetectorId) -> Option<&DetectorState> {
        self.states.iter().find(|(detector, _)| detector == id).map(|(_, state)| state)
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }
}

#[derive(Default)]
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
    states: Vec<DetectorState>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in detector
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for detector in rules::builtin_detectors() {
            registry.register(detector);
        }
        registry
    }

    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
        self.states.push(DetectorState::Unstarted);
    }

    pub fn detectors(&self) -> impl Iterator<Item = &dyn Detector> {
        self.detectors.iter().map(|d| d.as_ref())
    }

    /// Current state of each detector, in registration order
    pub fn states(&self) -> impl Iterator<Item = (DetectorId, &DetectorState)> {
        self.detectors.iter().map(|d| d.id()).zip(self.states.iter())
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Pre-process every detector, then run the survivors over `templates`.
    pub fn run(
        &mut self,
        templates: &[Template],
        context: &DetectorContext,
        options: &RunOptions,
    ) -> RunReport {
        self.states.iter_mut().for_each(|state| *state = DetectorState::Unstarted);
        self.pre_process(context, options);
        let issues = self.detect(templates, context);

        RunReport {
            issues,
            states: self.states().map(|(id, state)| (id, state.clone())).collect(),
        }
    }

    /// Skip or pre-process every detector that has not started yet
    pub fn pre_process(&mut self, context: &DetectorContext, options: &RunOptions) {
        for (detector, state) in self.detectors.iter_mut().zip(self.states.iter_mut()) {
            if *state == DetectorState::Unstarted {
                *state = pre_process_detector(detector.as_mut(), context, options);
            }
        }
    }

    /// Visit the matching resources with every pre-processed detector.
    ///
    /// Issues come out in detector order, then resource order.
    pub fn detect(&mut self, templates: &[Template], context: &DetectorContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (detector, state) in self.detectors.iter().zip(self.states.iter_mut()) {
            if *state != DetectorState::PreProcessed {
                continue;
            }

            let id = detector.id();
            let mut sink = IssueSink::new(&mut issues, &id, detector.severity());
            for template in templates {
                for resource in template.resources_of_type(detector.target_resource_type()) {
                    detector.detect(resource, context, &mut sink);
                }
            }
            *state = DetectorState::Done;
        }
        issues
    }
}

fn pre_process_detector(
    detector: &mut dyn Detector,
    context: &DetectorContext,
    options: &RunOptions,
) -> DetectorState {
    let id = detector.id();
    if options.ignored.contains(&id) {
        debug!("{}: ignored", id);
        return DetectorState::Skipped("ignored by configuration".to_string());
    }
    if detector.requires_deep_check() && !options.deep_check {
        debug!("{}: deep check disabled", id);
        return DetectorState::Skipped("requires deep check".to_string());
    }

    match detector.pre_process(context) {
        Ok(()) => DetectorState::PreProcessed,
        Err(e) => {
            error!("{}: disabled: {}", id, e);
            DetectorState::PreProcessFailed(e.to_string())
        }
    }
}
