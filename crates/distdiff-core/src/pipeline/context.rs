//! Shared state handed to every phase of a run.

use distdiff_core_types::RunId;
use serde::{Deserialize, Serialize};

use crate::config::DiffConfig;
use crate::model::{Artifact, ArtifactId};

/// A non-fatal problem found during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactId>,
}

impl ErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            artifact: None,
        }
    }

    pub fn for_artifact(artifact: &Artifact, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            artifact: Some(artifact.id()),
        }
    }
}

impl std::fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.artifact {
            Some(artifact) => write!(f, "{} ({})", self.message, artifact),
            None => f.write_str(&self.message),
        }
    }
}

/// Collects soft error events; every event is also logged as a warning.
#[derive(Debug, Default, Clone)]
pub struct ErrorSink {
    events: Vec<ErrorEvent>,
}

impl ErrorSink {
    pub fn report(&mut self, event: ErrorEvent) {
        tracing::warn!(
            relative_path = event.artifact.as_ref().map(|a| a.relative_path.as_str()),
            "{}",
            event.message
        );
        self.events.push(event);
    }

    pub fn events(&self) -> &[ErrorEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<ErrorEvent> {
        self.events
    }
}

/// Modules that appear or disappear between A and B
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleChanges {
    pub added_modules: Vec<String>,
    pub removed_modules: Vec<String>,
}

/// State of one run, passed by `&mut` through the pipeline.
#[derive(Debug)]
pub struct DiffContext {
    pub config: DiffConfig,
    pub run_id: RunId,
    pub artifacts: Vec<Artifact>,
    pub errors: ErrorSink,
    /// Layers discovered by patch-overlay reconciliation, in priority order
    pub layers: Vec<String>,
    pub module_changes: Option<ModuleChanges>,
}

impl DiffContext {
    pub fn new(config: DiffConfig, artifacts: Vec<Artifact>) -> Self {
        Self {
            config,
            run_id: RunId::new(),
            artifacts,
            errors: ErrorSink::default(),
            layers: Vec::new(),
            module_changes: None,
        }
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn report_error(&mut self, event: ErrorEvent) {
        self.errors.report(event);
    }

    /// Find an artifact by relative path
    pub fn artifact(&self, relative_path: &str) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|a| a.relative_path == relative_path)
    }
}
