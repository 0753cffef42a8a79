//! One complete comparison run.
//!
//! ## Run pipeline (in order):
//! 1. Validate the configuration (both roots must be directories)
//! 2. Detect the distribution kind and pick the phase list
//! 3. Instantiate the phases (unknown names abort before any I/O)
//! 4. Read both trees and compute the baseline partition
//! 5. Execute the phases
//! 6. Apply the final sort and package the `RunResult`

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use distdiff_core::errors::DistDiffError;
use distdiff_core::logging_facility::elapsed_ms;
use distdiff_core::pipeline::PhaseReport;
use distdiff_core::{
    baseline_diff, read_tree, run_pipeline, sort_artifacts, Artifact, DiffConfig, DiffContext,
    ErrorEvent, PhaseRegistry, Side,
};
use distdiff_core::{log_op_end, log_op_error, log_op_start};
use distdiff_core_types::schema::op;
use distdiff_core_types::RunId;
use serde::Serialize;

use super::profile::{detect_distribution, phases_for, DistributionKind};
use crate::{in_op, Result};

/// Everything a finished run reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub distribution: DistributionKind,
    pub folder_a: PathBuf,
    pub folder_b: PathBuf,
    /// Phase names in execution order
    pub phases: Vec<String>,
    /// Whether `DIFFERENT_LINE_BREAKS` was configured as expected
    pub ignore_line_breaks: bool,
    /// Final artifact list, sorted
    pub artifacts: Vec<Artifact>,
    pub errors: Vec<ErrorEvent>,
    pub added_modules: Vec<String>,
    pub removed_modules: Vec<String>,
    pub phase_reports: Vec<PhaseReport>,
}

impl RunResult {
    /// Artifacts whose status calls for attention, in listing order.
    pub fn unexpected_artifacts(
        &self,
        ignore_line_breaks: bool,
    ) -> impl Iterator<Item = &Artifact> + '_ {
        self.artifacts
            .iter()
            .filter(move |artifact| artifact.status.is_unexpected(ignore_line_breaks))
    }

    /// `STATUS: relative/path` lines of the unexpected artifacts
    pub fn unexpected_lines(&self) -> Vec<String> {
        self.unexpected_artifacts(self.ignore_line_breaks)
            .map(Artifact::listing_line)
            .collect()
    }

    pub fn has_unexpected_states(&self) -> bool {
        self.unexpected_artifacts(self.ignore_line_breaks).next().is_some()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Pretty-printed JSON document of the whole result.
    ///
    /// # Errors
    ///
    /// `ERR_SERIALIZATION` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(DistDiffError::from)
            .map_err(in_op("serialize_result"))
    }
}

/// Compare two distributions with the built-in phases.
///
/// # Errors
///
/// Configuration errors (invalid roots, unknown phases, unusable layers)
/// and failures to read either tree. Per-artifact problems are reported in
/// `RunResult::errors` instead.
pub fn compare(config: DiffConfig) -> Result<RunResult> {
    compare_with_registry(config, &PhaseRegistry::with_builtin())
}

/// Compare two distributions, resolving phase names through `registry`.
///
/// # Errors
///
/// Same as [`compare`].
pub fn compare_with_registry(config: DiffConfig, registry: &PhaseRegistry) -> Result<RunResult> {
    let run_id = RunId::new();
    let span = tracing::info_span!("compare", run_id = %run_id);
    let _guard = span.enter();

    let start = Instant::now();
    log_op_start!(
        op::COMPARE,
        folder_a = %config.folder_a.display(),
        folder_b = %config.folder_b.display()
    );

    let result = run(config, registry, run_id);
    let duration_ms = elapsed_ms(start);
    match &result {
        Ok(run) => {
            log_op_end!(
                op::COMPARE,
                duration_ms = duration_ms,
                artifact_count = run.artifacts.len(),
                error_count = run.errors.len()
            );
        }
        Err(err) => log_op_error!(op::COMPARE, err.clone(), duration_ms = duration_ms),
    }
    result
}

fn run(config: DiffConfig, registry: &PhaseRegistry, run_id: RunId) -> Result<RunResult> {
    let started_at = Utc::now();
    config.validate().map_err(in_op("validate_config"))?;

    let distribution = detect_distribution(&config.folder_a, &config.folder_b);
    let phase_names = phases_for(distribution, &config);
    let phases = registry
        .instantiate(&phase_names, &config)
        .map_err(in_op("instantiate_phases"))?;
    tracing::info!(phases = ?phase_names, "phases selected");

    let side_a = read_tree(&config.folder_a, Side::A).map_err(in_op(op::READ_TREE))?;
    let side_b = read_tree(&config.folder_b, Side::B).map_err(in_op(op::READ_TREE))?;
    let mut ctx =
        DiffContext::new(config, baseline_diff(side_a, side_b)).with_run_id(run_id.clone());

    let pipeline = run_pipeline(phases, &mut ctx).map_err(in_op(op::RUN_PIPELINE))?;
    sort_artifacts(&mut ctx.artifacts);

    let DiffContext {
        config,
        artifacts,
        errors,
        module_changes,
        ..
    } = ctx;
    let changes = module_changes.unwrap_or_default();
    Ok(RunResult {
        run_id,
        started_at,
        distribution,
        folder_a: config.folder_a,
        folder_b: config.folder_b,
        phases: phase_names,
        ignore_line_breaks: config.ignore_line_breaks,
        artifacts,
        errors: errors.into_events(),
        added_modules: changes.added_modules,
        removed_modules: changes.removed_modules,
        phase_reports: pipeline.phases,
    })
}
