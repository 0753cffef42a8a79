//! Sequential phase executor.
//!
//! ## Guarantees
//!
//! - Phases run in the given order, one at a time, against the same context.
//! - A phase returning a non-configuration error is logged, recorded as an
//!   error event and as a failed [`PhaseReport`]; the next phase still runs.
//! - A configuration error stops the pipeline and is returned.
//! - Status assignments a phase's producer class may not make are recorded
//!   as error events; they are not reverted.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;

use distdiff_core_types::schema::op;

use crate::errors::{DiffError, Result};
use crate::logging_facility::elapsed_ms;
use crate::model::{ArtifactId, Status};
use crate::pipeline::context::{DiffContext, ErrorEvent};
use crate::pipeline::phase::Phase;
use crate::{log_op_end, log_op_error, log_op_start};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PhaseOutcome {
    Completed,
    Failed { code: String, message: String },
}

/// What one phase did during a run
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub name: String,
    pub duration_ms: u64,
    pub artifacts_before: usize,
    pub artifacts_after: usize,
    pub illegal_assignments: usize,
    #[serde(flatten)]
    pub outcome: PhaseOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub phases: Vec<PhaseReport>,
}

impl PipelineReport {
    /// Reports of phases that returned an error
    pub fn failed(&self) -> impl Iterator<Item = &PhaseReport> {
        self.phases
            .iter()
            .filter(|p| matches!(p.outcome, PhaseOutcome::Failed { .. }))
    }

    pub fn all_completed(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Run `phases` in order against `ctx`.
///
/// # Errors
///
/// Returns the first configuration-class error raised by a phase; all
/// other phase errors are absorbed into the report and the error sink.
pub fn run_pipeline(phases: Vec<Box<dyn Phase>>, ctx: &mut DiffContext) -> Result<PipelineReport> {
    let run_start = Instant::now();
    log_op_start!(
        op::RUN_PIPELINE,
        run_id = %ctx.run_id,
        phase_count = phases.len(),
        artifact_count = ctx.artifacts.len()
    );

    let mut report = PipelineReport::default();
    for mut phase in phases {
        let name = phase.name().to_string();
        let before = status_snapshot(ctx);
        let artifacts_before = ctx.artifacts.len();

        let start = Instant::now();
        log_op_start!(op::RUN_PHASE, phase = %name);
        let result = phase.process(ctx);
        let duration_ms = elapsed_ms(start);
        let illegal_assignments = audit_transitions(phase.as_ref(), &before, ctx);

        let outcome = match result {
            Ok(()) => {
                log_op_end!(
                    op::RUN_PHASE,
                    duration_ms = duration_ms,
                    phase = %name,
                    artifact_count = ctx.artifacts.len()
                );
                PhaseOutcome::Completed
            }
            Err(err) => {
                log_op_error!(op::RUN_PHASE, err.clone(), duration_ms = duration_ms, phase = %name);
                if err.is_configuration() {
                    let total_ms = elapsed_ms(run_start);
                    log_op_error!(op::RUN_PIPELINE, err.clone(), duration_ms = total_ms);
                    return Err(err);
                }
                let diff_err: DiffError = err.into();
                ctx.report_error(ErrorEvent::new(format!(
                    "phase '{}' failed: {}",
                    name, diff_err
                )));
                PhaseOutcome::Failed {
                    code: diff_err.code().to_string(),
                    message: diff_err.message().to_string(),
                }
            }
        };

        report.phases.push(PhaseReport {
            name,
            duration_ms,
            artifacts_before,
            artifacts_after: ctx.artifacts.len(),
            illegal_assignments,
            outcome,
        });
    }

    log_op_end!(
        op::RUN_PIPELINE,
        duration_ms = elapsed_ms(run_start),
        run_id = %ctx.run_id,
        artifact_count = ctx.artifacts.len(),
        error_count = ctx.errors.len()
    );
    Ok(report)
}

fn status_snapshot(ctx: &DiffContext) -> HashMap<ArtifactId, Status> {
    ctx.artifacts.iter().map(|a| (a.id(), a.status)).collect()
}

fn audit_transitions(
    phase: &dyn Phase,
    before: &HashMap<ArtifactId, Status>,
    ctx: &mut DiffContext,
) -> usize {
    let producer = phase.producer();
    let violations: Vec<ErrorEvent> = ctx
        .artifacts
        .iter()
        .filter(|a| before.get(&a.id()) != Some(&a.status))
        .filter(|a| !a.status.may_be_assigned_by(producer))
        .map(|a| {
            ErrorEvent::for_artifact(
                a,
                format!(
                    "phase '{}' assigned status {} which {:?} phases do not produce",
                    phase.name(),
                    a.status,
                    producer
                ),
            )
        })
        .collect();

    let count = violations.len();
    for event in violations {
        ctx.report_error(event);
    }
    count
}
