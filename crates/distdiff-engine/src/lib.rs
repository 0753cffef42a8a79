//! DistDiff Engine - Orchestration layer
//!
//! Decides which phases a run needs, drives the core through one complete
//! comparison and packages the outcome for reporting.

pub mod commands;

use distdiff_core::errors::{DiffError, DistDiffError};

/// Engine results carry the structured error facility
pub type Result<T> = std::result::Result<T, DiffError>;

/// Convert a core error, tagging it with `op` unless it already names one.
pub(crate) fn in_op(op: &'static str) -> impl Fn(DistDiffError) -> DiffError {
    move |err| {
        let err = DiffError::from(err);
        if err.op().is_some() {
            err
        } else {
            err.with_op(op)
        }
    }
}
