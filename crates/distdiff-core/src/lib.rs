//! distdiff core - distribution differencing kernel
//!
//! This crate compares two deployed distribution trees ("A", the clean
//! baseline, and "B", the distribution under test) and classifies every
//! artifact by how it changed:
//! - Tree reading and the baseline ADDED/REMOVED/SAME partition
//! - The status model with report priorities and legal producers
//! - The phase contract, registry and sequential pipeline executor
//! - Patch-overlay reconciliation across layered module directories
//! - The per-run directory hash cache (simple and improved modes)
//! - Deterministic sorting of the final artifact list
//!
//! Phase selection, report rendering and argument parsing live outside
//! this crate.

pub mod config;
pub mod errors;
pub mod hashing;
pub mod logging_facility;
pub mod model;
pub mod patching;
pub mod phases;
pub mod pipeline;
pub mod sort;
pub mod tree;

#[doc(hidden)]
pub use distdiff_core_types as __types;

// Re-export commonly used types
pub use config::DiffConfig;
pub use errors::{DiffError, DiffErrorKind, DistDiffError, Result};
pub use hashing::{DirectoryHashCache, HashMode};
pub use model::{Artifact, ArtifactId, ArtifactKind, Producer, Side, Status};
pub use pipeline::{run_pipeline, DiffContext, ErrorEvent, Phase, PhaseRegistry};
pub use sort::sort_artifacts;
pub use tree::{baseline_diff, read_tree};
