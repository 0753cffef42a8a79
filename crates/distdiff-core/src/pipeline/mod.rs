//! Phase Pipeline
//!
//! A run is an ordered list of phases applied to one shared [`DiffContext`].
//! Phases execute strictly one after another; each may re-classify, rebind
//! or remove artifacts and report soft error events.

pub mod context;
pub mod executor;
pub mod phase;
pub mod registry;

pub use context::{DiffContext, ErrorEvent, ErrorSink, ModuleChanges};
pub use executor::{run_pipeline, PhaseOutcome, PhaseReport, PipelineReport};
pub use phase::Phase;
pub use registry::{PhaseFactory, PhaseRegistry};
