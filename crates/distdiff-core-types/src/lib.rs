//! Types shared by every distdiff crate that logs or reports a run.
//!
//! Kept free of the comparison logic so the engine and CLI can name a run
//! and read its log stream without pulling in the core.

pub mod correlation;
pub mod schema;

pub use correlation::RunId;
