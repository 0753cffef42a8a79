//! Operation logging for comparison runs.
//!
//! Every long-running step of a comparison (reading a tree, running a phase,
//! reconciling a layer) logs a `start` event and then exactly one `end` or
//! `end_error` event carrying `duration_ms`. Field names come from
//! [`distdiff_core_types::schema`].
//!
//! Binaries call [`init`] once. Tests call [`init_test_capture`] and assert
//! on the recorded events instead of parsing output.

use std::time::Instant;

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

/// Milliseconds since `start`, saturating at `u64::MAX`.
pub fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
