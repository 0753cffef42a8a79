//! Command orchestration layer.

pub mod compare;
pub mod profile;
