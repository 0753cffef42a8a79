//! Patch-Overlay Reconciliation
//!
//! Distribution B may carry patches as overlays: shadow copies of modules
//! under `modules/system/layers/<layer>/.overlays/<patch>`. This module maps
//! artifacts between the original and overlay namespaces and re-classifies
//! them so that a correctly applied patch is reported as `PATCHED`, not as
//! a pile of ADDED/REMOVED files.

pub mod layers;
pub mod paths;
mod phase;

pub use layers::{active_patch_id, discover_layers, parse_layers_conf};
pub use phase::PatchOverlayPhase;
