//! Path algebra between the original and the overlay module namespaces.
//!
//! All paths here are distribution-relative and `/`-separated:
//!
//! ```text
//! original: modules/system/layers/<layer>/org/foo/main/foo.jar
//! overlay:  modules/system/layers/<layer>/.overlays/<patch>/org/foo/main/foo.jar
//! ```
//!
//! Segments are always compared whole; `.overlaysX` or `layers2` never match.

use std::path::Path;

/// Directory holding overlays inside a layer, and the marker file inside it
pub const OVERLAYS_DIR: &str = ".overlays";
/// File whose presence marks a module root
pub const MODULE_DESCRIPTOR: &str = "module.xml";
/// Relative path of the layer container
pub const LAYERS_ROOT: &str = "modules/system/layers";

const LAYERS_ROOT_SEGMENTS: [&str; 3] = ["modules", "system", "layers"];
/// Index of the `<layer>` segment
const LAYER_INDEX: usize = 3;
/// Index of the `.overlays` segment in an overlay path
const OVERLAYS_INDEX: usize = 4;

fn segments(relative_path: &str) -> Vec<&str> {
    relative_path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Layer an artifact lives in, if it lives below `modules/system/layers/<layer>`.
pub fn layer_of(relative_path: &str) -> Option<&str> {
    let segments = segments(relative_path);
    if segments.len() > LAYER_INDEX && segments[..LAYER_INDEX] == LAYERS_ROOT_SEGMENTS {
        Some(segments[LAYER_INDEX])
    } else {
        None
    }
}

/// Relative path of a layer directory
pub fn layer_root(layer: &str) -> String {
    format!("{}/{}", LAYERS_ROOT, layer)
}

/// Whether the path is inside (or is) the `.overlays` directory of its layer
pub fn is_in_overlays(relative_path: &str) -> bool {
    layer_of(relative_path).is_some()
        && segments(relative_path).get(OVERLAYS_INDEX) == Some(&OVERLAYS_DIR)
}

/// Patch ID of the overlay a path belongs to.
///
/// The `.overlays/.overlays` marker file yields `.overlays`, which never
/// names a real patch.
pub fn overlay_patch_id(relative_path: &str) -> Option<&str> {
    if !is_in_overlays(relative_path) {
        return None;
    }
    segments(relative_path).get(OVERLAYS_INDEX + 1).copied()
}

/// Whether the path is the active-patch marker file of its layer
pub fn is_overlay_marker(relative_path: &str) -> bool {
    let segments = segments(relative_path);
    segments.len() == OVERLAYS_INDEX + 2
        && layer_of(relative_path).is_some()
        && segments[OVERLAYS_INDEX] == OVERLAYS_DIR
        && segments[OVERLAYS_INDEX + 1] == OVERLAYS_DIR
}

/// Insert `.overlays/<patch_id>` right after the layer segment.
///
/// Returns `None` for paths outside any layer.
pub fn to_overlay_path(relative_path: &str, patch_id: &str) -> Option<String> {
    layer_of(relative_path)?;
    let mut segments = segments(relative_path);
    segments.splice(
        OVERLAYS_INDEX..OVERLAYS_INDEX,
        [OVERLAYS_DIR, patch_id],
    );
    Some(segments.join("/"))
}

/// Remove the `.overlays/<patch_id>` pair; other paths are returned unchanged.
pub fn to_original_path(relative_path: &str) -> String {
    if overlay_patch_id(relative_path).is_none() {
        return relative_path.to_string();
    }
    let mut segments = segments(relative_path);
    segments.drain(OVERLAYS_INDEX..OVERLAYS_INDEX + 2);
    segments.join("/")
}

/// Nearest directory, starting with the path itself, that contains
/// `module.xml` inside `dist_root`.
///
/// The search stays inside the namespace of the path: it never climbs to
/// the layer directory, nor above `<layer>/.overlays/<patch_id>` for
/// overlay paths. Returns the module root as a relative path.
pub fn module_root(dist_root: &Path, relative_path: &str) -> Option<String> {
    layer_of(relative_path)?;
    let segments = segments(relative_path);
    let floor = if overlay_patch_id(relative_path).is_some() {
        OVERLAYS_INDEX + 2
    } else {
        LAYER_INDEX + 1
    };
    (floor + 1..=segments.len())
        .rev()
        .map(|len| segments[..len].join("/"))
        .find(|candidate| dist_root.join(candidate).join(MODULE_DESCRIPTOR).is_file())
}
