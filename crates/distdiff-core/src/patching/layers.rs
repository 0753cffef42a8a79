//! Layer discovery and active-overlay detection.

use std::fs;
use std::path::Path;

use crate::errors::{DistDiffError, Result};
use crate::model::Side;
use crate::patching::paths::{layer_root, OVERLAYS_DIR};

/// Relative path of the layer configuration file
pub const LAYERS_CONF: &str = "modules/layers.conf";
/// Layer that is always present, appended last when not configured
pub const BASE_LAYER: &str = "base";

/// Layers to reconcile, in priority order.
///
/// Reads `modules/layers.conf` from distribution B when present and appends
/// `base` when it is not listed. Every layer must have a directory in both
/// distributions.
///
/// # Errors
///
/// `ModulesDirMissing` when B has no `modules` directory,
/// `LayersConfInvalid` when `layers.conf` exists but names no layer,
/// `LayerMissing` when a layer directory is absent on either side.
pub fn discover_layers(folder_a: &Path, folder_b: &Path) -> Result<Vec<String>> {
    let modules_b = folder_b.join("modules");
    if !modules_b.is_dir() {
        return Err(DistDiffError::ModulesDirMissing {
            path: modules_b.display().to_string(),
        });
    }

    let conf = folder_b.join(LAYERS_CONF);
    let mut layers = if conf.is_file() {
        let content = fs::read_to_string(&conf).map_err(|e| DistDiffError::io(&conf, e))?;
        parse_layers_conf(&content).map_err(|reason| DistDiffError::LayersConfInvalid {
            path: conf.display().to_string(),
            reason,
        })?
    } else {
        Vec::new()
    };
    if !layers.iter().any(|l| l == BASE_LAYER) {
        layers.push(BASE_LAYER.to_string());
    }

    for layer in &layers {
        for (side, root) in [(Side::A, folder_a), (Side::B, folder_b)] {
            let dir = root.join(layer_root(layer));
            if !dir.is_dir() {
                return Err(DistDiffError::LayerMissing {
                    layer: layer.clone(),
                    side: side.to_string(),
                    path: dir.display().to_string(),
                });
            }
        }
    }

    tracing::info!(layers = ?layers, "layers discovered");
    Ok(layers)
}

/// Parse the `layers=<name>[,<name>...]` entry of `layers.conf`.
///
/// Blank lines, `#` comments and other keys are ignored. Duplicate names
/// keep their first position.
pub fn parse_layers_conf(content: &str) -> std::result::Result<Vec<String>, String> {
    let value = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "layers")
        .map(|(_, value)| value)
        .ok_or_else(|| "no 'layers=' entry".to_string())?;

    let mut layers: Vec<String> = Vec::new();
    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !layers.iter().any(|l| l == name) {
            layers.push(name.to_string());
        }
    }
    if layers.is_empty() {
        return Err("'layers=' entry lists no layer".to_string());
    }
    Ok(layers)
}

/// Active patch ID of a layer in distribution B.
///
/// Reads `<layer>/.overlays/.overlays`. A missing or empty marker, or one
/// naming a directory that does not exist, means the layer has no active
/// overlay; this is logged and never fails the run.
pub fn active_patch_id(folder_b: &Path, layer: &str) -> Option<String> {
    let overlays = folder_b.join(layer_root(layer)).join(OVERLAYS_DIR);
    if !overlays.is_dir() {
        tracing::info!(layer = %layer, "layer has no overlays directory");
        return None;
    }

    let marker = overlays.join(OVERLAYS_DIR);
    let content = match fs::read_to_string(&marker) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(layer = %layer, marker = %marker.display(), error = %err,
                "active overlay marker unreadable");
            return None;
        }
    };

    let patch_id = content.trim();
    if patch_id.is_empty() {
        tracing::warn!(layer = %layer, "active overlay marker is empty");
        return None;
    }
    if !overlays.join(patch_id).is_dir() {
        tracing::warn!(layer = %layer, patch_id = %patch_id,
            "active overlay marker names a missing directory");
        return None;
    }

    tracing::info!(layer = %layer, patch_id = %patch_id, "active overlay detected");
    Some(patch_id.to_string())
}
