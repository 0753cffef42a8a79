//! Tree reader: lists a distribution root into a flat artifact sequence.
//!
//! ## Guarantees
//!
//! - Entries come out in depth-first order with siblings sorted by file name,
//!   so two reads of an unchanged tree produce identical sequences.
//! - Symbolic links are not followed; a link is reported as a plain file.
//! - The root itself is never reported.

use std::path::{Path, PathBuf};
use std::time::Instant;

use distdiff_core_types::schema::op;
use walkdir::WalkDir;

use crate::errors::{DistDiffError, Result};
use crate::logging_facility::elapsed_ms;
use crate::model::{Artifact, ArtifactKind, Side};
use crate::{log_op_end, log_op_error, log_op_start};

/// Recursively list `root` into artifacts bound to `side`.
///
/// # Errors
///
/// `InvalidRoot` when `root` is not a directory, `Io` when a directory
/// cannot be listed.
pub fn read_tree(root: &Path, side: Side) -> Result<Vec<Artifact>> {
    let start = Instant::now();
    log_op_start!(op::READ_TREE, side = %side, root = %root.display());

    let result = walk(root, side);
    let duration_ms = elapsed_ms(start);
    match &result {
        Ok(artifacts) => {
            log_op_end!(
                op::READ_TREE,
                duration_ms = duration_ms,
                side = %side,
                artifact_count = artifacts.len()
            );
        }
        Err(err) => log_op_error!(op::READ_TREE, err.clone(), duration_ms = duration_ms),
    }
    result
}

fn walk(root: &Path, side: Side) -> Result<Vec<Artifact>> {
    if !root.is_dir() {
        return Err(DistDiffError::InvalidRoot {
            path: root.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    let mut artifacts = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        let Some(relative_path) = relative_path_of(root, entry.path()) else {
            continue;
        };
        let name = entry.file_name().to_string_lossy();
        let kind = ArtifactKind::classify(&name, entry.file_type().is_dir());
        artifacts.push(Artifact::new(
            relative_path,
            kind,
            side,
            PathBuf::from(entry.path()),
        ));
    }
    Ok(artifacts)
}

/// `/`-separated path of `path` relative to `root`, or `None` when `path`
/// is not below `root`.
pub fn relative_path_of(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
