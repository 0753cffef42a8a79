//! Baseline differ: the initial ADDED/REMOVED/SAME partition.
//!
//! Matching is by identity (name + relative path) only; content is never
//! inspected here.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::model::{Artifact, ArtifactId, Status};

/// Partition the artifacts of both sides.
///
/// Returns REMOVED artifacts first (in A's order), then ADDED (in B's
/// order), then SAME (in A's order). SAME artifacts keep A's record and
/// gain B's path.
pub fn baseline_diff(side_a: Vec<Artifact>, side_b: Vec<Artifact>) -> Vec<Artifact> {
    let ids_in_a: HashSet<ArtifactId> = side_a.iter().map(Artifact::id).collect();

    let mut added = Vec::new();
    let mut paths_in_b: HashMap<ArtifactId, Option<PathBuf>> = HashMap::new();
    for mut artifact in side_b {
        let id = artifact.id();
        if ids_in_a.contains(&id) {
            paths_in_b.insert(id, artifact.path_b.take());
        } else {
            artifact.path_a = None;
            artifact.status = Status::Added;
            added.push(artifact);
        }
    }

    let mut removed = Vec::new();
    let mut same = Vec::new();
    for mut artifact in side_a {
        match paths_in_b.remove(&artifact.id()) {
            Some(path_b) => {
                artifact.path_b = path_b;
                artifact.status = Status::Same;
                same.push(artifact);
            }
            None => {
                artifact.path_b = None;
                artifact.status = Status::Removed;
                removed.push(artifact);
            }
        }
    }

    tracing::debug!(
        removed = removed.len(),
        added = added.len(),
        same = same.len(),
        "baseline partition computed"
    );

    let mut result = removed;
    result.extend(added);
    result.extend(same);
    result
}
