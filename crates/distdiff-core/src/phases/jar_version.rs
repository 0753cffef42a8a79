//! Pairs jars that were renamed by a version or build bump.
//!
//! A `REMOVED` jar is matched against `ADDED` jars in the same folder. When
//! several are found, candidates with identical content are preferred, then
//! candidates with the same build name. The first candidate whose build name
//! equals the removed jar's takes its place: the removed artifact is rebound
//! to the new file and becomes `BUILD` (same major.minor.micro) or `VERSION`,
//! and the added artifact is dropped.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::errors::{DistDiffError, Result};
use crate::model::{Artifact, ArtifactKind, JarBuildInfo, Producer, Side, Status};
use crate::pipeline::context::{DiffContext, ErrorEvent};
use crate::pipeline::phase::Phase;

#[derive(Debug, Default)]
pub struct JarVersionPhase;

impl JarVersionPhase {
    pub const NAME: &'static str = "jar-version";
}

impl Phase for JarVersionPhase {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn producer(&self) -> Producer {
        Producer::VersionComparison
    }

    fn process(&mut self, ctx: &mut DiffContext) -> Result<()> {
        let removed: Vec<usize> = jar_indices(&ctx.artifacts, Status::Removed);
        let mut added: Vec<usize> = jar_indices(&ctx.artifacts, Status::Added);
        let mut consumed = HashSet::new();

        for idx in removed {
            let Some(info) = build_name(&ctx.artifacts[idx]) else {
                continue;
            };
            let candidates = candidates(ctx, idx, &added, &info.name);
            let matched = candidates.into_iter().find(|&c| {
                build_name(&ctx.artifacts[c]).is_some_and(|other| other.name == info.name)
            });
            let Some(candidate) = matched else {
                continue;
            };

            let replacement = &ctx.artifacts[candidate];
            let status = match &replacement.build_info {
                Some(other) if same_release(&info, other) => Status::Build,
                _ => Status::Version,
            };
            tracing::debug!(
                relative_path = %ctx.artifacts[idx].relative_path,
                matched = %replacement.relative_path,
                from = ?info.version(),
                to = ?replacement.build_info.as_ref().and_then(JarBuildInfo::version),
                %status,
                "renamed jar paired"
            );
            let path_b = replacement.path_b.clone();
            let artifact = &mut ctx.artifacts[idx];
            artifact.path_b = path_b;
            artifact.status = status;
            added.retain(|&a| a != candidate);
            consumed.insert(candidate);
        }

        if !consumed.is_empty() {
            let mut position = 0;
            ctx.artifacts.retain(|_| {
                let keep = !consumed.contains(&position);
                position += 1;
                keep
            });
        }
        Ok(())
    }
}

/// Added jars in the removed jar's folder, narrowed when ambiguous.
fn candidates(ctx: &mut DiffContext, removed: usize, added: &[usize], name: &str) -> Vec<usize> {
    let parent = ctx.artifacts[removed].parent_relative_path.clone();
    let mut candidates: Vec<usize> = added
        .iter()
        .copied()
        .filter(|&a| ctx.artifacts[a].parent_relative_path == parent)
        .collect();
    if candidates.len() <= 1 {
        return candidates;
    }

    if let Some(digest) = side_digest(ctx, removed, Side::A) {
        let identical: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&c| side_digest(ctx, c, Side::B).as_deref() == Some(digest.as_str()))
            .collect();
        if !identical.is_empty() {
            candidates = identical;
        }
    }
    if candidates.len() > 1 {
        candidates.retain(|&c| build_name(&ctx.artifacts[c]).is_some_and(|i| i.name == name));
    }
    candidates
}

fn jar_indices(artifacts: &[Artifact], status: Status) -> Vec<usize> {
    artifacts
        .iter()
        .enumerate()
        .filter(|(_, a)| a.kind == ArtifactKind::Jar && a.status == status)
        .map(|(idx, _)| idx)
        .collect()
}

fn build_name(artifact: &Artifact) -> Option<JarBuildInfo> {
    artifact
        .build_info
        .clone()
        .filter(|info| !info.name.is_empty())
}

/// Same major, minor and micro version; suffix and build may differ
fn same_release(a: &JarBuildInfo, b: &JarBuildInfo) -> bool {
    a.major == b.major && a.minor == b.minor && a.micro == b.micro
}

/// Content digest of the artifact's file on `side`; failures become error events.
fn side_digest(ctx: &mut DiffContext, idx: usize, side: Side) -> Option<String> {
    let path = ctx.artifacts[idx].path(side)?.to_path_buf();
    match content_digest(&path) {
        Ok(digest) => Some(digest),
        Err(err) => {
            let event = ErrorEvent::for_artifact(&ctx.artifacts[idx], err.to_string());
            ctx.report_error(event);
            None
        }
    }
}

fn content_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| DistDiffError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| DistDiffError::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffConfig;
    use std::path::PathBuf;

    fn jar(relative_path: &str, side: Side, status: Status) -> Artifact {
        let root = match side {
            Side::A => "/a",
            Side::B => "/b",
        };
        let mut artifact = Artifact::new(
            relative_path,
            ArtifactKind::Jar,
            side,
            PathBuf::from(root).join(relative_path),
        );
        artifact.status = status;
        artifact
    }

    fn run(artifacts: Vec<Artifact>) -> DiffContext {
        let mut ctx = DiffContext::new(DiffConfig::new("/a", "/b"), artifacts);
        JarVersionPhase.process(&mut ctx).unwrap();
        ctx
    }

    #[test]
    fn test_same_release_ignores_suffix_and_build() {
        let a = JarBuildInfo::parse("foo-1.2.3.Final-redhat-1.jar").unwrap();
        let b = JarBuildInfo::parse("foo-1.2.3.Final-redhat-2.jar").unwrap();
        let c = JarBuildInfo::parse("foo-1.2.4.Final.jar").unwrap();
        assert!(same_release(&a, &b));
        assert!(!same_release(&a, &c));
    }

    #[test]
    fn test_single_candidate_with_other_name_is_not_paired() {
        let ctx = run(vec![
            jar("lib/foo-1.0.jar", Side::A, Status::Removed),
            jar("lib/bar-1.0.jar", Side::B, Status::Added),
        ]);

        let statuses: Vec<Status> = ctx.artifacts.iter().map(|a| a.status).collect();
        assert_eq!(statuses, vec![Status::Removed, Status::Added]);
    }

    #[test]
    fn test_jars_in_other_folders_are_not_candidates() {
        let ctx = run(vec![
            jar("lib/foo-1.0.jar", Side::A, Status::Removed),
            jar("ext/foo-1.1.jar", Side::B, Status::Added),
        ]);

        assert_eq!(ctx.artifacts.len(), 2);
        assert_eq!(ctx.artifacts[0].status, Status::Removed);
    }

    #[test]
    fn test_name_narrows_ambiguous_candidates() {
        // GIVEN two added jars next to the removed one, no files on disk
        let ctx = run(vec![
            jar("lib/bar-2.0.jar", Side::B, Status::Added),
            jar("lib/foo-1.0.jar", Side::A, Status::Removed),
            jar("lib/foo-2.0.jar", Side::B, Status::Added),
        ]);

        // THEN foo is paired as VERSION and bar stays ADDED
        let lines: Vec<String> = ctx.artifacts.iter().map(Artifact::listing_line).collect();
        assert_eq!(lines, vec!["ADDED: lib/bar-2.0.jar", "VERSION: lib/foo-1.0.jar"]);
        assert_eq!(
            ctx.artifacts[1].path_b,
            Some(PathBuf::from("/b/lib/foo-2.0.jar"))
        );
        // unreadable files only disable the content preference
        assert!(!ctx.errors.is_empty());
    }
}
