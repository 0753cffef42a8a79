use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use distdiff_core_types::schema::op;

use crate::errors::{DistDiffError, Result};
use crate::hashing::{DirectoryHashCache, HashMode};
use crate::model::build_info::jar_name_prefix;
use crate::model::{Artifact, ArtifactKind, Producer, Status};
use crate::patching::layers::{active_patch_id, discover_layers};
use crate::patching::paths::{
    is_in_overlays, is_overlay_marker, layer_of, module_root, overlay_patch_id, to_original_path,
    to_overlay_path,
};
use crate::logging_facility::elapsed_ms;
use crate::pipeline::context::{DiffContext, ErrorEvent, ErrorSink};
use crate::pipeline::phase::Phase;
use crate::{log_op_end, log_op_start};

/// Top-level directories never compared
const EXCLUDED_ROOTS: [&str; 2] = [".installation", "bundles"];
/// Container folders above the layers, dropped by exact match
const CONTAINER_FOLDERS: [&str; 3] = ["modules", "modules/system", "modules/system/layers"];
/// Module always reported `PATCHED` under improved hashing: its patch only
/// bumps version metadata that the improved digest ignores.
const VERSION_MODULE: [&str; 3] = ["jboss", "as", "version"];

/// Re-classifies artifacts inside layered module directories of a patched
/// distribution B against a clean distribution A.
///
/// Must run before any content-comparison phase: it rebinds `path_a` /
/// `path_b` and removes artifacts those phases must not see.
#[derive(Debug)]
pub struct PatchOverlayPhase {
    cache: DirectoryHashCache,
}

impl PatchOverlayPhase {
    pub const NAME: &'static str = "patch-overlay";

    pub fn new(hash_mode: HashMode) -> Self {
        Self {
            cache: DirectoryHashCache::new(hash_mode),
        }
    }

    /// Digest cache of this run
    pub fn cache(&self) -> &DirectoryHashCache {
        &self.cache
    }
}

impl Phase for PatchOverlayPhase {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn producer(&self) -> Producer {
        Producer::PatchOverlay
    }

    fn process(&mut self, ctx: &mut DiffContext) -> Result<()> {
        let folder_a = ctx.config.folder_a.clone();
        let folder_b = ctx.config.folder_b.clone();
        let layers = discover_layers(&folder_a, &folder_b)?;
        ctx.layers = layers.clone();

        for layer in &layers {
            let start = Instant::now();
            let patch_id = active_patch_id(&folder_b, layer);
            log_op_start!(op::RECONCILE_LAYER, layer = %layer, patch_id = ?patch_id);

            let before = ctx.artifacts.len();
            let mut reconciler = Reconciler {
                folder_a: &folder_a,
                folder_b: &folder_b,
                layer,
                patch_id: patch_id.as_deref(),
                cache: &mut self.cache,
                errors: &mut ctx.errors,
            };
            ctx.artifacts
                .retain_mut(|artifact| reconciler.decide(artifact) == Disposition::Keep);

            log_op_end!(
                op::RECONCILE_LAYER,
                duration_ms = elapsed_ms(start),
                layer = %layer,
                dropped = before - ctx.artifacts.len(),
                artifact_count = ctx.artifacts.len()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Keep,
    Drop,
}

/// One layer pass over the artifact collection
struct Reconciler<'a> {
    folder_a: &'a Path,
    folder_b: &'a Path,
    layer: &'a str,
    patch_id: Option<&'a str>,
    cache: &'a mut DirectoryHashCache,
    errors: &'a mut ErrorSink,
}

impl Reconciler<'_> {
    fn decide(&mut self, artifact: &mut Artifact) -> Disposition {
        let rel = artifact.relative_path.as_str();
        if is_excluded(rel) {
            return Disposition::Drop;
        }
        if layer_of(rel) != Some(self.layer) {
            return Disposition::Keep;
        }
        if is_in_overlays(rel) && overlay_patch_id(rel) != self.patch_id {
            return Disposition::Drop;
        }
        if artifact.is_folder() || is_overlay_marker(rel) {
            return Disposition::Drop;
        }

        let disposition = match artifact.status {
            Status::Added => self.reconcile_added(artifact),
            Status::Removed => self.reconcile_removed(artifact),
            Status::Same => self.reconcile_same(artifact),
            _ => Disposition::Keep,
        };
        tracing::debug!(
            relative_path = %artifact.relative_path,
            status = %artifact.status,
            disposition = ?disposition,
            "artifact reconciled"
        );
        disposition
    }

    /// Exists only in B: a file of the active overlay, or out of scope.
    fn reconcile_added(&mut self, artifact: &mut Artifact) -> Disposition {
        let rel = artifact.relative_path.clone();
        if overlay_patch_id(&rel).is_none() {
            return Disposition::Drop;
        }
        let original_rel = to_original_path(&rel);
        let original_in_a = self.folder_a.join(&original_rel);
        if !original_in_a.exists() {
            return Disposition::Keep;
        }

        match self.classify_overlaid(&rel) {
            Ok(status) => artifact.status = status,
            Err(err) => {
                self.fail(artifact, err);
                return Disposition::Keep;
            }
        }
        artifact.path_a = Some(original_in_a);
        Disposition::Keep
    }

    fn classify_overlaid(&mut self, overlay_rel: &str) -> Result<Status> {
        let Some(overlay_root) = module_root(self.folder_b, overlay_rel) else {
            return Ok(Status::Patched);
        };
        let original_root = to_original_path(&overlay_root);
        let root_a = self.folder_a.join(&original_root);
        let root_b = self.folder_b.join(&original_root);
        if !root_a.is_dir() || !root_b.is_dir() {
            return Ok(Status::Patched);
        }

        if !self.cache.equivalent(&root_a, &root_b)? {
            return Ok(Status::Patched);
        }
        if self.cache.mode() == HashMode::Improved && is_version_module(&overlay_root) {
            return Ok(Status::Patched);
        }
        Ok(Status::PatchedUnnecessarily)
    }

    /// Exists only in A: superseded by an overlay file, renamed, or missing.
    fn reconcile_removed(&mut self, artifact: &mut Artifact) -> Disposition {
        if self.overlay_exists(&artifact.relative_path) {
            return Disposition::Drop;
        }
        if let Err(err) = self.classify_removed(artifact) {
            self.fail(artifact, err);
        }
        Disposition::Keep
    }

    fn classify_removed(&mut self, artifact: &mut Artifact) -> Result<()> {
        let root = module_root(self.folder_a, &artifact.relative_path).ok_or_else(|| {
            DistDiffError::Hashing {
                path: artifact.relative_path.clone(),
                reason: "artifact belongs to no module root".to_string(),
            }
        })?;

        if !self.roots_equivalent(&root)? {
            artifact.status = Status::NotPatched;
            return Ok(());
        }

        // only a jar can have been renamed by a version bump
        if artifact.kind != ArtifactKind::Jar {
            artifact.status = Status::NotPatched;
            return Ok(());
        }
        let prefix = match &artifact.build_info {
            Some(info) => info.name.clone(),
            None => jar_name_prefix(&artifact.name),
        };
        match find_jar_with_prefix(&self.folder_b.join(&root), &prefix)? {
            Some(renamed) => {
                artifact.path_b = Some(renamed);
                artifact.status = Status::Version;
            }
            None => artifact.status = Status::NotPatched,
        }
        Ok(())
    }

    /// Exists in both, original namespace: superseded or missing a patch.
    fn reconcile_same(&mut self, artifact: &mut Artifact) -> Disposition {
        if self.overlay_exists(&artifact.relative_path) {
            return Disposition::Drop;
        }
        let Some(root) = module_root(self.folder_a, &artifact.relative_path) else {
            return Disposition::Keep;
        };
        match self.roots_equivalent(&root) {
            Ok(true) => {}
            Ok(false) => artifact.status = Status::NotPatched,
            Err(err) => self.fail(artifact, err),
        }
        Disposition::Keep
    }

    /// Whether a file exists at the overlay counterpart of `rel` in B
    fn overlay_exists(&self, rel: &str) -> bool {
        self.patch_id
            .and_then(|patch| to_overlay_path(rel, patch))
            .is_some_and(|overlay| self.folder_b.join(overlay).exists())
    }

    /// Compare A's module root with B's original-namespace module root
    fn roots_equivalent(&mut self, root_rel: &str) -> Result<bool> {
        let root_b = self.folder_b.join(root_rel);
        if !root_b.is_dir() {
            return Ok(false);
        }
        self.cache.equivalent(&self.folder_a.join(root_rel), &root_b)
    }

    fn fail(&mut self, artifact: &mut Artifact, err: DistDiffError) {
        artifact.status = Status::Error;
        self.errors.report(ErrorEvent::for_artifact(
            artifact,
            format!("cannot compare module roots: {}", err),
        ));
    }
}

fn is_excluded(rel: &str) -> bool {
    let first = rel.split('/').next().unwrap_or_default();
    EXCLUDED_ROOTS.contains(&first) || CONTAINER_FOLDERS.contains(&rel)
}

fn is_version_module(rel: &str) -> bool {
    let segments: Vec<&str> = rel.split('/').collect();
    segments.windows(VERSION_MODULE.len()).any(|w| w == VERSION_MODULE)
}

/// First `<prefix>*.jar` in `dir`, by file name.
fn find_jar_with_prefix(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    if prefix.is_empty() {
        return Ok(None);
    }
    let listing = fs::read_dir(dir).map_err(|e| DistDiffError::io(dir, e))?;
    let mut candidates = Vec::new();
    for entry in listing {
        let entry = entry.map_err(|e| DistDiffError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(prefix) && name.ends_with(".jar") && entry.path().is_file() {
            candidates.push(name);
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next().map(|name| dir.join(name)))
}
