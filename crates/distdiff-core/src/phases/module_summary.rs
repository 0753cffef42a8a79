//! Summary of modules that appear or disappear between A and B.

use std::collections::BTreeSet;
use std::path::Path;

use crate::errors::Result;
use crate::model::{Artifact, Producer, Side, Status};
use crate::patching::discover_layers;
use crate::patching::paths::{layer_of, MODULE_DESCRIPTOR, OVERLAYS_DIR};
use crate::pipeline::context::{DiffContext, ErrorEvent, ModuleChanges};
use crate::pipeline::phase::Phase;
use crate::tree::relative_path_of;

/// Statuses of `module.xml` artifacts that can signal a module change
const SUMMARY_STATUSES: [Status; 6] = [
    Status::Added,
    Status::Patched,
    Status::PatchedUnnecessarily,
    Status::PatchedWrong,
    Status::Different,
    Status::Removed,
];

/// Records added and removed module names in `DiffContext::module_changes`.
///
/// Uses the layers found by reconciliation when it ran, otherwise discovers
/// them itself. When layers cannot be discovered the summary is skipped with
/// an error event.
#[derive(Debug, Default)]
pub struct ModuleSummaryPhase;

impl ModuleSummaryPhase {
    pub const NAME: &'static str = "module-summary";
}

impl Phase for ModuleSummaryPhase {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn producer(&self) -> Producer {
        Producer::Filter
    }

    fn process(&mut self, ctx: &mut DiffContext) -> Result<()> {
        let layers = if ctx.layers.is_empty() {
            match discover_layers(&ctx.config.folder_a, &ctx.config.folder_b) {
                Ok(layers) => layers,
                Err(err) => {
                    ctx.report_error(ErrorEvent::new(format!(
                        "module summary skipped: {}",
                        err
                    )));
                    return Ok(());
                }
            }
        } else {
            ctx.layers.clone()
        };

        let mut in_a = BTreeSet::new();
        let mut in_b = BTreeSet::new();
        let (folder_a, folder_b) = (&ctx.config.folder_a, &ctx.config.folder_b);
        for artifact in ctx.artifacts.iter().filter(|a| is_summarised(a)) {
            in_a.extend(side_module(folder_a, artifact.path(Side::A), &layers));
            in_b.extend(side_module(folder_b, artifact.path(Side::B), &layers));
        }

        let changes = ModuleChanges {
            added_modules: in_b.difference(&in_a).cloned().collect(),
            removed_modules: in_a.difference(&in_b).cloned().collect(),
        };
        tracing::info!(
            added = changes.added_modules.len(),
            removed = changes.removed_modules.len(),
            "module changes summarised"
        );
        ctx.module_changes = Some(changes);
        Ok(())
    }
}

fn is_summarised(artifact: &Artifact) -> bool {
    !artifact.is_folder()
        && artifact.name == MODULE_DESCRIPTOR
        && SUMMARY_STATUSES.contains(&artifact.status)
}

fn side_module(root: &Path, path: Option<&Path>, layers: &[String]) -> Option<String> {
    let rel = relative_path_of(root, path?)?;
    module_name(&rel, layers)
}

/// Dotted module name of a `module.xml` path inside a known layer.
///
/// `modules/system/layers/base/.overlays/p1/org/foo/main/module.xml` in
/// layer `base` yields `org.foo.main`.
pub fn module_name(relative_path: &str, layers: &[String]) -> Option<String> {
    let layer = layer_of(relative_path)?;
    if !layers.iter().any(|l| l == layer) {
        return None;
    }
    let segments: Vec<&str> = relative_path.split('/').collect();
    let mut rest = &segments[4..];
    if rest.first() == Some(&OVERLAYS_DIR) {
        rest = rest.get(2..)?;
    }
    let (last, module) = rest.split_last()?;
    if *last != MODULE_DESCRIPTOR || module.is_empty() {
        return None;
    }
    Some(module.join("."))
}
