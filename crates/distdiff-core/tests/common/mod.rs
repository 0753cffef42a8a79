use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use distdiff_core::patching::PatchOverlayPhase;
use distdiff_core::{
    baseline_diff, read_tree, run_pipeline, DiffConfig, DiffContext, HashMode, Phase, Side, Status,
};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Two distribution roots `a/` and `b/` inside one temporary directory.
///
/// Both start with an empty `modules/system/layers/base`.
pub struct DistPair {
    _root: TempDir,
    pub a: PathBuf,
    pub b: PathBuf,
}

#[allow(dead_code)]
impl DistPair {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        for dist in [&a, &b] {
            fs::create_dir_all(dist.join("modules/system/layers/base")).unwrap();
        }
        Self { _root: root, a, b }
    }

    pub fn config(&self) -> DiffConfig {
        DiffConfig::new(&self.a, &self.b)
    }

    pub fn patch_aware_config(&self, mode: HashMode) -> DiffConfig {
        self.config().with_patch_aware(true).with_hash_mode(mode)
    }
}

/// Write a file, creating parent directories
#[allow(dead_code)]
pub fn write_file(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Write a jar with the given entries, stored uncompressed
#[allow(dead_code)]
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// `module.xml` declaring one jar resource
#[allow(dead_code)]
pub fn module_descriptor(name: &str, jar: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<module xmlns="urn:jboss:module:1.3" name="{}">
    <resources>
        <resource-root path="{}"/>
    </resources>
    <dependencies>
        <module name="javax.api"/>
    </dependencies>
</module>
"#,
        name, jar
    )
}

/// Write a module (descriptor plus one plain-file "jar" resource) at
/// `<module_dir>` relative to `root`.
#[allow(dead_code)]
pub fn write_module(root: &Path, module_dir: &str, jar: &str, jar_content: &str) {
    let name = module_dir.replace('/', ".");
    write_file(root, &format!("{}/module.xml", module_dir), module_descriptor(&name, jar));
    write_file(root, &format!("{}/{}", module_dir, jar), jar_content);
}

/// Mark `patch_id` as the active overlay of `layer` in `root`
#[allow(dead_code)]
pub fn activate_overlay(root: &Path, layer: &str, patch_id: &str) {
    let overlays = format!("modules/system/layers/{}/.overlays", layer);
    fs::create_dir_all(root.join(&overlays).join(patch_id)).unwrap();
    write_file(root, &format!("{}/.overlays", overlays), format!("{}\n", patch_id));
}

/// Read both trees and compute the baseline partition
#[allow(dead_code)]
pub fn baseline_context(config: DiffConfig) -> DiffContext {
    let side_a = read_tree(&config.folder_a, Side::A).unwrap();
    let side_b = read_tree(&config.folder_b, Side::B).unwrap();
    DiffContext::new(config, baseline_diff(side_a, side_b))
}

/// Baseline plus the reconciliation phase
#[allow(dead_code)]
pub fn reconcile(config: DiffConfig) -> DiffContext {
    let mode = config.hash_mode;
    let mut ctx = baseline_context(config);
    let phases: Vec<Box<dyn Phase>> = vec![Box::new(PatchOverlayPhase::new(mode))];
    run_pipeline(phases, &mut ctx).unwrap();
    ctx
}

#[allow(dead_code)]
pub fn status_of(ctx: &DiffContext, rel: &str) -> Option<Status> {
    ctx.artifact(rel).map(|a| a.status)
}

/// Write a module whose resource is a real jar archive
#[allow(dead_code)]
pub fn write_jar_module(root: &Path, module_dir: &str, jar: &str, entries: &[(&str, &[u8])]) {
    let name = module_dir.replace('/', ".");
    write_file(root, &format!("{}/module.xml", module_dir), module_descriptor(&name, jar));
    write_jar(&root.join(module_dir).join(jar), entries);
}
