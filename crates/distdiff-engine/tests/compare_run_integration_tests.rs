//! Integration tests for whole comparison runs over real trees.
//!
//! All tests build both distributions under a TempDir.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use distdiff_core::errors::DiffErrorKind;
use distdiff_core::logging_facility::init_test_capture;
use distdiff_core::pipeline::{Phase, PhaseRegistry};
use distdiff_core::{DiffConfig, DiffContext, HashMode, Producer, Status};
use distdiff_engine::commands::compare::{compare, compare_with_registry};
use distdiff_engine::commands::profile::{DistributionKind, MODULES_JAR};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

const FOO: &str = "modules/system/layers/base/org/foo/main";
const FOO_OVERLAY: &str = "modules/system/layers/base/.overlays/p1/org/foo/main";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn write_module(root: &Path, dir: &str, jar_content: &str) {
    write(
        root,
        &format!("{}/module.xml", dir),
        r#"<module xmlns="urn:jboss:module:1.3" name="org.foo">
    <resources><resource-root path="foo.jar"/></resources>
</module>"#,
    );
    write(root, &format!("{}/foo.jar", dir), jar_content);
}

/// Two modular server distributions, A clean and B patched with `p1`.
fn patched_pair() -> (TempDir, DiffConfig) {
    let temp = TempDir::new().unwrap();
    let (a, b) = (temp.path().join("a"), temp.path().join("b"));
    for root in [&a, &b] {
        write(root, MODULES_JAR, "loader");
        write(root, "bin/standalone.sh", "run");
    }
    write_module(&a, FOO, "v1");
    write_module(&b, FOO, "v1-rebuilt");
    write(&b, "modules/system/layers/base/.overlays/.overlays", "p1\n");
    write_module(&b, FOO_OVERLAY, "v2");
    (temp, DiffConfig::new(a, b))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_patched_distribution_run() {
    // GIVEN a clean A and a patched B
    let (_temp, config) = patched_pair();

    // WHEN comparing with reconciliation
    let result = compare(config.with_patch_aware(true)).unwrap();

    // THEN the modular profile ran and the overlay is PATCHED
    assert_eq!(result.distribution, DistributionKind::Modular);
    assert_eq!(
        result.phases,
        vec!["patch-overlay", "jar-version", "module-summary", "sort"]
    );
    let jar = format!("{}/foo.jar", FOO_OVERLAY);
    let patched = result
        .artifacts
        .iter()
        .find(|a| a.relative_path == jar)
        .expect("overlay jar reported");
    assert_eq!(patched.status, Status::Patched);
    assert!(!result.has_unexpected_states());
    assert!(result.errors.is_empty());
    assert!(result.added_modules.is_empty());
    assert_eq!(result.phase_reports.len(), 4);
}

#[test]
fn test_nested_operation_events_carry_run_id() {
    // GIVEN log capture and a patched pair
    let capture = init_test_capture();
    let (_temp, config) = patched_pair();
    let root_a = config.folder_a.display().to_string();

    // WHEN comparing
    let result = compare(config.with_patch_aware(true)).unwrap();

    // THEN the tree read for A is logged under the run's id
    let tagged = capture.count_events(|e| {
        e.is("read_tree", "start")
            && e.field("root") == Some(root_a.as_str())
            && e.field("run_id") == Some(result.run_id.as_str())
    });
    assert_eq!(tagged, 1);
}

#[test]
fn test_run_without_patch_awareness_reports_overlay_as_added() {
    let (_temp, config) = patched_pair();

    let result = compare(config).unwrap();

    assert_eq!(result.phases, vec!["jar-version", "module-summary", "sort"]);
    let lines = result.unexpected_lines();
    assert!(lines.contains(&format!("ADDED: {}/foo.jar", FOO_OVERLAY)));
    assert!(result.has_unexpected_states());
}

#[test]
fn test_result_is_sorted_by_priority() {
    let (_temp, config) = patched_pair();

    let result = compare(config).unwrap();

    let priorities: Vec<u32> = result.artifacts.iter().map(|a| a.status.priority()).collect();
    assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_ignore_same_items_drops_same() {
    let (_temp, config) = patched_pair();

    let result = compare(config.with_patch_aware(true).with_ignore_same_items(true)).unwrap();

    assert!(result.phases.contains(&"changed-only".to_string()));
    assert!(result.artifacts.iter().all(|a| a.status != Status::Same));
}

#[test]
fn test_generic_distribution_skips_module_phases() {
    let temp = TempDir::new().unwrap();
    let (a, b) = (temp.path().join("a"), temp.path().join("b"));
    write(&a, "readme.txt", "one");
    write(&b, "readme.txt", "one");
    write(&b, "extra.txt", "two");

    let result = compare(DiffConfig::new(&a, &b).with_patch_aware(true)).unwrap();

    assert_eq!(result.distribution, DistributionKind::Generic);
    assert_eq!(result.phases, vec!["jar-version", "sort"]);
    assert_eq!(result.unexpected_lines(), vec!["ADDED: extra.txt"]);
}

#[test]
fn test_invalid_root_is_configuration_error() {
    let temp = TempDir::new().unwrap();
    let config = DiffConfig::new(temp.path().join("missing"), temp.path());

    let err = compare(config).unwrap_err();

    assert_eq!(err.kind(), DiffErrorKind::InvalidRoot);
    assert_eq!(err.op(), Some("validate_config"));
}

#[test]
fn test_unknown_phase_aborts_before_reading_trees() {
    let (_temp, config) = patched_pair();

    let err = compare(config.with_phases(["sort", "checksums"])).unwrap_err();

    assert_eq!(err.code(), "ERR_UNKNOWN_PHASE");
}

#[test]
fn test_missing_layer_aborts_run() {
    let (_temp, config) = patched_pair();
    write(&config.folder_b, "modules/layers.conf", "layers=soa\n");
    fs::create_dir_all(config.folder_b.join("modules/system/layers/soa")).unwrap();

    let err = compare(config.with_patch_aware(true)).unwrap_err();

    assert_eq!(err.kind(), DiffErrorKind::LayerMissing);
    assert_eq!(err.layer(), Some("soa"));
}

#[test]
fn test_improved_hashing_run_records_error_events() {
    // GIVEN plain-text jars, which improved hashing cannot open
    let (_temp, config) = patched_pair();

    // WHEN comparing with improved hashing
    let result = compare(
        config
            .with_patch_aware(true)
            .with_hash_mode(HashMode::Improved),
    )
    .unwrap();

    // THEN the run completes and affected artifacts are ERROR
    assert!(result.has_errors());
    assert!(result.artifacts.iter().any(|a| a.status == Status::Error));
    assert_eq!(result.artifacts[0].status, Status::Error);
}

#[test]
fn test_version_bumped_client_jar_is_one_version_artifact() {
    // GIVEN a generic distribution whose client jar moved from 1.0 to 1.1
    let temp = TempDir::new().unwrap();
    let (a, b) = (temp.path().join("a"), temp.path().join("b"));
    write(&a, "bin/client/foo-1.0.Final.jar", "old");
    write(&b, "bin/client/foo-1.1.Final.jar", "new");

    // WHEN comparing
    let result = compare(DiffConfig::new(&a, &b)).unwrap();

    // THEN the pair is reported once, as VERSION, and nothing is unexpected
    let jars: Vec<String> = result
        .artifacts
        .iter()
        .filter(|a| a.name.ends_with(".jar"))
        .map(|a| a.listing_line())
        .collect();
    assert_eq!(jars, vec!["VERSION: bin/client/foo-1.0.Final.jar"]);
    assert!(!result.has_unexpected_states());
}

/// Externally registered content comparison that marks every text file
struct TextMarker;

impl Phase for TextMarker {
    fn name(&self) -> &str {
        "text-marker"
    }

    fn producer(&self) -> Producer {
        Producer::ContentComparison
    }

    fn process(&mut self, ctx: &mut DiffContext) -> distdiff_core::Result<()> {
        for artifact in ctx.artifacts.iter_mut() {
            if artifact.status == Status::Same && artifact.name.ends_with(".sh") {
                artifact.status = Status::ExpectedDifferences;
            }
        }
        Ok(())
    }
}

#[test]
fn test_external_phase_through_registry() {
    let (_temp, config) = patched_pair();
    let mut registry = PhaseRegistry::with_builtin();
    registry.register("text-marker", |_config: &DiffConfig| {
        Box::new(TextMarker) as Box<dyn Phase>
    });

    let result =
        compare_with_registry(config.with_phases(["text-marker", "sort"]), &registry).unwrap();

    let script = result
        .artifacts
        .iter()
        .find(|a| a.relative_path == "bin/standalone.sh")
        .unwrap();
    assert_eq!(script.status, Status::ExpectedDifferences);
    assert_eq!(result.phase_reports[0].illegal_assignments, 0);
}
