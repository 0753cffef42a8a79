//! Distribution detection and phase-profile selection.

use std::fmt;
use std::path::Path;

use distdiff_core::patching::PatchOverlayPhase;
use distdiff_core::phases::{ChangedOnlyPhase, JarVersionPhase, ModuleSummaryPhase};
use distdiff_core::sort::SortingPhase;
use distdiff_core::DiffConfig;
use serde::{Deserialize, Serialize};

/// Marker file at the root of a modular distribution
pub const MODULES_JAR: &str = "jboss-modules.jar";

/// What kind of distribution a pair of roots holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    /// Module-layered server distribution
    Modular,
    Generic,
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionKind::Modular => f.write_str("modular"),
            DistributionKind::Generic => f.write_str("generic"),
        }
    }
}

/// Modular only when both roots carry the module loader jar.
pub fn detect_distribution(folder_a: &Path, folder_b: &Path) -> DistributionKind {
    let in_a = folder_a.join(MODULES_JAR).is_file();
    let in_b = folder_b.join(MODULES_JAR).is_file();
    let kind = match (in_a, in_b) {
        (true, true) => DistributionKind::Modular,
        (false, false) => DistributionKind::Generic,
        _ => {
            tracing::warn!(
                in_a,
                in_b,
                "{} found on one side only, comparing as generic",
                MODULES_JAR
            );
            DistributionKind::Generic
        }
    };
    tracing::info!(distribution = %kind, "distribution detected");
    kind
}

/// Phase names for a run over `kind`, honouring the config flags.
pub fn select_phases(kind: DistributionKind, config: &DiffConfig) -> Vec<String> {
    let modular = kind == DistributionKind::Modular;
    let mut phases = Vec::new();
    if modular && config.patch_aware {
        phases.push(PatchOverlayPhase::NAME);
    }
    phases.push(JarVersionPhase::NAME);
    if modular {
        phases.push(ModuleSummaryPhase::NAME);
    }
    if config.ignore_same_items {
        phases.push(ChangedOnlyPhase::NAME);
    }
    phases.push(SortingPhase::NAME);
    phases.into_iter().map(str::to_string).collect()
}

/// Explicit `phases` from the config, otherwise the profile for `kind`.
pub fn phases_for(kind: DistributionKind, config: &DiffConfig) -> Vec<String> {
    match &config.phases {
        Some(explicit) => explicit.clone(),
        None => select_phases(kind, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> DiffConfig {
        DiffConfig::new("/a", "/b")
    }

    #[test]
    fn test_detection_requires_both_sides() {
        let (a, b) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        assert_eq!(detect_distribution(a.path(), b.path()), DistributionKind::Generic);

        fs::write(a.path().join(MODULES_JAR), "jar").unwrap();
        assert_eq!(detect_distribution(a.path(), b.path()), DistributionKind::Generic);

        fs::write(b.path().join(MODULES_JAR), "jar").unwrap();
        assert_eq!(detect_distribution(a.path(), b.path()), DistributionKind::Modular);
    }

    #[test]
    fn test_modular_profile_follows_flags() {
        assert_eq!(
            select_phases(DistributionKind::Modular, &config()),
            vec!["jar-version", "module-summary", "sort"]
        );
        let full = config().with_patch_aware(true).with_ignore_same_items(true);
        assert_eq!(
            select_phases(DistributionKind::Modular, &full),
            vec![
                "patch-overlay",
                "jar-version",
                "module-summary",
                "changed-only",
                "sort"
            ]
        );
    }

    #[test]
    fn test_generic_profile_never_reconciles() {
        let full = config().with_patch_aware(true).with_ignore_same_items(true);
        assert_eq!(
            select_phases(DistributionKind::Generic, &full),
            vec!["jar-version", "changed-only", "sort"]
        );
    }

    #[test]
    fn test_explicit_phases_override_profile() {
        let explicit = config().with_phases(["sort"]);
        assert_eq!(phases_for(DistributionKind::Modular, &explicit), vec!["sort"]);
    }
}
