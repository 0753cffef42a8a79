//! Comparison outcome statuses.
//!
//! `Status` is a closed set. Each status has a fixed report priority (higher
//! sorts first) and a set of producer classes allowed to assign it. Only
//! `Added`, `Removed` and `Same` are initial; everything else is assigned by a
//! later phase.

use serde::{Deserialize, Serialize};

/// Outcome of comparing one artifact between distribution A and B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    PatchedWrong,
    Error,
    NotPatched,
    Added,
    Removed,
    Different,
    DifferentLineBreaks,
    PatchedUnnecessarily,
    Version,
    Build,
    ExpectedDifferences,
    Patched,
    Same,
}

/// Class of phase that assigns statuses.
///
/// Used by the pipeline executor to audit status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Producer {
    /// The baseline differ
    Baseline,
    /// Patch-overlay reconciliation
    PatchOverlay,
    /// Textual/binary/XML content comparison
    ContentComparison,
    /// Jar version and build comparison
    VersionComparison,
    /// Phases that only drop, reorder or summarise artifacts
    Filter,
    /// Phases plugged in from outside the core
    External,
}

impl Status {
    /// Every status, in descending priority order
    pub const ALL: [Status; 13] = [
        Status::PatchedWrong,
        Status::Error,
        Status::NotPatched,
        Status::Added,
        Status::Removed,
        Status::Different,
        Status::DifferentLineBreaks,
        Status::PatchedUnnecessarily,
        Status::Version,
        Status::Build,
        Status::ExpectedDifferences,
        Status::Patched,
        Status::Same,
    ];

    /// Report priority; higher sorts first
    pub fn priority(self) -> u32 {
        match self {
            Status::PatchedWrong => 120,
            Status::Error => 100,
            Status::NotPatched => 60,
            Status::Added => 50,
            Status::Removed => 45,
            Status::Different => 40,
            Status::DifferentLineBreaks => 35,
            Status::PatchedUnnecessarily => 30,
            Status::Version => 20,
            Status::Build => 18,
            Status::ExpectedDifferences => 15,
            Status::Patched => 10,
            Status::Same => 1,
        }
    }

    /// Canonical upper-case label, as used in listings
    pub fn as_str(self) -> &'static str {
        match self {
            Status::PatchedWrong => "PATCHED_WRONG",
            Status::Error => "ERROR",
            Status::NotPatched => "NOT_PATCHED",
            Status::Added => "ADDED",
            Status::Removed => "REMOVED",
            Status::Different => "DIFFERENT",
            Status::DifferentLineBreaks => "DIFFERENT_LINE_BREAKS",
            Status::PatchedUnnecessarily => "PATCHED_UNNECESSARILY",
            Status::Version => "VERSION",
            Status::Build => "BUILD",
            Status::ExpectedDifferences => "EXPECTED_DIFFERENCES",
            Status::Patched => "PATCHED",
            Status::Same => "SAME",
        }
    }

    /// Whether the baseline differ may assign this status
    pub fn is_initial(self) -> bool {
        matches!(self, Status::Added | Status::Removed | Status::Same)
    }

    /// Whether an artifact in this status needs attention in a summary.
    ///
    /// `DifferentLineBreaks` counts unless line-break differences are ignored.
    pub fn is_unexpected(self, ignore_line_breaks: bool) -> bool {
        match self {
            Status::Error
            | Status::PatchedWrong
            | Status::Added
            | Status::Removed
            | Status::Different
            | Status::NotPatched => true,
            Status::DifferentLineBreaks => !ignore_line_breaks,
            _ => false,
        }
    }

    /// Producer classes allowed to assign this status
    pub fn legal_producers(self) -> &'static [Producer] {
        match self {
            Status::Added | Status::Removed | Status::Same => &[Producer::Baseline],
            Status::Error => &[
                Producer::PatchOverlay,
                Producer::ContentComparison,
                Producer::VersionComparison,
                Producer::External,
            ],
            Status::Patched | Status::PatchedUnnecessarily | Status::NotPatched => {
                &[Producer::PatchOverlay, Producer::External]
            }
            Status::Version => &[
                Producer::PatchOverlay,
                Producer::VersionComparison,
                Producer::External,
            ],
            Status::Build => &[Producer::VersionComparison, Producer::External],
            Status::PatchedWrong
            | Status::Different
            | Status::DifferentLineBreaks
            | Status::ExpectedDifferences => &[Producer::ContentComparison, Producer::External],
        }
    }

    /// Whether `producer` may assign this status
    pub fn may_be_assigned_by(self, producer: Producer) -> bool {
        self.legal_producers().contains(&producer)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_descending_priority() {
        for pair in Status::ALL.windows(2) {
            assert!(pair[0].priority() > pair[1].priority(), "{:?}", pair);
        }
    }

    #[test]
    fn test_only_baseline_statuses_are_initial() {
        let initial: Vec<Status> = Status::ALL
            .iter()
            .copied()
            .filter(|s| s.is_initial())
            .collect();
        assert_eq!(initial, vec![Status::Added, Status::Removed, Status::Same]);
    }

    #[test]
    fn test_initial_statuses_belong_to_baseline_only() {
        for status in Status::ALL {
            assert_eq!(
                status.may_be_assigned_by(Producer::Baseline),
                status.is_initial()
            );
        }
    }

    #[test]
    fn test_filters_may_assign_nothing() {
        assert!(Status::ALL
            .iter()
            .all(|s| !s.may_be_assigned_by(Producer::Filter)));
    }

    #[test]
    fn test_unexpected_line_breaks_toggle() {
        assert!(Status::DifferentLineBreaks.is_unexpected(false));
        assert!(!Status::DifferentLineBreaks.is_unexpected(true));
        assert!(Status::NotPatched.is_unexpected(true));
        assert!(!Status::Patched.is_unexpected(false));
        assert!(!Status::Same.is_unexpected(false));
    }

    #[test]
    fn test_serde_uses_listing_labels() {
        let json = serde_json::to_string(&Status::PatchedUnnecessarily).unwrap();
        assert_eq!(json, "\"PATCHED_UNNECESSARILY\"");
        for status in Status::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }
}
