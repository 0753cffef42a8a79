//! Names shared by log events, error events and the run report.
//!
//! Field keys match the identifiers the logging macros emit, so a consumer
//! of the JSON log stream can rely on these strings.

/// Field keys present on every operation event
pub mod field {
    pub const COMPONENT: &str = "component";
    pub const OP: &str = "op";
    pub const EVENT: &str = "event";
    pub const DURATION_MS: &str = "duration_ms";
    pub const RUN_ID: &str = "run_id";

    /// Where in the two trees an event happened
    pub const PHASE: &str = "phase";
    pub const LAYER: &str = "layer";
    pub const PATCH_ID: &str = "patch_id";
    pub const RELATIVE_PATH: &str = "relative_path";
    pub const SIDE: &str = "side";
    pub const ROOT: &str = "root";

    pub const ARTIFACT_COUNT: &str = "artifact_count";
    pub const ERROR_COUNT: &str = "error_count";

    /// Set on `end_error` events only
    pub const ERR_KIND: &str = "err_kind";
    pub const ERR_CODE: &str = "err_code";
}

/// Operations that log a start/end pair
pub mod op {
    /// One whole comparison, from config validation to the packaged result
    pub const COMPARE: &str = "compare";
    pub const READ_TREE: &str = "read_tree";
    pub const RUN_PIPELINE: &str = "run_pipeline";
    pub const RUN_PHASE: &str = "run_phase";
    /// Reconciliation pass over a single layer
    pub const RECONCILE_LAYER: &str = "reconcile_layer";
}

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_error_keys_are_plain_identifiers() {
        for key in [field::ERR_KIND, field::ERR_CODE] {
            assert!(key.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn test_operation_names_are_unique() {
        let ops = [
            op::COMPARE,
            op::READ_TREE,
            op::RUN_PIPELINE,
            op::RUN_PHASE,
            op::RECONCILE_LAYER,
        ];
        let unique: std::collections::HashSet<_> = ops.iter().collect();
        assert_eq!(unique.len(), ops.len());
    }
}
